use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Core Domain Entities ---

/// User
///
/// Identity only. Users own posts and comments through the entities' `created_by` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Tag
///
/// A label attachable to posts. `name` is unique across all tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, Default)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Reference
///
/// A non-owning link to another entity. Input binding only ever produces `Id`;
/// the repository swaps it for `Resolved` when the owning entity is persisted, which is
/// also where a dangling id is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<T> {
    Id(i64),
    Resolved(T),
}

impl Reference<Tag> {
    pub fn id(&self) -> i64 {
        match self {
            Reference::Id(id) => *id,
            Reference::Resolved(tag) => tag.id,
        }
    }
}

impl<T> Reference<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Resolved(entity) => Some(entity),
        }
    }
}

/// Entities that record which user created them. Used for owner-only checks.
pub trait Authored {
    fn created_by(&self) -> &User;
}

/// Post
///
/// `id == 0` marks an entity that has been bound from input but not yet persisted;
/// the repository assigns the real id on first save. The creator never changes after
/// creation. Comments are owned by the post and removed with it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_by: User,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Reference<Tag>>,
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(Reference::id).collect()
    }
}

impl Authored for Post {
    fn created_by(&self) -> &User {
        &self.created_by
    }
}

/// Comment
///
/// Belongs to exactly one post for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub created_by: User,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Authored for Comment {
    fn created_by(&self) -> &User {
        &self.created_by
    }
}
