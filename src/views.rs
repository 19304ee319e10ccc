use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{Comment, Post, Reference, Tag, User};

// --- Field-group projections ---
//
// One struct per (entity, field-group). The handler picks the view for its endpoint;
// anything not named here never reaches the wire.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserView {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// tag_list / tag_show / tag_create all expose the same two fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TagView {
    pub id: i64,
    pub name: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

impl From<&Reference<Tag>> for TagView {
    fn from(reference: &Reference<Tag>) -> Self {
        match reference {
            Reference::Resolved(tag) => tag.into(),
            // Only reachable before persistence; the repository always returns resolved tags.
            Reference::Id(id) => Self {
                id: *id,
                name: String::new(),
            },
        }
    }
}

fn tag_views(tags: &[Reference<Tag>]) -> Vec<TagView> {
    tags.iter().map(TagView::from).collect()
}

/// post_list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostListView {
    pub id: i64,
    pub title: String,
    pub created_by: UserView,
    pub tags: Vec<TagView>,
}

impl From<&Post> for PostListView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            created_by: (&post.created_by).into(),
            tags: tag_views(&post.tags),
        }
    }
}

/// post_show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostShowView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_by: UserView,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub tags: Vec<TagView>,
    pub comments: Vec<CommentListView>,
}

impl From<&Post> for PostShowView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            created_by: (&post.created_by).into(),
            created_at: post.created_at,
            tags: tag_views(&post.tags),
            comments: post.comments.iter().map(CommentListView::from).collect(),
        }
    }
}

/// post_create, also the output of an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostCreateView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<TagView>,
}

impl From<&Post> for PostCreateView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            tags: tag_views(&post.tags),
        }
    }
}

/// comment_list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentListView {
    pub id: i64,
    pub content: String,
    pub created_by: UserView,
}

impl From<&Comment> for CommentListView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            created_by: (&comment.created_by).into(),
        }
    }
}

/// comment_show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentShowView {
    pub id: i64,
    pub content: String,
    pub created_by: UserView,
    pub post_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentShowView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            created_by: (&comment.created_by).into(),
            post_id: comment.post_id,
            created_at: comment.created_at,
        }
    }
}

/// comment_create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentCreateView {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
}

impl From<&Comment> for CommentCreateView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            post_id: comment.post_id,
        }
    }
}

/// Projects a slice of entities through a view.
pub fn project<'a, E, V>(entities: &'a [E]) -> Vec<V>
where
    V: From<&'a E>,
{
    entities.iter().map(V::from).collect()
}
