use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Repository, RepositoryError};
use crate::models::{Comment, Post, Reference, Tag, User};

struct PostRecord {
    title: String,
    content: String,
    created_by: i64,
    created_at: DateTime<Utc>,
    tag_ids: Vec<i64>,
}

struct CommentRecord {
    content: String,
    created_by: i64,
    post_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    users: BTreeMap<i64, User>,
    tags: BTreeMap<i64, Tag>,
    posts: BTreeMap<i64, PostRecord>,
    comments: BTreeMap<i64, CommentRecord>,
    next_tag_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

impl Store {
    fn user(&self, id: i64) -> User {
        self.users.get(&id).cloned().unwrap_or(User {
            id,
            username: String::new(),
        })
    }

    fn comment(&self, id: i64, record: &CommentRecord) -> Comment {
        Comment {
            id,
            content: record.content.clone(),
            created_by: self.user(record.created_by),
            post_id: record.post_id,
            created_at: record.created_at,
        }
    }

    fn comments_for(&self, post_id: i64) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|(_, record)| record.post_id == post_id)
            .map(|(id, record)| self.comment(*id, record))
            .collect()
    }

    fn post(&self, id: i64, record: &PostRecord) -> Post {
        Post {
            id,
            title: record.title.clone(),
            content: record.content.clone(),
            created_by: self.user(record.created_by),
            created_at: record.created_at,
            tags: record
                .tag_ids
                .iter()
                .filter_map(|tag_id| self.tags.get(tag_id).cloned())
                .map(Reference::Resolved)
                .collect(),
            comments: self.comments_for(id),
        }
    }
}

/// InMemoryRepository
///
/// Mutex-guarded maps with the same semantics as `PostgresRepository`: ids are assigned
/// on insert, tag references are resolved on save, post removal cascades to comments and
/// tag names are unique. Backs local runs without `DATABASE_URL` and the test suite.
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store {
                next_tag_id: 1,
                next_post_id: 1,
                next_comment_id: 1,
                ..Store::default()
            }),
        }
    }

    /// with_fixtures
    ///
    /// Seeds the data set used by local development and the API tests:
    /// users `alexbobson` (1), `johnsmith` (2), `johndoe` (3);
    /// tags 101 `goodToKnow`, 102 `rust`, 103 `news`;
    /// post 10 by alexbobson tagged 101 and 102, post 11 by johnsmith;
    /// comments 1001 (alexbobson) and 1002 (johndoe) on post 10.
    pub fn with_fixtures() -> Self {
        let created_at = DateTime::from_timestamp(1_654_084_800, 0).unwrap_or_default();
        let mut store = Store::default();

        for (id, username) in [(1, "alexbobson"), (2, "johnsmith"), (3, "johndoe")] {
            store.users.insert(
                id,
                User {
                    id,
                    username: username.to_string(),
                },
            );
        }
        for (id, name) in [(101, "goodToKnow"), (102, "rust"), (103, "news")] {
            store.tags.insert(
                id,
                Tag {
                    id,
                    name: name.to_string(),
                },
            );
        }
        store.posts.insert(
            10,
            PostRecord {
                title: "First steps".to_string(),
                content: "Some thoughts on getting started...".to_string(),
                created_by: 1,
                created_at,
                tag_ids: vec![101, 102],
            },
        );
        store.posts.insert(
            11,
            PostRecord {
                title: "Weekly news".to_string(),
                content: "What happened this week...".to_string(),
                created_by: 2,
                created_at,
                tag_ids: vec![103],
            },
        );
        store.comments.insert(
            1001,
            CommentRecord {
                content: "Thanks for reading!".to_string(),
                created_by: 1,
                post_id: 10,
                created_at,
            },
        );
        store.comments.insert(
            1002,
            CommentRecord {
                content: "Nice post.".to_string(),
                created_by: 3,
                post_id: 10,
                created_at,
            },
        );

        store.next_tag_id = 104;
        store.next_post_id = 12;
        store.next_comment_id = 1003;

        Self {
            store: Mutex::new(store),
        }
    }

    /// Registers a user directly; authentication is handled outside this service.
    pub fn insert_user(&self, user: User) -> Result<(), RepositoryError> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_all_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        let store = self.lock()?;
        Ok(store
            .posts
            .iter()
            .map(|(id, record)| store.post(*id, record))
            .collect())
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let store = self.lock()?;
        Ok(store.posts.get(&id).map(|record| store.post(id, record)))
    }

    async fn save_post(&self, post: Post) -> Result<Post, RepositoryError> {
        let mut store = self.lock()?;

        let tag_ids = post.tag_ids();
        if let Some(missing) = tag_ids.iter().find(|id| !store.tags.contains_key(*id)) {
            return Err(RepositoryError::UnknownReference {
                kind: "Tag",
                id: *missing,
            });
        }

        if !post.is_new() && !store.posts.contains_key(&post.id) {
            return Err(RepositoryError::UnknownReference {
                kind: "Post",
                id: post.id,
            });
        }

        let id = if post.is_new() {
            let id = store.next_post_id;
            store.next_post_id += 1;
            id
        } else {
            post.id
        };

        let created_at = if post.is_new() {
            Utc::now()
        } else {
            post.created_at
        };

        store.posts.insert(
            id,
            PostRecord {
                title: post.title,
                content: post.content,
                created_by: post.created_by.id,
                created_at,
                tag_ids,
            },
        );

        let record = &store.posts[&id];
        Ok(store.post(id, record))
    }

    async fn remove_post(&self, id: i64) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        store.posts.remove(&id);
        store.comments.retain(|_, comment| comment.post_id != id);
        Ok(())
    }

    async fn find_all_comments(&self) -> Result<Vec<Comment>, RepositoryError> {
        let store = self.lock()?;
        Ok(store
            .comments
            .iter()
            .map(|(id, record)| store.comment(*id, record))
            .collect())
    }

    async fn find_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepositoryError> {
        Ok(self.lock()?.comments_for(post_id))
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, RepositoryError> {
        let store = self.lock()?;
        Ok(store.comments.get(&id).map(|record| store.comment(id, record)))
    }

    async fn add_comment(&self, comment: Comment) -> Result<Comment, RepositoryError> {
        let mut store = self.lock()?;
        if !store.posts.contains_key(&comment.post_id) {
            return Err(RepositoryError::UnknownReference {
                kind: "Post",
                id: comment.post_id,
            });
        }

        let id = store.next_comment_id;
        store.next_comment_id += 1;
        store.comments.insert(
            id,
            CommentRecord {
                content: comment.content,
                created_by: comment.created_by.id,
                post_id: comment.post_id,
                created_at: Utc::now(),
            },
        );

        let record = &store.comments[&id];
        Ok(store.comment(id, record))
    }

    async fn remove_comment(&self, id: i64) -> Result<(), RepositoryError> {
        self.lock()?.comments.remove(&id);
        Ok(())
    }

    async fn find_all_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        Ok(self.lock()?.tags.values().cloned().collect())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, RepositoryError> {
        Ok(self.lock()?.tags.get(&id).cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, RepositoryError> {
        Ok(self
            .lock()?
            .tags
            .values()
            .find(|tag| tag.name == name)
            .cloned())
    }

    async fn add_tag(&self, tag: Tag) -> Result<Tag, RepositoryError> {
        let mut store = self.lock()?;
        if store.tags.values().any(|existing| existing.name == tag.name) {
            return Err(RepositoryError::Duplicate(format!(
                "Tag name is already used [{}].",
                tag.name
            )));
        }

        let id = store.next_tag_id;
        store.next_tag_id += 1;
        let tag = Tag { id, name: tag.name };
        store.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }
}
