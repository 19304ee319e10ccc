use crate::models::{Comment, Post, Tag, User};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepositoryError
///
/// Failures raised by the persistence layer. Only `UnknownReference` and `Duplicate`
/// are caused by the request itself; everything else is an infrastructure fault.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A deferred reference (e.g. a tag id in a post payload) does not exist.
    #[error("{kind} is not found [{id}].")]
    UnknownReference { kind: &'static str, id: i64 },

    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Repository Trait
///
/// The persistence contract used by the services. Lookups return `Ok(None)` for absent
/// entities; the services turn that into a not-found failure.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    async fn find_all_posts(&self) -> Result<Vec<Post>, RepositoryError>;
    // Loads the post with its resolved tags and its comments.
    async fn find_post(&self, id: i64) -> Result<Option<Post>, RepositoryError>;
    // Inserts when `post.is_new()`, updates otherwise. Resolves tag references and
    // replaces the stored tag set. Updating a post that no longer exists is an
    // `UnknownReference`. Returns the post as stored.
    async fn save_post(&self, post: Post) -> Result<Post, RepositoryError>;
    // Removes the post together with its comments.
    async fn remove_post(&self, id: i64) -> Result<(), RepositoryError>;

    // --- Comments ---
    async fn find_all_comments(&self) -> Result<Vec<Comment>, RepositoryError>;
    async fn find_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepositoryError>;
    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, RepositoryError>;
    async fn add_comment(&self, comment: Comment) -> Result<Comment, RepositoryError>;
    async fn remove_comment(&self, id: i64) -> Result<(), RepositoryError>;

    // --- Tags ---
    async fn find_all_tags(&self) -> Result<Vec<Tag>, RepositoryError>;
    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, RepositoryError>;
    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, RepositoryError>;
    async fn add_tag(&self, tag: Tag) -> Result<Tag, RepositoryError>;

    // --- Users ---
    async fn find_user(&self, id: i64) -> Result<Option<User>, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
