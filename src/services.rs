//! The request pipelines behind every endpoint.
//!
//! Mutating operations always run in the same order: resolve the principal, look up the
//! path entity, check ownership, bind input, validate, persist. The `Auth` context is an
//! explicit argument; nothing here reaches for request-global state.

use serde_json::Value;

use crate::{
    auth::Auth,
    binding::{BindError, Bindable, bind},
    error::ApiError,
    models::{Comment, Post, Tag},
    repository::RepositoryState,
    validation::{ValidationGate, ViolationList},
};

/// `raw` is `None` when the request body was not valid JSON.
fn bind_or_fail<T: Bindable>(raw: Option<&Value>, target: T, failure: &str) -> Result<T, ApiError> {
    raw.ok_or(BindError::Malformed)
        .and_then(|raw| bind(raw, target))
        .map_err(|e| {
            tracing::warn!("bind failure: {}", e);
            ApiError::Bind(failure.to_string())
        })
}

fn reject_violations(violations: ViolationList) -> Result<(), ApiError> {
    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = violations.len(), "input rejected by validation");
        Err(ApiError::Validation(violations))
    }
}

// --- Posts ---

#[derive(Clone)]
pub struct PostService {
    repo: RepositoryState,
    gate: ValidationGate,
}

impl PostService {
    pub fn new(repo: RepositoryState) -> Self {
        let gate = ValidationGate::new(repo.clone());
        Self { repo, gate }
    }

    pub async fn get_all(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.repo.find_all_posts().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Post, ApiError> {
        self.repo
            .find_post(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Post", id))
    }

    pub async fn create(&self, raw: Option<&Value>, auth: &Auth) -> Result<Post, ApiError> {
        let creator = auth.current_user()?.clone();

        let mut post = bind_or_fail(raw, Post::default(), "Can not create the post.")?;
        post.created_by = creator;

        reject_violations(self.gate.validate_post(&post))?;

        let post = self.repo.save_post(post).await?;
        tracing::info!(post_id = post.id, user_id = post.created_by.id, "post created");
        Ok(post)
    }

    /// Partial update: keys absent from `raw` keep their stored value.
    pub async fn update(&self, raw: Option<&Value>, id: i64, auth: &Auth) -> Result<Post, ApiError> {
        let post = self.get_by_id(id).await?;
        auth.validate_author(&post)?;

        let post = bind_or_fail(raw, post, "Can not update the post.")?;

        reject_violations(self.gate.validate_post(&post))?;

        let post = self.repo.save_post(post).await?;
        tracing::info!(post_id = post.id, "post updated");
        Ok(post)
    }

    pub async fn delete(&self, id: i64, auth: &Auth) -> Result<(), ApiError> {
        let post = self.get_by_id(id).await?;
        auth.validate_author(&post)?;

        self.repo.remove_post(post.id).await?;
        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }
}

// --- Comments ---

#[derive(Clone)]
pub struct CommentService {
    repo: RepositoryState,
    posts: PostService,
    gate: ValidationGate,
}

impl CommentService {
    pub fn new(repo: RepositoryState) -> Self {
        Self {
            posts: PostService::new(repo.clone()),
            gate: ValidationGate::new(repo.clone()),
            repo,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Comment>, ApiError> {
        Ok(self.repo.find_all_comments().await?)
    }

    /// Comments of one post; the post itself must exist.
    pub async fn get_for_post(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        let post = self.posts.get_by_id(post_id).await?;
        Ok(self.repo.find_comments_for_post(post.id).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Comment, ApiError> {
        self.repo
            .find_comment(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment", id))
    }

    pub async fn create(&self, raw: Option<&Value>, post_id: i64, auth: &Auth) -> Result<Comment, ApiError> {
        let creator = auth.current_user()?.clone();
        let post = self.posts.get_by_id(post_id).await?;

        let mut comment = bind_or_fail(raw, Comment::default(), "Can not create the comment.")?;
        comment.created_by = creator;
        comment.post_id = post.id;

        reject_violations(self.gate.validate_comment(&comment))?;

        let comment = self.repo.add_comment(comment).await?;
        tracing::info!(comment_id = comment.id, post_id, "comment created");
        Ok(comment)
    }

    pub async fn delete(&self, id: i64, auth: &Auth) -> Result<(), ApiError> {
        let comment = self.get_by_id(id).await?;
        auth.validate_author(&comment)?;

        self.repo.remove_comment(comment.id).await?;
        tracing::info!(comment_id = id, "comment deleted");
        Ok(())
    }
}

// --- Tags ---

/// Tags are not owned, so no step here needs a principal.
#[derive(Clone)]
pub struct TagService {
    repo: RepositoryState,
    gate: ValidationGate,
}

impl TagService {
    pub fn new(repo: RepositoryState) -> Self {
        let gate = ValidationGate::new(repo.clone());
        Self { repo, gate }
    }

    pub async fn get_all(&self) -> Result<Vec<Tag>, ApiError> {
        Ok(self.repo.find_all_tags().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Tag, ApiError> {
        self.repo
            .find_tag(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tag", id))
    }

    pub async fn create(&self, raw: Option<&Value>) -> Result<Tag, ApiError> {
        let tag = bind_or_fail(raw, Tag::default(), "Can not create a tag.")?;

        reject_violations(self.gate.validate_tag(&tag).await?)?;

        let tag = self.repo.add_tag(tag).await?;
        tracing::info!(tag_id = tag.id, "tag created");
        Ok(tag)
    }
}
