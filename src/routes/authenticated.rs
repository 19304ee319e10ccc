use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, patch, post},
};

/// Authenticated Router Module
///
/// Create, update and delete for posts and comments. Every handler here takes the `Auth`
/// extractor and passes it into its service call, where creation requires a principal and
/// update/delete require the principal to be the entity's creator. Both failures answer
/// 401 with an empty message.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /post
        .route("/post", post(handlers::create_post))
        // PATCH/DELETE /post/{id}
        // Owner-only. Unknown ids answer 404 before ownership is looked at.
        .route(
            "/post/{id}",
            patch(handlers::update_post).delete(handlers::delete_post),
        )
        // POST /post/{post_id}/comment
        .route("/post/{post_id}/comment", post(handlers::create_comment_for_post))
        // DELETE /comment/{id}
        // Owner-only.
        .route("/comment/{id}", delete(handlers::delete_comment))
}
