use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints that any client (anonymous or logged-in) may call.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /post, GET /post/{id}
        .route("/post", get(handlers::list_posts))
        .route("/post/{id}", get(handlers::show_post))
        // GET /post/{post_id}/comment
        // 404 when the parent post does not exist.
        .route("/post/{post_id}/comment", get(handlers::list_comments_for_post))
        // GET /comment, GET /comment/{id}
        .route("/comment", get(handlers::list_comments))
        .route("/comment/{id}", get(handlers::show_comment))
        // GET/POST /tag
        // Tags are not owned, so creation needs no principal.
        .route("/tag", get(handlers::list_tags).post(handlers::create_tag))
        // GET /tag/{id}
        .route("/tag/{id}", get(handlers::show_tag))
}
