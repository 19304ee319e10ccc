use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Request pipeline, leaves first.
pub mod response;
pub mod error;
pub mod models;
pub mod validation;
pub mod binding;
pub mod auth;
pub mod repository;
pub mod services;
pub mod views;
pub mod extract;
pub mod handlers;
pub mod config;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
use services::{CommentService, PostService, TagService};
use validation::ViolationFormat;

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and the view schemas.
/// Served at `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_posts, handlers::show_post, handlers::create_post,
        handlers::update_post, handlers::delete_post,
        handlers::list_comments, handlers::list_comments_for_post, handlers::show_comment,
        handlers::create_comment_for_post, handlers::delete_comment,
        handlers::list_tags, handlers::show_tag, handlers::create_tag
    ),
    components(
        schemas(
            views::UserView, views::TagView,
            views::PostListView, views::PostShowView, views::PostCreateView,
            views::CommentListView, views::CommentShowView, views::CommentCreateView,
        )
    ),
    tags(
        (name = "Post", description = "Blog posts"),
        (name = "Comment", description = "Comments on posts"),
        (name = "Tag", description = "Post tags")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container shared by all requests: the persistence layer and the
/// loaded configuration. Services are built from it on demand through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for ViolationFormat {
    fn from_ref(app_state: &AppState) -> ViolationFormat {
        app_state.config.violation_format
    }
}

impl FromRef<AppState> for PostService {
    fn from_ref(app_state: &AppState) -> PostService {
        PostService::new(app_state.repo.clone())
    }
}

impl FromRef<AppState> for CommentService {
    fn from_ref(app_state: &AppState) -> CommentService {
        CommentService::new(app_state.repo.clone())
    }
}

impl FromRef<AppState> for TagService {
    fn from_ref(app_state: &AppState) -> TagService {
        TagService::new(app_state.repo.clone())
    }
}

/// create_router
///
/// Assembles the routing table, the documentation endpoints and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation, one UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, keyed by the generated `x-request-id` so all log lines of one
/// request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
