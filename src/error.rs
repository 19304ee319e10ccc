use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::{
    repository::RepositoryError,
    response::{Envelope, ResponseBuilder},
    validation::{ViolationFormat, ViolationList},
};

/// ApiError
///
/// Every way a request pipeline can fail. Each variant maps to exactly one envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No principal is attached to the request.
    #[error("authentication required")]
    Authentication,

    /// A principal is attached but does not own the entity.
    #[error("principal is not the author of the entity")]
    Authorization,

    /// `"{Kind} is not found [{id}]."`
    #[error("{0}")]
    NotFound(String),

    #[error("input validation failed ({} violations)", .0.len())]
    Validation(ViolationList),

    /// Input could not be mapped onto the entity at all.
    #[error("{0}")]
    Bind(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    pub fn not_found(kind: &str, id: i64) -> Self {
        ApiError::NotFound(format!("{kind} is not found [{id}]."))
    }

    /// Shapes the error into its envelope, projecting validation failures with `format`.
    pub fn into_envelope(self, format: ViolationFormat) -> Envelope {
        match self {
            ApiError::Authentication | ApiError::Authorization => ResponseBuilder::auth_error(None),
            ApiError::NotFound(message) => ResponseBuilder::not_found(message),
            ApiError::Validation(violations) => match format {
                ViolationFormat::Detailed => ResponseBuilder::bad(violations.detailed()),
                ViolationFormat::Brief => ResponseBuilder::bad(violations.brief()),
            },
            ApiError::Bind(message) => ResponseBuilder::bad(message),
            ApiError::Repository(err @ RepositoryError::UnknownReference { .. })
            | ApiError::Repository(err @ RepositoryError::Duplicate(_)) => {
                ResponseBuilder::bad(err.to_string())
            }
            ApiError::Repository(err) => {
                tracing::error!("unrecoverable repository failure: {:?}", err);
                ResponseBuilder::internal_error()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_envelope(ViolationFormat::default()).into_response()
    }
}
