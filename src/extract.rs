use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
};
use serde_json::{Map, Value};
use std::convert::Infallible;

/// NumericId
///
/// A single path parameter restricted to a digit sequence. Anything else is answered with
/// a bare 404, as if no route had matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericId(pub i64);

impl<S> FromRequestParts<S> for NumericId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::NOT_FOUND)?;

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StatusCode::NOT_FOUND);
        }
        raw.parse().map(NumericId).map_err(|_| StatusCode::NOT_FOUND)
    }
}

/// RawInput
///
/// The request body as an untyped JSON value, handed to the binder unchanged. An empty
/// body is an empty object, so a bodiless PATCH is a no-op update rather than an error.
/// A body that is not valid JSON is `None`; the pipeline reports it at its bind step,
/// after the principal and entity checks that come first.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInput(pub Option<Value>);

impl<S> FromRequest<S> for RawInput
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("unreadable request body: {}", e);
                return Ok(RawInput(None));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RawInput(Some(Value::Object(Map::new()))));
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(RawInput(Some(value))),
            Err(e) => {
                tracing::warn!("malformed JSON body: {}", e);
                Ok(RawInput(None))
            }
        }
    }
}
