use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Message
///
/// The `message` member of a failure envelope. Validation failures carry either a list
/// of violation strings or a single joined string, everything else a plain string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    List(Vec<String>),
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::Text(value)
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Message::Text(value.to_string())
    }
}

impl From<Vec<String>> for Message {
    fn from(value: Vec<String>) -> Self {
        Message::List(value)
    }
}

/// Envelope
///
/// A fully shaped HTTP outcome: the status code plus the JSON body (or no body for 204).
/// Every handler in the crate terminates in one of the `ResponseBuilder` constructors below,
/// which keeps the wire contract in a single place:
///
/// | outcome        | status | body                              |
/// |----------------|--------|-----------------------------------|
/// | success        | 200    | `{"status": true,  "data": ...}`  |
/// | created        | 201    | `{"status": true,  "data": ...}`  |
/// | success empty  | 204    | empty                             |
/// | not found      | 404    | `{"status": false, "message": ...}` |
/// | bad request    | 400    | `{"status": false, "message": ...}` |
/// | auth error     | 401    | `{"status": false, "message": ...}` |
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// ResponseBuilder
///
/// Pure constructors for the uniform `{status, data|message}` envelope.
pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn success<T: Serialize>(data: T) -> Envelope {
        Self::with_data(StatusCode::OK, data)
    }

    pub fn created<T: Serialize>(data: T) -> Envelope {
        Self::with_data(StatusCode::CREATED, data)
    }

    pub fn success_empty() -> Envelope {
        Envelope {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Envelope {
        Self::failure(StatusCode::NOT_FOUND, Some(Message::Text(message.into())))
    }

    pub fn bad(message: impl Into<Message>) -> Envelope {
        Self::failure(StatusCode::BAD_REQUEST, Some(message.into()))
    }

    /// Authentication and authorization failures share this shape; callers pass `None`
    /// so the two cases are indistinguishable on the wire.
    pub fn auth_error(message: Option<Message>) -> Envelope {
        Self::failure(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal_error() -> Envelope {
        Self::failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(Message::Text("Internal server error.".to_string())),
        )
    }

    fn with_data<T: Serialize>(status: StatusCode, data: T) -> Envelope {
        match serde_json::to_value(data) {
            Ok(data) => Envelope {
                status,
                body: Some(json!({ "status": true, "data": data })),
            },
            Err(e) => {
                tracing::error!("response serialization failed: {}", e);
                Self::internal_error()
            }
        }
    }

    fn failure(status: StatusCode, message: Option<Message>) -> Envelope {
        Envelope {
            status,
            body: Some(json!({ "status": false, "message": message })),
        }
    }
}
