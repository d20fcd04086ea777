use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::app::error::ServiceError;

/// Uniform response envelope. Errors are signaled in-band through `code`;
/// the transport status is always 200.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub message: String,
    pub data: Option<T>,
}

/// 200 envelope with a payload.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        code: 200,
        message: String::new(),
        data: Some(data),
    })
}

/// 200 envelope with no payload.
pub fn ok_empty() -> Json<Envelope<Value>> {
    Json(Envelope {
        code: 200,
        message: String::new(),
        data: None,
    })
}

#[derive(Debug)]
pub struct AppError {
    code: i64,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: 400,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: 401,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: 403,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: 404,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: 409,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => Self::not_found(format!("{what} not found")),
            ServiceError::Conflict(message) => Self::conflict(message),
            ServiceError::Forbidden(message) => Self::forbidden(message),
            ServiceError::Validation(message) => Self::bad_request(message),
            ServiceError::Database(err) => {
                tracing::error!(error = ?err, "store operation failed");
                Self::internal("internal error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Json(Envelope::<Value> {
            code: self.code,
            message: self.message,
            data: None,
        })
        .into_response()
    }
}
