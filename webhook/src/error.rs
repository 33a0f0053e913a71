use std::{fmt, io};

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

/// Failures surfaced to the webhook caller
#[derive(Debug)]
pub(crate) enum WebhookError {
    /// Verification token missing or wrong
    Forbidden,
    /// Form body or embedded JSON could not be parsed
    BadRequest(String),
    /// Ledger could not be written
    Storage(io::Error),
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookError::Forbidden => write!(f, "verification token mismatch"),
            WebhookError::BadRequest(reason) => write!(f, "bad request: {reason}"),
            WebhookError::Storage(err) => write!(f, "ledger write failed: {err}"),
        }
    }
}

impl From<io::Error> for WebhookError {
    fn from(err: io::Error) -> Self {
        WebhookError::Storage(err)
    }
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Forbidden => StatusCode::FORBIDDEN,
            WebhookError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebhookError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            WebhookError::Forbidden => "Forbidden",
            WebhookError::BadRequest(_) => "Bad Request",
            WebhookError::Storage(_) => "Internal Server Error",
        };
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}
