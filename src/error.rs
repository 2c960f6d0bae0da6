use axum::extract::Json;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt::{self, Debug};
use std::time::Duration;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub retry: Option<RetryHint>,
}

/// Quota metadata attached to a rate limited error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryHint {
    pub remaining: u32,
    pub reset_after_secs: u64,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl Error {
    /// Codes below 100 and the missing routing credential are server side faults.
    pub fn is_internal(&self) -> bool {
        matches!(self.code, 1..=99 | 104)
    }

    pub fn status(&self) -> StatusCode {
        if self.is_internal() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }

        match self.code {
            102 => StatusCode::NOT_FOUND,
            103 => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.code == 103
    }

    pub fn is_invalid_location(&self) -> bool {
        self.code == 101
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if self.is_internal() {
            tracing::error!(code = self.code, "{}", self.message);
            "Internal Server Error"
        } else {
            self.message.as_str()
        };

        let body = Json(json!({
            "success": false,
            "code": self.code,
            "error": error_message,
        }));

        let mut headers = HeaderMap::new();
        if let Some(hint) = self.retry {
            headers.insert("retry-after", HeaderValue::from(hint.reset_after_secs));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(hint.remaining));
            headers.insert("x-ratelimit-reset", HeaderValue::from(hint.reset_after_secs));
        }

        (status, headers, body).into_response()
    }
}

fn error(code: i32, message: impl Into<String>) -> Error {
    Error {
        code,
        message: message.into(),
        retry: None,
    }
}

pub fn invalid_input_error(message: impl Into<String>) -> Error {
    error(100, message)
}

pub fn invalid_location_error() -> Error {
    error(101, "invalid coordinates")
}

pub fn not_found_error() -> Error {
    error(102, "shop not found")
}

pub fn rate_limited_error(remaining: u32, reset_after: Duration) -> Error {
    let reset_after_secs = ceil_secs(reset_after);

    Error {
        code: 103,
        message: format!("too many requests, retry in {} seconds", reset_after_secs),
        retry: Some(RetryHint {
            remaining,
            reset_after_secs,
        }),
    }
}

pub fn missing_credential_error() -> Error {
    error(104, "routing credential is not configured")
}

pub fn database_error<T: Debug>(err: T) -> Error {
    error(2, format!("database error: {:?}", err))
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    error(3, format!("reqwest error: {}", err))
}

pub fn unexpected_error() -> Error {
    error(5, "unexpected error")
}

pub fn config_error(name: &str, value: &str) -> Error {
    error(6, format!("invalid value {:?} for {}", value, name))
}

pub fn server_error<T: Debug>(err: T) -> Error {
    error(7, format!("server error: {:?}", err))
}

/// Whole seconds, rounded up so a retry hint never undershoots.
pub fn ceil_secs(duration: Duration) -> u64 {
    let millis = duration.as_millis() as u64;
    (millis + 999) / 1000
}
