use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized => Self::unauthorized(err.to_string()),
            other => Self::bad_gateway(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure talking to the remote month service. Never fatal: the local
/// month stays as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing credential or a `401` from the service.
    Unauthorized,
    Rejected { status: u16, body: String },
    Transport(String),
    Decode(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => f.write_str("session invalid: credential missing or rejected"),
            Self::Rejected { status, body } if body.is_empty() => {
                write!(f, "month service rejected request with status {status}")
            }
            Self::Rejected { status, body } => {
                write!(f, "month service rejected request with status {status}: {body}")
            }
            Self::Transport(message) => write!(f, "month service unreachable: {message}"),
            Self::Decode(message) => write!(f, "unreadable month document: {message}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
