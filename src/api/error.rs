//! Boundary error taxonomy
//!
//! Every backend call collapses into one of four kinds so screens can branch
//! on the kind instead of matching on message strings.

use std::fmt;

/// Failure of a single backend call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport failure: connect refused, timeout, broken body stream
    Network(String),
    /// HTTP 404 from the backend
    NotFound { path: String },
    /// HTTP 400/409/422 - the backend rejected the payload
    Validation { status: u16, message: String },
    /// Any other non-success status, or a body we could not decode
    Server { status: Option<u16>, message: String },
}

/// Coarse kind, for branching without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    NotFound,
    Validation,
    Server,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    /// Classify a non-success HTTP status
    ///
    /// `message` is the backend's `{"error": ...}` text when present,
    /// otherwise the raw body.
    pub fn from_status(status: u16, path: &str, message: String) -> Self {
        match status {
            404 => Self::NotFound {
                path: path.to_string(),
            },
            400 | 409 | 422 => Self::Validation { status, message },
            _ => Self::Server {
                status: Some(status),
                message,
            },
        }
    }

    /// A success response whose body did not match the expected shape
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Server {
            status: None,
            message: message.into(),
        }
    }

    /// Short message suitable for an inline error line in the TUI
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Backend unreachable".to_string(),
            Self::NotFound { .. } => "Record no longer exists".to_string(),
            Self::Validation { message, .. } if !message.is_empty() => {
                format!("Rejected: {}", message)
            }
            Self::Validation { .. } => "Rejected by backend".to_string(),
            Self::Server { .. } => "Backend error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::decode(err.to_string());
        }
        if let Some(status) = err.status() {
            let path = err.url().map_or("", |u| u.path()).to_string();
            return Self::from_status(status.as_u16(), &path, err.to_string());
        }
        Self::Network(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::NotFound { path } => write!(f, "Not found: {}", path),
            Self::Validation { status, message } => {
                write!(f, "Validation failed ({}): {}", status, message)
            }
            Self::Server {
                status: Some(status),
                message,
            } => write!(f, "Server error ({}): {}", status, message),
            Self::Server {
                status: None,
                message,
            } => write!(f, "Malformed response: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Local form validation failure - never reaches the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    /// Field key the message refers to (`None` for whole-form errors)
    pub field: Option<&'static str>,
    pub message: String,
}

impl FormError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FormError {}
