use std::path::PathBuf;

use thiserror::Error;

/// Why an analysis attempt did not produce a normal result view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorCategory {
    /// No analysable URL was available; nothing was sent.
    #[error("No URL available")]
    NoUrl,
    /// The request failed before (or while) a response could be read.
    #[error("{0}")]
    NetworkFailure(String),
    /// The service answered with a non-2xx status.
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },
    /// 2xx, but the body was not JSON. Rendered as a degraded view, not a banner.
    #[error("(non-JSON response, status {status})")]
    MalformedResponse { status: u16 },
}

/// A classified failure together with the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<ErrorCategory> for ErrorDescriptor {
    fn from(category: ErrorCategory) -> Self {
        let message = category.to_string();
        Self { category, message }
    }
}

impl ErrorDescriptor {
    /// Failures that replace the result view with an error message.
    pub fn is_banner(&self) -> bool {
        !matches!(self.category, ErrorCategory::MalformedResponse { .. })
    }
}

/// Transport failures, split by the suspension point they happened at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Connect(String),
    #[error("{0}")]
    Body(String),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Errors at the binary edge (configuration, endpoint parsing).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid endpoint `{0}`: {1}")]
    Endpoint(String, url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
