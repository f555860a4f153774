//! The error taxonomy shared by every layer.
//!
//! Storage backends keep their own detailed error types and convert into
//! [`Error`] at the trait boundary; the HTTP layer only ever sees this enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A lookup by id or name yielded nothing. Empty *list* results are not
  /// errors.
  #[error("not found: {0}")]
  NotFound(String),

  /// A uniqueness violation (duplicate category or tag name, duplicate
  /// association).
  #[error("conflict: {0}")]
  Conflict(String),

  /// The caller supplied nothing to update, or a malformed value.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// Execution or connectivity failure in the backing store.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The caller aborted the operation before it completed.
  #[error("operation cancelled")]
  Cancelled,
}

/// Discriminant of [`Error`], for callers that branch on the class of failure
/// without caring about the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  BadRequest,
  Internal,
  Cancelled,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::BadRequest(_) => ErrorKind::BadRequest,
      Self::Internal(_) => ErrorKind::Internal,
      Self::Cancelled => ErrorKind::Cancelled,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
