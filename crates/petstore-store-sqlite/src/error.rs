//! Error type for `petstore-store-sqlite`.

use petstore_core::pet::Id;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("pet not found: {0}")]
  PetNotFound(Id),

  /// Pets may only reference categories that already exist.
  #[error("category not found: {0:?}")]
  CategoryNotFound(String),

  #[error("order not found: {0}")]
  OrderNotFound(Id),

  #[error("user not found: {0:?}")]
  UserNotFound(String),

  #[error("nothing to update")]
  NothingToUpdate,

  #[error("invalid input: {0}")]
  Invalid(String),

  #[error("operation cancelled")]
  Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// The underlying SQLite failure, if this error came from a statement.
  fn sqlite_failure(&self) -> Option<&ffi::Error> {
    let err = match self {
      Self::Sqlite(e) | Self::Database(tokio_rusqlite::Error::Rusqlite(e)) => e,
      _ => return None,
    };
    match err {
      rusqlite::Error::SqliteFailure(f, _) => Some(f),
      _ => None,
    }
  }

  /// A statement stopped by [`rusqlite::InterruptHandle::interrupt`].
  pub fn is_interrupt(&self) -> bool {
    self
      .sqlite_failure()
      .is_some_and(|f| f.code == rusqlite::ErrorCode::OperationInterrupted)
  }

  pub fn is_unique_violation(&self) -> bool {
    self.sqlite_failure().is_some_and(|f| {
      f.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    })
  }
}

impl From<Error> for petstore_core::Error {
  fn from(err: Error) -> Self {
    use petstore_core::Error as Core;

    if err.is_unique_violation() {
      return Core::Conflict(err.to_string());
    }
    if let Some(f) = err.sqlite_failure() {
      match f.code {
        rusqlite::ErrorCode::ConstraintViolation => return Core::BadRequest(err.to_string()),
        rusqlite::ErrorCode::OperationInterrupted => return Core::Cancelled,
        _ => {}
      }
    }

    match err {
      Error::PetNotFound(id) => Core::NotFound(format!("pet {id}")),
      Error::OrderNotFound(id) => Core::NotFound(format!("order {id}")),
      Error::UserNotFound(name) => Core::NotFound(format!("user {name:?}")),
      Error::CategoryNotFound(name) => Core::NotFound(format!("category {name:?}")),
      Error::NothingToUpdate => Core::BadRequest("nothing to update".to_owned()),
      Error::Invalid(msg) => Core::BadRequest(msg),
      Error::Cancelled => Core::Cancelled,
      other => Core::Internal(Box::new(other)),
    }
  }
}
