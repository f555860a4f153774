//! Transactional scope for multi-statement writes.
//!
//! A pet write touches the item row, the tag table and the association table.
//! All of it happens inside one [`UnitOfWork`]; any error rolls the whole
//! sequence back, so no pet row survives without its declared tags.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Error, Result};

/// An open transaction plus the caller's cancellation token.
pub struct UnitOfWork<'c> {
  tx:     Transaction<'c>,
  cancel: &'c CancellationToken,
}

impl<'c> UnitOfWork<'c> {
  pub fn begin(conn: &'c mut Connection, cancel: &'c CancellationToken) -> Result<Self> {
    checkpoint(cancel)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    Ok(Self { tx, cancel })
  }

  /// The transaction's connection. Checks for cancellation first, so call it
  /// once per statement.
  pub fn conn(&self) -> Result<&Connection> {
    checkpoint(self.cancel)?;
    Ok(&*self.tx)
  }

  pub fn commit(self) -> Result<()> {
    checkpoint(self.cancel)?;
    self.tx.commit()?;
    Ok(())
  }

  pub fn rollback(self) -> Result<()> {
    self.tx.rollback()?;
    Ok(())
  }
}

/// Fail with [`Error::Cancelled`] if the token has fired.
pub fn checkpoint(cancel: &CancellationToken) -> Result<()> {
  if cancel.is_cancelled() {
    return Err(Error::Cancelled);
  }
  Ok(())
}

/// Run `work` in a fresh unit of work: commit on `Ok`, roll back on `Err`.
pub fn run<T>(
  conn: &mut Connection,
  cancel: &CancellationToken,
  work: impl FnOnce(&UnitOfWork<'_>) -> Result<T>,
) -> Result<T> {
  let uow = UnitOfWork::begin(conn, cancel)?;
  match work(&uow) {
    Ok(value) => {
      uow.commit()?;
      Ok(value)
    }
    Err(err) => {
      debug!(error = %err, "rolling back unit of work");
      if let Err(rollback_err) = uow.rollback() {
        warn!(error = %rollback_err, "rollback failed");
      }
      Err(err)
    }
  }
}
