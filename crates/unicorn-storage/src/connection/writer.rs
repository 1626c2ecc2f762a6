//! Write transaction helper.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use unicorn_core::errors::StorageError;

/// Run `f` inside a `BEGIN IMMEDIATE` transaction, committing on success.
/// The write lock is taken up front so the commit cannot fail with
/// `SQLITE_BUSY` after work was done.
pub fn with_immediate_transaction<F, T>(conn: &mut Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    // Dropping `tx` on the error path rolls back.
    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;
    Ok(result)
}
