//! Business rules over the repositories.
//!
//! Services own a pool handle, open one transaction per write (batches
//! included), check that referenced drawings and history entries exist, and
//! classify storage failures as [`ServiceError`]s.

mod drawing;
mod feedback;
mod history;
mod runtime;
mod search_data;

pub use drawing::DrawingService;
pub use feedback::FeedbackService;
pub use history::HistoryService;
pub use runtime::RuntimeService;
pub use search_data::SearchDataService;

use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::{Entity, ServiceError, ServiceResult};
use crate::repository;

/// Opens a transaction that holds the database write lock from its first
/// statement.
///
/// A deferred transaction that reads before it writes cannot wait for the
/// lock once another connection has committed; SQLite fails it with
/// `SQLITE_BUSY_SNAPSHOT` instead. `BEGIN IMMEDIATE` waits out the busy
/// timeout like any other lock request.
pub(crate) async fn begin_write(pool: &SqlitePool) -> ServiceResult<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;
    // The pool opened a deferred transaction, which holds no lock yet
    (&mut *tx).execute("ROLLBACK").await?;
    if let Err(err) = (&mut *tx).execute("BEGIN IMMEDIATE").await {
        // Reopen a plain transaction so dropping `tx` has one to roll back
        if let Err(reopen) = (&mut *tx).execute("BEGIN").await {
            tracing::error!(error = %reopen, "Failed to reopen transaction after lock failure");
        }
        return Err(err.into());
    }
    Ok(tx)
}

/// Reports a dangling reference caught by the store as the drawing the
/// write pointed at.
pub(crate) fn or_missing_drawing(drawing_id: i64) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |err| match ServiceError::from(err) {
        ServiceError::ForeignKeyViolation(detail) => {
            tracing::debug!(drawing_id, %detail, "Foreign key violation on write");
            ServiceError::not_found(Entity::Drawing, drawing_id)
        }
        other => other,
    }
}

pub(crate) async fn ensure_drawing(conn: &mut SqliteConnection, drawing_id: i64) -> ServiceResult<()> {
    if repository::drawing::exists(conn, drawing_id).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found(Entity::Drawing, drawing_id))
    }
}

pub(crate) async fn ensure_history(conn: &mut SqliteConnection, history_id: i64) -> ServiceResult<()> {
    if repository::history::exists(conn, history_id).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found(Entity::History, history_id))
    }
}
