use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, ensure_drawing};
use crate::{error::ServiceResult, model::History, repository};

#[derive(Clone)]
pub struct HistoryService {
    pool: SqlitePool,
}

impl HistoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Clears incoming ids and checks the drawing of every feedback, so a
    /// missing drawing is reported with its own id.
    async fn prepare(conn: &mut SqliteConnection, history: &mut History) -> ServiceResult<()> {
        history.history_id = None;
        for feedback in &mut history.feedbacks {
            feedback.feedback_id = None;
            ensure_drawing(&mut *conn, feedback.drawing_id).await?;
        }
        Ok(())
    }

    /// Always creates a new entry; an incoming id is ignored.
    pub async fn save(&self, mut history: History) -> ServiceResult<History> {
        let mut tx = begin_write(&self.pool).await?;
        Self::prepare(&mut *tx, &mut history).await?;
        let saved = repository::history::save(&mut *tx, &history).await?;
        tx.commit().await?;

        tracing::info!(
            history_id = saved.history_id,
            query_path = saved.query_path.as_deref().unwrap_or(""),
            "Saved history entry"
        );
        Ok(saved)
    }

    pub async fn save_all(&self, mut entries: Vec<History>) -> ServiceResult<Vec<History>> {
        let mut tx = begin_write(&self.pool).await?;
        for entry in &mut entries {
            Self::prepare(&mut *tx, entry).await?;
        }
        let saved = repository::history::save_all(&mut *tx, &entries).await?;
        tx.commit().await?;

        tracing::info!(count = saved.len(), "Saved history entries");
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<History>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::history::find_by_id(&mut *conn, id).await?)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<History>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::history::find_all(&mut *conn).await?)
    }

    /// Removes the entry and every feedback given on it.
    pub async fn delete_by_id(&self, id: i64) -> ServiceResult<bool> {
        let mut tx = begin_write(&self.pool).await?;
        let removed = repository::history::delete_by_id(&mut *tx, id).await?;
        tx.commit().await?;

        if removed {
            tracing::info!(history_id = id, "Deleted history entry");
        }
        Ok(removed)
    }

    pub async fn exists(&self, id: i64) -> ServiceResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::history::exists(&mut *conn, id).await?)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::history::count(&mut *conn).await?)
    }
}
