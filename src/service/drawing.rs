use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, ensure_history, or_missing_drawing};
use crate::{error::ServiceResult, model::Drawing, repository};

#[derive(Clone)]
pub struct DrawingService {
    pool: SqlitePool,
}

impl DrawingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn check_references(conn: &mut SqliteConnection, drawing: &Drawing) -> ServiceResult<()> {
        for feedback in &drawing.feedbacks {
            ensure_history(&mut *conn, feedback.history_id).await?;
        }
        Ok(())
    }

    /// Writes the drawing and its children in one transaction.
    pub async fn save(&self, drawing: Drawing) -> ServiceResult<Drawing> {
        let mut tx = begin_write(&self.pool).await?;
        Self::check_references(&mut *tx, &drawing).await?;
        let saved = repository::drawing::save(&mut *tx, &drawing)
            .await
            .map_err(or_missing_drawing(drawing.drawing_id))?;
        tx.commit().await?;

        tracing::info!(
            drawing_id = saved.drawing_id,
            runtimes = saved.runtimes.len(),
            has_search_data = saved.search_data.is_some(),
            "Saved drawing"
        );
        Ok(saved)
    }

    /// All or nothing: the first failing drawing rolls back the batch.
    pub async fn save_all(&self, drawings: Vec<Drawing>) -> ServiceResult<Vec<Drawing>> {
        let mut tx = begin_write(&self.pool).await?;
        for drawing in &drawings {
            Self::check_references(&mut *tx, drawing).await?;
        }
        let saved = repository::drawing::save_all(&mut *tx, &drawings).await?;
        tx.commit().await?;

        tracing::info!(count = saved.len(), "Saved drawings");
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Drawing>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::drawing::find_by_id(&mut *conn, id).await?)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Drawing>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::drawing::find_all(&mut conn).await?)
    }

    /// Removes the drawing with its runtimes, search data and feedbacks.
    /// Returns `false` when there was nothing to delete.
    pub async fn delete_by_id(&self, id: i64) -> ServiceResult<bool> {
        let mut tx = begin_write(&self.pool).await?;
        let removed = repository::drawing::delete_by_id(&mut *tx, id).await?;
        tx.commit().await?;

        if removed {
            tracing::info!(drawing_id = id, "Deleted drawing");
        } else {
            tracing::debug!(drawing_id = id, "Delete of unknown drawing ignored");
        }
        Ok(removed)
    }

    pub async fn exists(&self, id: i64) -> ServiceResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::drawing::exists(&mut *conn, id).await?)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::drawing::count(&mut conn).await?)
    }
}
