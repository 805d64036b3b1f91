use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, ensure_drawing, or_missing_drawing};
use crate::{error::ServiceResult, model::Runtime, repository};

#[derive(Clone)]
pub struct RuntimeService {
    pool: SqlitePool,
}

impl RuntimeService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn save_in(conn: &mut SqliteConnection, runtime: &Runtime) -> ServiceResult<Runtime> {
        ensure_drawing(&mut *conn, runtime.drawing_id).await?;
        repository::runtime::save(conn, runtime)
            .await
            .map_err(or_missing_drawing(runtime.drawing_id))
    }

    pub async fn save(&self, runtime: Runtime) -> ServiceResult<Runtime> {
        let mut tx = begin_write(&self.pool).await?;
        let saved = Self::save_in(&mut *tx, &runtime).await?;
        tx.commit().await?;

        tracing::info!(runtime_id = saved.runtime_id, drawing_id = saved.drawing_id, "Saved runtime");
        Ok(saved)
    }

    /// All or nothing: every drawing is checked before the first row is written.
    pub async fn save_all(&self, runtimes: Vec<Runtime>) -> ServiceResult<Vec<Runtime>> {
        let mut tx = begin_write(&self.pool).await?;
        for runtime in &runtimes {
            ensure_drawing(&mut *tx, runtime.drawing_id).await?;
        }
        let saved = repository::runtime::save_all(&mut *tx, &runtimes).await?;
        tx.commit().await?;

        tracing::info!(count = saved.len(), "Saved runtimes");
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Runtime>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::runtime::find_by_id(&mut *conn, id).await?)
    }

    /// Empty when the drawing has no runtimes or does not exist.
    pub async fn find_by_drawing_id(&self, drawing_id: i64) -> ServiceResult<Vec<Runtime>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::runtime::find_by_drawing_id(&mut *conn, drawing_id).await?)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Runtime>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::runtime::find_all(&mut *conn).await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> ServiceResult<bool> {
        let mut tx = begin_write(&self.pool).await?;
        let removed = repository::runtime::delete_by_id(&mut *tx, id).await?;
        tx.commit().await?;

        if removed {
            tracing::info!(runtime_id = id, "Deleted runtime");
        }
        Ok(removed)
    }

    /// Drops every runtime of the drawing and keeps the drawing itself.
    pub async fn delete_by_drawing_id(&self, drawing_id: i64) -> ServiceResult<u64> {
        let mut tx = begin_write(&self.pool).await?;
        ensure_drawing(&mut *tx, drawing_id).await?;
        let removed = repository::runtime::delete_by_drawing_id(&mut *tx, drawing_id).await?;
        tx.commit().await?;

        tracing::info!(drawing_id, removed, "Deleted runtimes of drawing");
        Ok(removed)
    }

    pub async fn exists(&self, id: i64) -> ServiceResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::runtime::exists(&mut *conn, id).await?)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::runtime::count(&mut *conn).await?)
    }
}
