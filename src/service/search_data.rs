use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, ensure_drawing, or_missing_drawing};
use crate::{
    error::{Entity, ServiceError, ServiceResult},
    model::SearchData,
    repository,
};

#[derive(Clone)]
pub struct SearchDataService {
    pool: SqlitePool,
}

impl SearchDataService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn save_in(conn: &mut SqliteConnection, search_data: &SearchData) -> ServiceResult<SearchData> {
        ensure_drawing(&mut *conn, search_data.drawing_id).await?;
        repository::search_data::save(conn, search_data)
            .await
            .map_err(or_missing_drawing(search_data.drawing_id))
    }

    /// Replaces whatever search data the drawing had before.
    pub async fn save(&self, search_data: SearchData) -> ServiceResult<SearchData> {
        let mut tx = begin_write(&self.pool).await?;
        let saved = Self::save_in(&mut *tx, &search_data).await?;
        tx.commit().await?;

        tracing::info!(
            search_data_id = saved.search_data_id,
            drawing_id = saved.drawing_id,
            "Saved search data"
        );
        Ok(saved)
    }

    pub async fn save_all(&self, entries: Vec<SearchData>) -> ServiceResult<Vec<SearchData>> {
        let mut tx = begin_write(&self.pool).await?;
        for entry in &entries {
            ensure_drawing(&mut *tx, entry.drawing_id).await?;
        }
        let saved = repository::search_data::save_all(&mut *tx, &entries).await?;
        tx.commit().await?;

        tracing::info!(count = saved.len(), "Saved search data entries");
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<SearchData>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::search_data::find_by_id(&mut *conn, id).await?)
    }

    pub async fn find_by_drawing_id(&self, drawing_id: i64) -> ServiceResult<Option<SearchData>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::search_data::find_by_drawing_id(&mut *conn, drawing_id).await?)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<SearchData>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::search_data::find_all(&mut *conn).await?)
    }

    /// Detaches the entry from its drawing and deletes it. Unlike the other
    /// deletes this one fails for an unknown id.
    pub async fn delete_by_id(&self, id: i64) -> ServiceResult<()> {
        let mut tx = begin_write(&self.pool).await?;
        let entry = repository::search_data::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Entity::SearchData, id))?;
        repository::search_data::delete_by_id(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(search_data_id = id, drawing_id = entry.drawing_id, "Deleted search data");
        Ok(())
    }

    pub async fn delete_by_drawing_id(&self, drawing_id: i64) -> ServiceResult<u64> {
        let mut tx = begin_write(&self.pool).await?;
        ensure_drawing(&mut *tx, drawing_id).await?;
        let removed = repository::search_data::delete_by_drawing_id(&mut *tx, drawing_id).await?;
        tx.commit().await?;

        tracing::info!(drawing_id, removed, "Deleted search data of drawing");
        Ok(removed)
    }

    pub async fn exists(&self, id: i64) -> ServiceResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::search_data::exists(&mut *conn, id).await?)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::search_data::count(&mut *conn).await?)
    }
}
