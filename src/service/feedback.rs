use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, ensure_drawing, ensure_history, or_missing_drawing};
use crate::{
    error::{Entity, ServiceError, ServiceResult},
    model::Feedback,
    repository,
};

#[derive(Clone)]
pub struct FeedbackService {
    pool: SqlitePool,
}

impl FeedbackService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends the feedback to its history entry and writes the entry, so the
    /// feedback is stored through the history's cascade.
    async fn save_in(conn: &mut SqliteConnection, mut feedback: Feedback) -> ServiceResult<Feedback> {
        feedback.feedback_id = None;
        let drawing_id = feedback.drawing_id;
        let history_id = feedback.history_id;

        ensure_drawing(&mut *conn, drawing_id).await?;
        let mut history = repository::history::find_by_id(&mut *conn, history_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Entity::History, history_id))?;
        history.add_feedback(feedback);

        let mut saved = repository::history::save(conn, &history)
            .await
            .map_err(or_missing_drawing(drawing_id))?;
        // The new feedback was appended last and got the highest id
        saved
            .feedbacks
            .pop()
            .ok_or(ServiceError::Storage(sqlx::Error::RowNotFound))
    }

    /// Always creates a new feedback; an incoming id is ignored.
    pub async fn save(&self, feedback: Feedback) -> ServiceResult<Feedback> {
        let mut tx = begin_write(&self.pool).await?;
        let saved = Self::save_in(&mut *tx, feedback).await?;
        tx.commit().await?;

        tracing::info!(
            feedback_id = saved.feedback_id,
            history_id = saved.history_id,
            drawing_id = saved.drawing_id,
            value = saved.feedback_value.as_i64(),
            "Saved feedback"
        );
        Ok(saved)
    }

    /// Inserts the feedbacks as new rows of their history entries, after
    /// checking every drawing and entry they point at.
    pub async fn save_all(&self, mut feedbacks: Vec<Feedback>) -> ServiceResult<Vec<Feedback>> {
        let mut tx = begin_write(&self.pool).await?;
        for feedback in &mut feedbacks {
            feedback.feedback_id = None;
            ensure_drawing(&mut *tx, feedback.drawing_id).await?;
            ensure_history(&mut *tx, feedback.history_id).await?;
        }
        let saved = repository::feedback::save_all(&mut *tx, &feedbacks).await?;
        tx.commit().await?;

        tracing::info!(count = saved.len(), "Saved feedbacks");
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Feedback>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::feedback::find_by_id(&mut *conn, id).await?)
    }

    pub async fn find_by_history_id(&self, history_id: i64) -> ServiceResult<Vec<Feedback>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::feedback::find_by_history_id(&mut *conn, history_id).await?)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Feedback>> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::feedback::find_all(&mut *conn).await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> ServiceResult<bool> {
        let mut tx = begin_write(&self.pool).await?;
        let removed = repository::feedback::delete_by_id(&mut *tx, id).await?;
        tx.commit().await?;

        if removed {
            tracing::info!(feedback_id = id, "Deleted feedback");
        }
        Ok(removed)
    }

    pub async fn exists(&self, id: i64) -> ServiceResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::feedback::exists(&mut *conn, id).await?)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(repository::feedback::count(&mut *conn).await?)
    }
}
