//! Conversion between stored entities and their wire DTOs.
//!
//! Entity -> DTO is pure. DTO -> entity is async because references to a
//! parent by id are checked against the store before anything is built.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::{ServiceError, ServiceResult},
    model::{Drawing, Feedback, FeedbackValue, History, Runtime, SearchData},
    service::{ensure_drawing, ensure_history},
    types::{DrawingDto, FeedbackDto, HistoryDto, RuntimeDto, SearchDataDto},
};

#[derive(Clone)]
pub struct DtoMapper {
    pool: SqlitePool,
}

fn decode_binary(field: &'static str, encoded: &str) -> ServiceResult<Vec<u8>> {
    STANDARD.decode(encoded.trim()).map_err(|e| ServiceError::InvalidInput {
        field,
        message: format!("not valid base64: {}", e),
    })
}

fn feedback_value(raw: i64) -> ServiceResult<FeedbackValue> {
    FeedbackValue::try_from(raw).map_err(|v| ServiceError::InvalidInput {
        field: "feedback_value",
        message: format!("expected 0, 1 or 2, got {}", v),
    })
}

impl DtoMapper {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn drawing_to_dto(&self, drawing: &Drawing) -> DrawingDto {
        DrawingDto {
            drawing_id: drawing.drawing_id,
            original_drawing: STANDARD.encode(&drawing.original_drawing),
            runtimes: drawing.runtimes.iter().map(|r| self.runtime_to_dto(r)).collect(),
            search_data: drawing.search_data.as_ref().map(|s| self.search_data_to_dto(s)),
            feedbacks: drawing.feedbacks.iter().map(|f| self.feedback_to_dto(f)).collect(),
        }
    }

    pub fn runtime_to_dto(&self, runtime: &Runtime) -> RuntimeDto {
        RuntimeDto {
            runtime_id: runtime.runtime_id,
            drawing_id: runtime.drawing_id,
            machine: runtime.machine.clone(),
            machine_runtime: runtime.machine_runtime,
        }
    }

    pub fn search_data_to_dto(&self, search_data: &SearchData) -> SearchDataDto {
        SearchDataDto {
            search_data_id: search_data.search_data_id,
            drawing_id: search_data.drawing_id,
            features: search_data.features.clone(),
        }
    }

    pub fn feedback_to_dto(&self, feedback: &Feedback) -> FeedbackDto {
        FeedbackDto {
            feedback_id: feedback.feedback_id,
            history_id: feedback.history_id,
            drawing_id: feedback.drawing_id,
            feedback_desc: feedback.feedback_desc.clone(),
            feedback_value: feedback.feedback_value.as_i64(),
        }
    }

    pub fn history_to_dto(&self, history: &History) -> HistoryDto {
        HistoryDto {
            history_id: history.history_id,
            query_drawing: STANDARD.encode(&history.query_drawing),
            query_path: history.query_path.clone(),
            timestamp: Some(history.timestamp),
            feedbacks: history.feedbacks.iter().map(|f| self.feedback_to_dto(f)).collect(),
        }
    }

    /// Builds a drawing with all nested children pointing back at it.
    ///
    /// Nested feedbacks keep their own `history_id`, which must exist.
    pub async fn dto_to_drawing(&self, dto: DrawingDto) -> ServiceResult<Drawing> {
        let mut conn = self.pool.acquire().await?;

        let mut drawing = Drawing::new(dto.drawing_id, decode_binary("original_drawing", &dto.original_drawing)?);
        drawing.runtimes = dto.runtimes.into_iter().map(runtime_from_dto).collect();
        drawing.search_data = dto.search_data.map(search_data_from_dto);
        for feedback in dto.feedbacks {
            ensure_history(&mut *conn, feedback.history_id).await?;
            drawing.feedbacks.push(feedback_from_dto(feedback)?);
        }
        drawing.link_children();
        Ok(drawing)
    }

    pub async fn dto_to_runtime(&self, dto: RuntimeDto) -> ServiceResult<Runtime> {
        let mut conn = self.pool.acquire().await?;
        ensure_drawing(&mut *conn, dto.drawing_id).await?;
        Ok(runtime_from_dto(dto))
    }

    pub async fn dto_to_search_data(&self, dto: SearchDataDto) -> ServiceResult<SearchData> {
        let mut conn = self.pool.acquire().await?;
        ensure_drawing(&mut *conn, dto.drawing_id).await?;
        Ok(search_data_from_dto(dto))
    }

    /// Checks the drawing first, then the history entry.
    pub async fn dto_to_feedback(&self, dto: FeedbackDto) -> ServiceResult<Feedback> {
        let mut conn = self.pool.acquire().await?;
        ensure_drawing(&mut *conn, dto.drawing_id).await?;
        ensure_history(&mut *conn, dto.history_id).await?;
        feedback_from_dto(dto)
    }

    /// A missing timestamp is stamped with the current time. Nested feedbacks
    /// are linked to this entry and only their drawing is checked.
    pub async fn dto_to_history(&self, dto: HistoryDto) -> ServiceResult<History> {
        let mut conn = self.pool.acquire().await?;

        let mut history = History {
            history_id: dto.history_id,
            query_drawing: decode_binary("query_drawing", &dto.query_drawing)?,
            query_path: dto.query_path,
            timestamp: dto.timestamp.unwrap_or_else(Utc::now),
            feedbacks: Vec::with_capacity(dto.feedbacks.len()),
        };
        for feedback in dto.feedbacks {
            ensure_drawing(&mut *conn, feedback.drawing_id).await?;
            history.add_feedback(feedback_from_dto(feedback)?);
        }
        history.link_children();
        Ok(history)
    }
}

fn runtime_from_dto(dto: RuntimeDto) -> Runtime {
    Runtime {
        runtime_id: dto.runtime_id,
        drawing_id: dto.drawing_id,
        machine: dto.machine,
        machine_runtime: dto.machine_runtime,
    }
}

fn search_data_from_dto(dto: SearchDataDto) -> SearchData {
    SearchData {
        search_data_id: dto.search_data_id,
        drawing_id: dto.drawing_id,
        features: dto.features,
    }
}

fn feedback_from_dto(dto: FeedbackDto) -> ServiceResult<Feedback> {
    Ok(Feedback {
        feedback_id: dto.feedback_id,
        history_id: dto.history_id,
        drawing_id: dto.drawing_id,
        feedback_desc: dto.feedback_desc,
        feedback_value: feedback_value(dto.feedback_value)?,
    })
}
