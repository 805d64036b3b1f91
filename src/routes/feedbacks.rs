use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, ApiPath};
use crate::{
    error::{AppResult, Entity, OptionExt, ServiceError},
    state::AppState,
    types::FeedbackDto,
};

pub async fn save(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<FeedbackDto>,
) -> AppResult<(StatusCode, Json<FeedbackDto>)> {
    let feedback = state.mapper.dto_to_feedback(dto).await?;
    let saved = state.feedbacks.save(feedback).await?;
    Ok((StatusCode::CREATED, Json(state.mapper.feedback_to_dto(&saved))))
}

pub async fn save_all(
    State(state): State<AppState>,
    ApiJson(dtos): ApiJson<Vec<FeedbackDto>>,
) -> AppResult<(StatusCode, Json<Vec<FeedbackDto>>)> {
    let mut feedbacks = Vec::with_capacity(dtos.len());
    for dto in dtos {
        feedbacks.push(state.mapper.dto_to_feedback(dto).await?);
    }
    let saved = state.feedbacks.save_all(feedbacks).await?;
    let body: Vec<_> = saved.iter().map(|f| state.mapper.feedback_to_dto(f)).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<StatusCode> {
    state.feedbacks.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<Json<FeedbackDto>> {
    let feedback = state.feedbacks.find_by_id(id).await?.ok_or_not_found(Entity::Feedback, id)?;
    Ok(Json(state.mapper.feedback_to_dto(&feedback)))
}

pub async fn get_all(State(state): State<AppState>) -> AppResult<Json<Vec<FeedbackDto>>> {
    let feedbacks = state.feedbacks.find_all().await?;
    Ok(Json(feedbacks.iter().map(|f| state.mapper.feedback_to_dto(f)).collect()))
}

pub async fn get_for_history(
    State(state): State<AppState>,
    ApiPath(history_id): ApiPath<i64>,
) -> AppResult<Json<Vec<FeedbackDto>>> {
    let feedbacks = state.feedbacks.find_by_history_id(history_id).await?;
    if feedbacks.is_empty() {
        return Err(ServiceError::NotFoundForParent {
            entity: Entity::Feedback,
            parent: Entity::History,
            id: history_id,
        }
        .into());
    }
    Ok(Json(feedbacks.iter().map(|f| state.mapper.feedback_to_dto(f)).collect()))
}
