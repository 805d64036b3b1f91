use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, ApiPath};
use crate::{
    error::{AppResult, Entity, OptionExt},
    state::AppState,
    types::HistoryDto,
};

pub async fn save(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<HistoryDto>,
) -> AppResult<(StatusCode, Json<HistoryDto>)> {
    let history = state.mapper.dto_to_history(dto).await?;
    let saved = state.history.save(history).await?;
    Ok((StatusCode::CREATED, Json(state.mapper.history_to_dto(&saved))))
}

pub async fn save_all(
    State(state): State<AppState>,
    ApiJson(dtos): ApiJson<Vec<HistoryDto>>,
) -> AppResult<(StatusCode, Json<Vec<HistoryDto>>)> {
    let mut entries = Vec::with_capacity(dtos.len());
    for dto in dtos {
        entries.push(state.mapper.dto_to_history(dto).await?);
    }
    let saved = state.history.save_all(entries).await?;
    let body: Vec<_> = saved.iter().map(|h| state.mapper.history_to_dto(h)).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<StatusCode> {
    state.history.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<Json<HistoryDto>> {
    let history = state.history.find_by_id(id).await?.ok_or_not_found(Entity::History, id)?;
    Ok(Json(state.mapper.history_to_dto(&history)))
}

pub async fn get_all(State(state): State<AppState>) -> AppResult<Json<Vec<HistoryDto>>> {
    let entries = state.history.find_all().await?;
    Ok(Json(entries.iter().map(|h| state.mapper.history_to_dto(h)).collect()))
}
