use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, ApiPath};
use crate::{
    error::{AppResult, Entity, OptionExt},
    state::AppState,
    types::DrawingDto,
};

pub async fn save(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<DrawingDto>,
) -> AppResult<(StatusCode, Json<DrawingDto>)> {
    let drawing = state.mapper.dto_to_drawing(dto).await?;
    let saved = state.drawings.save(drawing).await?;
    Ok((StatusCode::CREATED, Json(state.mapper.drawing_to_dto(&saved))))
}

pub async fn save_all(
    State(state): State<AppState>,
    ApiJson(dtos): ApiJson<Vec<DrawingDto>>,
) -> AppResult<(StatusCode, Json<Vec<DrawingDto>>)> {
    let mut drawings = Vec::with_capacity(dtos.len());
    for dto in dtos {
        drawings.push(state.mapper.dto_to_drawing(dto).await?);
    }
    let saved = state.drawings.save_all(drawings).await?;
    let body: Vec<_> = saved.iter().map(|d| state.mapper.drawing_to_dto(d)).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<StatusCode> {
    state.drawings.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<Json<DrawingDto>> {
    let drawing = state.drawings.find_by_id(id).await?.ok_or_not_found(Entity::Drawing, id)?;
    Ok(Json(state.mapper.drawing_to_dto(&drawing)))
}

pub async fn get_all(State(state): State<AppState>) -> AppResult<Json<Vec<DrawingDto>>> {
    let drawings = state.drawings.find_all().await?;
    Ok(Json(drawings.iter().map(|d| state.mapper.drawing_to_dto(d)).collect()))
}
