use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, ApiPath};
use crate::{
    error::{AppResult, Entity, OptionExt, ServiceError},
    state::AppState,
    types::RuntimeDto,
};

pub async fn save(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<RuntimeDto>,
) -> AppResult<(StatusCode, Json<RuntimeDto>)> {
    let runtime = state.mapper.dto_to_runtime(dto).await?;
    let saved = state.runtimes.save(runtime).await?;
    Ok((StatusCode::CREATED, Json(state.mapper.runtime_to_dto(&saved))))
}

pub async fn save_all(
    State(state): State<AppState>,
    ApiJson(dtos): ApiJson<Vec<RuntimeDto>>,
) -> AppResult<(StatusCode, Json<Vec<RuntimeDto>>)> {
    let mut runtimes = Vec::with_capacity(dtos.len());
    for dto in dtos {
        runtimes.push(state.mapper.dto_to_runtime(dto).await?);
    }
    let saved = state.runtimes.save_all(runtimes).await?;
    let body: Vec<_> = saved.iter().map(|r| state.mapper.runtime_to_dto(r)).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<StatusCode> {
    state.runtimes.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<Json<RuntimeDto>> {
    let runtime = state.runtimes.find_by_id(id).await?.ok_or_not_found(Entity::Runtime, id)?;
    Ok(Json(state.mapper.runtime_to_dto(&runtime)))
}

pub async fn get_all(State(state): State<AppState>) -> AppResult<Json<Vec<RuntimeDto>>> {
    let runtimes = state.runtimes.find_all().await?;
    Ok(Json(runtimes.iter().map(|r| state.mapper.runtime_to_dto(r)).collect()))
}

pub async fn get_for_drawing(
    State(state): State<AppState>,
    ApiPath(drawing_id): ApiPath<i64>,
) -> AppResult<Json<Vec<RuntimeDto>>> {
    let runtimes = state.runtimes.find_by_drawing_id(drawing_id).await?;
    if runtimes.is_empty() {
        return Err(ServiceError::NotFoundForParent {
            entity: Entity::Runtime,
            parent: Entity::Drawing,
            id: drawing_id,
        }
        .into());
    }
    Ok(Json(runtimes.iter().map(|r| state.mapper.runtime_to_dto(r)).collect()))
}

pub async fn delete_for_drawing(
    State(state): State<AppState>,
    ApiPath(drawing_id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.runtimes.delete_by_drawing_id(drawing_id).await?;
    Ok(StatusCode::OK)
}
