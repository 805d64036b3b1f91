use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, ApiPath};
use crate::{
    error::{AppResult, Entity, OptionExt, ServiceError},
    state::AppState,
    types::SearchDataDto,
};

pub async fn save(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<SearchDataDto>,
) -> AppResult<(StatusCode, Json<SearchDataDto>)> {
    let search_data = state.mapper.dto_to_search_data(dto).await?;
    let saved = state.search_data.save(search_data).await?;
    Ok((StatusCode::CREATED, Json(state.mapper.search_data_to_dto(&saved))))
}

pub async fn save_all(
    State(state): State<AppState>,
    ApiJson(dtos): ApiJson<Vec<SearchDataDto>>,
) -> AppResult<(StatusCode, Json<Vec<SearchDataDto>>)> {
    let mut entries = Vec::with_capacity(dtos.len());
    for dto in dtos {
        entries.push(state.mapper.dto_to_search_data(dto).await?);
    }
    let saved = state.search_data.save_all(entries).await?;
    let body: Vec<_> = saved.iter().map(|s| state.mapper.search_data_to_dto(s)).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<StatusCode> {
    state.search_data.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<Json<SearchDataDto>> {
    let entry = state.search_data.find_by_id(id).await?.ok_or_not_found(Entity::SearchData, id)?;
    Ok(Json(state.mapper.search_data_to_dto(&entry)))
}

pub async fn get_all(State(state): State<AppState>) -> AppResult<Json<Vec<SearchDataDto>>> {
    let entries = state.search_data.find_all().await?;
    Ok(Json(entries.iter().map(|s| state.mapper.search_data_to_dto(s)).collect()))
}

pub async fn get_for_drawing(
    State(state): State<AppState>,
    ApiPath(drawing_id): ApiPath<i64>,
) -> AppResult<Json<SearchDataDto>> {
    let entry = state.search_data.find_by_drawing_id(drawing_id).await?.ok_or(
        ServiceError::NotFoundForParent {
            entity: Entity::SearchData,
            parent: Entity::Drawing,
            id: drawing_id,
        },
    )?;
    Ok(Json(state.mapper.search_data_to_dto(&entry)))
}

pub async fn delete_for_drawing(
    State(state): State<AppState>,
    ApiPath(drawing_id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.search_data.delete_by_drawing_id(drawing_id).await?;
    Ok(StatusCode::OK)
}
