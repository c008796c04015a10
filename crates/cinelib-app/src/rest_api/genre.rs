use axum::{
    Json, Router,
    extract::{Path, Query},
    response::{IntoResponse, Response},
};
use axum_valid::Garde;
use cinelib_dal::genre::{CreateGenre, GenreRepository};
use http::StatusCode;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

crate::repository_from_request!(GenreRepository);

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    title: Option<String>,
}

pub async fn list(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let records = repository.list_all().await?;
    Ok((StatusCode::OK, Json(records)))
}

pub async fn select_items(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let items = repository.select_items().await?;
    Ok((StatusCode::OK, Json(items)))
}

/// Responds with `null` for an empty query and `[]` for no matches.
pub async fn search(
    Query(query): Query<SearchQuery>,
    repository: GenreRepository,
) -> ApiResult<impl IntoResponse> {
    let found = repository
        .search(query.title.as_deref().unwrap_or_default())
        .await?;
    Ok((StatusCode::OK, Json(found)))
}

pub async fn count(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let count = repository.count().await?;
    Ok((StatusCode::OK, Json(count)))
}

pub async fn get(Path(id): Path<i64>, repository: GenreRepository) -> ApiResult<Response> {
    match repository.get(id).await? {
        Some(record) => Ok((StatusCode::OK, Json(record)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn create(
    repository: GenreRepository,
    Garde(Json(payload)): Garde<Json<CreateGenre>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: GenreRepository,
    Garde(Json(payload)): Garde<Json<CreateGenre>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: GenreRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> Router<AppState> {
    use axum::routing;
    Router::new()
        .route("/", routing::get(list).post(create))
        .route("/select", routing::get(select_items))
        .route("/search", routing::get(search))
        .route("/count", routing::get(count))
        .route("/{id}", routing::get(get).put(update).delete(delete))
}
