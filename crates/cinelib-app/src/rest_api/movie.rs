use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_valid::Garde;
use cinelib_dal::PageRequest;
use cinelib_dal::movie::{CreateMovie, MovieRepository};
use garde::Validate;
use http::StatusCode;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::rest_api::Paging;
use crate::state::AppState;

crate::repository_from_request!(MovieRepository);

pub async fn list(
    State(state): State<AppState>,
    Garde(Query(paging)): Garde<Query<Paging>>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let page = repository
        .list(paging.into_page_request(state.config().default_page_size))
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

#[derive(Debug, Clone, Validate, Deserialize)]
#[garde(allow_unvalidated)]
pub struct SearchQuery {
    title: Option<String>,
    #[garde(range(min = 1))]
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    page_size: Option<u32>,
}

/// An empty or missing title matches every movie.
pub async fn search(
    State(state): State<AppState>,
    Garde(Query(query)): Garde<Query<SearchQuery>>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let request = PageRequest::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(state.config().default_page_size),
    );
    let page = repository
        .search(query.title.as_deref().unwrap_or_default(), request)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

pub async fn count(repository: MovieRepository) -> ApiResult<impl IntoResponse> {
    let count = repository.count().await?;
    Ok((StatusCode::OK, Json(count)))
}

pub async fn get(Path(id): Path<i64>, repository: MovieRepository) -> ApiResult<Response> {
    match repository.get(id).await? {
        Some(record) => Ok((StatusCode::OK, Json(record)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn create(
    repository: MovieRepository,
    Garde(Json(payload)): Garde<Json<CreateMovie>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: MovieRepository,
    Garde(Json(payload)): Garde<Json<CreateMovie>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> Router<AppState> {
    use axum::routing;
    Router::new()
        .route("/", routing::get(list).post(create))
        .route("/search", routing::get(search))
        .route("/count", routing::get(count))
        .route("/{id}", routing::get(get).put(update).delete(delete))
}
