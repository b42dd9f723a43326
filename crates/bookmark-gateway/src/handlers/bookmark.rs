use crate::error::Result;
use crate::model::{DataResponse, DELETE_SUCCESS, UPDATE_SUCCESS};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookmark_core::{
    CreateBookmarkRequest, CreatedBookmark, ListPage, ListParams, PatchBookmarkRequest, Preview,
};

pub async fn list_bookmarks_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListPage>> {
    let Query(params) = query?;
    let page = state.bookmarks().list(params).await?;
    Ok(Json(page))
}

pub async fn create_bookmark_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateBookmarkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<CreatedBookmark>>)> {
    let Json(request) = body?;
    let created = state.bookmarks().create(request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn patch_bookmark_handler(
    path: std::result::Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    body: std::result::Result<Json<PatchBookmarkRequest>, JsonRejection>,
) -> Result<Json<&'static str>> {
    let Path(id) = path?;
    let Json(request) = body?;
    state.bookmarks().patch(&id, request).await?;
    Ok(Json(UPDATE_SUCCESS))
}

pub async fn delete_bookmark_handler(
    path: std::result::Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<&'static str>> {
    let Path(id) = path?;
    state.bookmarks().delete(&id).await?;
    Ok(Json(DELETE_SUCCESS))
}

pub async fn preview_bookmark_handler(
    path: std::result::Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Preview>>> {
    let Path(id) = path?;
    let preview = state.bookmarks().preview(&id).await?;
    Ok(Json(DataResponse::new(preview)))
}
