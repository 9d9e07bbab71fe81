//! Notice endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use noticeboard_common::AppResult;
use noticeboard_core::{CreateNoticeInput, Page, Pagination, UpdateNoticeInput};
use serde::Deserialize;
use tracing::info;

use crate::{
    extractors::{AuthUser, Reader},
    middleware::AppState,
    response::{MessageResponse, NoticeResponse},
};

/// Create notice router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published).post(create_notice))
        .route("/all", get(list_all))
        .route(
            "/{id}",
            get(get_notice).put(update_notice).delete(delete_notice),
        )
}

/// Pagination query.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    fn pagination(&self) -> AppResult<Pagination> {
        Pagination::new(self.page, self.limit)
    }
}

/// List published notices.
async fn list_published(
    _reader: Reader,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<NoticeResponse>>> {
    let page = state
        .notice_service
        .list_published(query.pagination()?)
        .await?;

    Ok(Json(page.map(NoticeResponse::from)))
}

/// List every notice, including scheduled ones (admin).
async fn list_all(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<NoticeResponse>>> {
    user.require_admin()?;

    let page = state.notice_service.list_all(query.pagination()?).await?;

    Ok(Json(page.map(NoticeResponse::from)))
}

/// Get a single notice.
async fn get_notice(
    reader: Reader,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<NoticeResponse>> {
    let notice = state.notice_service.get(&id, reader.is_admin()).await?;
    Ok(Json(notice.into()))
}

/// Create a notice (admin).
async fn create_notice(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateNoticeInput>,
) -> AppResult<(StatusCode, Json<NoticeResponse>)> {
    user.require_admin()?;

    let notice = state.notice_service.create(&user.0.id, req).await?;

    info!(user_id = %user.0.id, notice_id = %notice.id, "Created notice");

    Ok((StatusCode::CREATED, Json(notice.into())))
}

/// Update a notice (admin).
async fn update_notice(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoticeInput>,
) -> AppResult<Json<NoticeResponse>> {
    user.require_admin()?;

    let notice = state.notice_service.update(&id, req).await?;

    info!(user_id = %user.0.id, notice_id = %notice.id, "Updated notice");

    Ok(Json(notice.into()))
}

/// Delete a notice (admin).
async fn delete_notice(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    user.require_admin()?;

    state.notice_service.delete(&id).await?;

    info!(user_id = %user.0.id, notice_id = %id, "Deleted notice");

    Ok(Json(MessageResponse::new("Notice deleted successfully")))
}
