use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    error::{parse_id, StoreError, StoreResult},
    storage::{Page, API_PAGE_SIZE},
};

use super::{
    models::{ApiResponse, FilterQuery, HealthResponse, PageQuery, Pagination},
    AppState,
};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn list_contents(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let page = Page::parse(query.page.as_deref(), None, API_PAGE_SIZE);
    let api = state.api.clone();
    let result = blocking(move || api.find_content_by_collection_alias(&alias, page)).await;
    match result {
        Ok((items, total)) => paginated(items, page, total),
        Err(err) => error_response(err),
    }
}

pub async fn list_content_by_field_value(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let page = Page::parse(query.page.as_deref(), None, API_PAGE_SIZE);
    let field = query.field.unwrap_or_default();
    let value = query.value.unwrap_or_default();
    let api = state.api.clone();
    let result = blocking(move || {
        api.find_content_by_collection_and_field_value(&alias, &field, &value, page)
    })
    .await;
    match result {
        Ok((items, total)) => paginated(items, page, total),
        Err(err) => error_response(err),
    }
}

pub async fn find_content_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let api = state.api.clone();
    let result = blocking(move || api.find_content_by_id(parse_id(&id)?)).await;
    match result {
        Ok(item) => Json(ApiResponse::ok(item)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failed(
            "not_found",
            "no such route".to_string(),
        )),
    )
        .into_response()
}

/// Runs a synchronous store call off the async workers.
async fn blocking<T, F>(f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(err) => Err(StoreError::Io(std::io::Error::other(err))),
    }
}

fn paginated<T: Serialize>(items: T, page: Page, total: u64) -> Response {
    Json(ApiResponse::paginated(
        items,
        Pagination {
            page: page.page,
            per_page: page.page_size,
            total,
            total_pages: page.total_pages(total),
        },
    ))
    .into_response()
}

fn error_response(err: StoreError) -> Response {
    let (status, code) = match &err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        StoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        StoreError::Conversion { .. } => (StatusCode::BAD_REQUEST, "conversion"),
        StoreError::Mismatch { .. } => (StatusCode::CONFLICT, "mismatch"),
        StoreError::Persistence(_) | StoreError::Io(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("API request failed: {:?}", err);
        "internal error".to_string()
    } else {
        log::warn!("API request rejected: {}", err);
        err.to_string()
    };

    (status, Json(ApiResponse::<()>::failed(code, message))).into_response()
}
