use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use cms_client::Session;
use cms_model::{
    AccessToken, Credentials, DeleteConfirmation, NewPage, Page, PagePayload, PageSummary,
};
use tracing::debug;

use crate::{ApiError, AppState};

/// Session carried by the request's bearer token (anonymous if absent)
fn session(headers: &HeaderMap) -> Session {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| Session::from_token(token.trim()))
        .unwrap_or_default()
}

pub async fn login(
    State(store): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Json(credentials) = body?;
    Ok(Json(store.authenticate(&credentials).await?))
}

pub async fn list_pages(
    State(store): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PageSummary>>, ApiError> {
    let pages = store.list_pages(&session(&headers)).await?;
    debug!(count = pages.len(), "listing pages");
    Ok(Json(pages))
}

pub async fn get_page(
    State(store): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Page>, ApiError> {
    Ok(Json(store.get_page(&session(&headers), &id).await?))
}

pub async fn create_page(
    State(store): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewPage>, JsonRejection>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    let Json(new_page) = body?;
    let page = store.create_page(&session(&headers), &new_page).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update_page(
    State(store): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<PagePayload>, JsonRejection>,
) -> Result<Json<Page>, ApiError> {
    let Json(payload) = body?;
    Ok(Json(
        store.update_page(&session(&headers), &id, &payload).await?,
    ))
}

pub async fn delete_page(
    State(store): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    Ok(Json(store.delete_page(&session(&headers), &id).await?))
}
