//! # CMS Mock Server
//!
//! Serves the page store contract over HTTP so the client can be run and
//! tested without the real backend.
//!
//! ```text
//! POST   /api/auth/login
//! GET    /api/cms/pages
//! POST   /api/cms/pages
//! GET    /api/cms/pages/:id
//! PUT    /api/cms/pages/:id
//! DELETE /api/cms/pages/:id
//! ```
//!
//! Every `/api/cms` route requires `Authorization: Bearer <token>`.
//! Errors are JSON bodies of the form `{ "message": ..., "statusCode": ... }`.

mod error;
mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use cms_client::PageStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

pub type AppState = Arc<dyn PageStore>;

pub fn router(store: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(routes::login))
        .route(
            "/api/cms/pages",
            get(routes::list_pages).post(routes::create_page),
        )
        .route(
            "/api/cms/pages/:id",
            get(routes::get_page)
                .put(routes::update_page)
                .delete(routes::delete_page),
        )
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve `store` on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, store: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(store)).await
}
