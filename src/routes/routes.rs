//! Defines every route the service answers.
//!
//! ## Structure
//! - **Pages**
//!   - `GET  /`               — 302 to `/cadastro.html`
//!   - `GET  /cadastro.html`  — registration page
//!   - `GET  /login.html`     — login page
//!   - anything else under the static directory as a fallback
//!
//! - **API**
//!   - `POST /register`       — create an account
//!   - `POST /login`          — check credentials
//!   - `POST /publication`    — multipart upload + publication row
//!   - `GET  /publications`   — all publications, newest first
//!
//! - **Health**: `GET /healthz`, `GET /readyz`

use crate::{
    handlers::{
        account_handlers::{login, register},
        health_handlers::{healthz, readyz},
        publication_handlers::{create_publication, list_publications},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use std::path::Path;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub const REGISTRATION_PAGE: &str = "cadastro.html";
pub const LOGIN_PAGE: &str = "login.html";

/// Build the router. Static pages are read from `static_dir`; upload bodies on
/// `/publication` are capped at `max_upload_bytes`.
pub fn routes(static_dir: &Path, max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(redirect_to_registration))
        .route_service(
            "/cadastro.html",
            ServeFile::new(static_dir.join(REGISTRATION_PAGE)),
        )
        .route_service("/login.html", ServeFile::new(static_dir.join(LOGIN_PAGE)))
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/publication",
            post(create_publication).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/publications", get(list_publications))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

async fn redirect_to_registration() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("/{}", REGISTRATION_PAGE))],
    )
}
