//! REST API for the personal dashboard.
//!
//! ## Endpoints
//!
//! All routes live under `/api`:
//!
//! - `GET /health`
//! - `/notes`, `/tasks`, `/links`: list, create, get, update, delete
//! - `PATCH /tasks/{id}/toggle`, `PUT /links/reorder`
//! - `POST /pomodoro/session`, `GET /pomodoro/stats`
//!
//! Responses use the `{data, success}` envelope; failures use
//! `{error, success: false}`.

pub mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use dashboard_core::Database;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::ApiError;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    client_origin: Arc<str>,
    started: Instant,
}

impl AppState {
    pub fn new(db: Database, client_origin: impl Into<String>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            client_origin: Arc::from(client_origin.into()),
            started: Instant::now(),
        }
    }

    pub(crate) fn db(&self) -> Result<MutexGuard<'_, Database>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(routes::notes::routes())
        .merge(routes::tasks::routes())
        .merge(routes::links::routes())
        .merge(routes::pomodoro::routes());

    Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// `GET /api/health`
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

async fn route_not_found(method: Method, uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("Route {method} {} not found", uri.path()))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Allow the configured browser origin, with credentials.
async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin_allowed = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|o| o.to_str().ok())
        .is_some_and(|o| o == &*state.client_origin);

    let mut response = if request.method() == Method::OPTIONS {
        debug!("cors preflight");
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if origin_allowed {
        if let Ok(origin) = HeaderValue::from_str(&state.client_origin) {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type"),
            );
        }
    }
    response
}

/// Dashboard API server running in a background task.
pub struct ApiServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Bind to `addr` (port `0` picks a free port) and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(addr: &str, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("dashboard API listening on http://{addr}/api");

        let app = router(state);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("dashboard API error: {e}");
            }
        });
        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:3010/api`.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
