//! Remote resource API.
//!
//! [`RemoteApi`] is the seam the resource store talks through; the
//! [`RemoteClient`] implementation speaks the dashboard REST API over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::model::{LinkPosition, QuickLink, RecordId, Resource, Task};
use crate::api::{ApiFailure, ApiSuccess};
use crate::error::RemoteError;
use crate::storage::{PomodoroSession, PomodoroStats};

/// CRUD calls for one resource kind.
#[async_trait]
pub trait RemoteApi<R: Resource>: Send + Sync {
    async fn list_all(&self) -> Result<Vec<R>, RemoteError>;
    async fn create(&self, draft: &R::Draft) -> Result<R, RemoteError>;
    async fn update(&self, id: &RecordId, patch: &R::Patch) -> Result<R, RemoteError>;
    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait TaskRemote: RemoteApi<Task> {
    async fn toggle(&self, id: &RecordId) -> Result<Task, RemoteError>;
}

#[async_trait]
pub trait LinkRemote: RemoteApi<QuickLink> {
    async fn reorder(&self, positions: &[LinkPosition]) -> Result<Vec<QuickLink>, RemoteError>;
}

/// HTTP client for the dashboard REST API.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    /// `base_url` is the API root, e.g. `http://localhost:3010/api`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and unwrap the `{data, success}` envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = %status, url = %response.url(), "remote response");
        let body = response.text().await?;

        if status.is_success() {
            let envelope: ApiSuccess<T> = serde_json::from_str(&body)
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;
            if !envelope.success {
                return Err(RemoteError::Malformed("success flag not set".into()));
            }
            return Ok(envelope.data);
        }

        let message = serde_json::from_str::<ApiFailure>(&body)
            .map(|failure| failure.error)
            .unwrap_or(body);
        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::BAD_REQUEST => RemoteError::Validation(message),
            other => RemoteError::Status {
                status: other.as_u16(),
                message,
            },
        })
    }

    /// Log a completed work session.
    pub async fn log_session(&self, duration_min: u64) -> Result<PomodoroSession, RemoteError> {
        let request = self
            .client
            .post(self.url("pomodoro/session"))
            .json(&json!({ "duration": duration_min }));
        self.send(request).await
    }

    pub async fn stats(&self) -> Result<PomodoroStats, RemoteError> {
        self.send(self.client.get(self.url("pomodoro/stats"))).await
    }
}

#[async_trait]
impl<R: Resource> RemoteApi<R> for RemoteClient {
    async fn list_all(&self) -> Result<Vec<R>, RemoteError> {
        self.send(self.client.get(self.url(R::KIND.path()))).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, RemoteError> {
        let request = self.client.post(self.url(R::KIND.path())).json(draft);
        self.send(request).await
    }

    async fn update(&self, id: &RecordId, patch: &R::Patch) -> Result<R, RemoteError> {
        let path = format!("{}/{id}", R::KIND.path());
        self.send(self.client.put(self.url(&path)).json(patch)).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        let path = format!("{}/{id}", R::KIND.path());
        let _: serde_json::Value = self.send(self.client.delete(self.url(&path))).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRemote for RemoteClient {
    async fn toggle(&self, id: &RecordId) -> Result<Task, RemoteError> {
        let path = format!("tasks/{id}/toggle");
        self.send(self.client.patch(self.url(&path))).await
    }
}

#[async_trait]
impl LinkRemote for RemoteClient {
    async fn reorder(&self, positions: &[LinkPosition]) -> Result<Vec<QuickLink>, RemoteError> {
        let request = self
            .client
            .put(self.url("links/reorder"))
            .json(&json!({ "links": positions }));
        self.send(request).await
    }
}
