//! Integration tests for the REST API.
//!
//! Each test starts a server on an ephemeral port over an in-memory
//! database and talks to it over HTTP.

use std::time::Duration;

use dashboard_core::{
    Database, MemorySnapshotStore, Note, NoteDraft, QuickLink, RecordId, RemoteClient,
    ResourceStore, StorageMode, Task, TaskDraft, TaskPatch,
};
use dashboard_server::{ApiServer, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

async fn start() -> ApiServer {
    let state = AppState::new(Database::open_memory().unwrap(), "http://localhost:5173");
    ApiServer::start("127.0.0.1:0", state).await.unwrap()
}

async fn send(request: reqwest::RequestBuilder) -> (StatusCode, Value) {
    let response = request.send().await.unwrap();
    let status = response.status();
    let body = response.json::<Value>().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let server = start().await;
    let (status, body) = send(Client::new().get(format!("{}/health", server.base_url()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].is_number());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = start().await;
    let (status, body) = send(Client::new().get(format!("{}/nope", server.base_url()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route GET /api/nope not found");
}

#[tokio::test]
async fn test_note_lifecycle() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    let (status, body) = send(
        client
            .post(format!("{base}/notes"))
            .json(&json!({"title": "Groceries", "content": "eggs"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["created_at"], body["data"]["updated_at"]);

    let (status, body) = send(
        client
            .put(format!("{base}/notes/{id}"))
            .json(&json!({"content": "eggs, milk"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Groceries");
    assert_eq!(body["data"]["content"], "eggs, milk");

    let (status, body) = send(client.delete(format!("{base}/notes/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, body) = send(client.get(format!("{base}/notes/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Note not found");
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    let (status, body) = send(
        client
            .post(format!("{base}/notes"))
            .json(&json!({"content": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");

    let (status, _) = send(
        client
            .post(format!("{base}/tasks"))
            .json(&json!({"title": "x", "priority": "urgent"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        client
            .post(format!("{base}/links"))
            .header("content-type", "application/json")
            .body("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        client
            .post(format!("{base}/pomodoro/session"))
            .json(&json!({"duration": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_oversized_session_duration_is_400() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    for duration in [json!(1e19), json!(9_223_372_036_854_775_807u64)] {
        let (status, body) = send(
            client
                .post(format!("{base}/pomodoro/session"))
                .json(&json!({ "duration": duration })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{duration}");
        assert_eq!(
            body["error"],
            "duration must be a positive whole number of minutes"
        );
    }

    let (_, body) = send(client.get(format!("{base}/pomodoro/stats"))).await;
    assert_eq!(body["data"]["total_sessions"], 0);
}

#[tokio::test]
async fn test_note_content_is_optional() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    let (status, body) = send(
        client
            .post(format!("{base}/notes"))
            .json(&json!({"title": "Only a title"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        client
            .post(format!("{base}/notes"))
            .json(&json!({"title": "Blank body", "content": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "");

    send(
        client
            .put(format!("{base}/notes/{id}"))
            .json(&json!({"content": "draft"})),
    )
    .await;
    let (status, body) = send(
        client
            .put(format!("{base}/notes/{id}"))
            .json(&json!({"content": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "");
    assert_eq!(body["data"]["title"], "Only a title");
}

#[tokio::test]
async fn test_task_due_date_can_be_cleared() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    let (_, body) = send(
        client
            .post(format!("{base}/tasks"))
            .json(&json!({"title": "Renew passport", "due_date": "2026-12-01"})),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        client
            .put(format!("{base}/tasks/{id}"))
            .json(&json!({"title": "Renew passport soon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["due_date"], "2026-12-01");

    let (status, body) = send(
        client
            .put(format!("{base}/tasks/{id}"))
            .json(&json!({"due_date": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["due_date"], Value::Null);

    let (_, body) = send(client.get(format!("{base}/tasks/{id}"))).await;
    assert_eq!(body["data"]["due_date"], Value::Null);
    assert_eq!(body["data"]["title"], "Renew passport soon");
}

#[tokio::test]
async fn test_update_without_fields_is_400_and_missing_is_404() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    send(client.post(format!("{base}/tasks")).json(&json!({"title": "x"}))).await;

    let (status, body) = send(client.put(format!("{base}/tasks/1")).json(&json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields to update");

    let (status, _) = send(
        client
            .put(format!("{base}/tasks/9999"))
            .json(&json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(client.delete(format!("{base}/tasks/abc"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_filter_and_toggle() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    let (_, body) = send(client.post(format!("{base}/tasks")).json(&json!({"title": "a"}))).await;
    assert_eq!(body["data"]["priority"], "medium");
    assert_eq!(body["data"]["completed"], false);
    send(
        client
            .post(format!("{base}/tasks"))
            .json(&json!({"title": "b", "priority": "low"})),
    )
    .await;

    let (_, body) = send(client.patch(format!("{base}/tasks/1/toggle"))).await;
    assert_eq!(body["data"]["completed"], true);

    let (_, active) = send(client.get(format!("{base}/tasks?status=active"))).await;
    let (_, done) = send(client.get(format!("{base}/tasks?status=completed"))).await;
    let (_, all) = send(client.get(format!("{base}/tasks"))).await;
    assert_eq!(active["data"].as_array().unwrap().len(), 1);
    assert_eq!(active["data"][0]["title"], "b");
    assert_eq!(done["data"][0]["title"], "a");
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_links_positions_and_reorder() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    let links = [
        ("A", "https://a.example"),
        ("B", "b.example"),
        ("C", "https://c.example"),
    ];
    for (title, url) in links {
        let (status, _) = send(
            client
                .post(format!("{base}/links"))
                .json(&json!({"title": title, "url": url})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let order = json!({"links": [
        {"id": 3, "position": 0},
        {"id": 1, "position": 1},
        {"id": 2, "position": 2},
    ]});
    let (_, body) = send(client.put(format!("{base}/links/reorder")).json(&order)).await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["C", "A", "B"]);
    assert_eq!(body["data"][2]["url"], "https://b.example");
}

#[tokio::test]
async fn test_pomodoro_stats() {
    let server = start().await;
    let client = Client::new();
    let base = server.base_url();

    for duration in [25, 50] {
        let (status, body) = send(
            client
                .post(format!("{base}/pomodoro/session"))
                .json(&json!({ "duration": duration })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["duration"], duration);
    }

    let (_, body) = send(client.get(format!("{base}/pomodoro/stats"))).await;
    assert_eq!(
        body["data"],
        json!({
            "total_sessions": 2,
            "total_minutes": 75,
            "sessions_today": 2,
            "sessions_this_week": 2,
        })
    );
}

#[tokio::test]
async fn test_cors_headers_for_client_origin() {
    let server = start().await;
    let response = Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/notes", server.base_url()))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );

    let response = Client::new()
        .get(format!("{}/notes", server.base_url()))
        .header("origin", "http://evil.example")
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_resource_store_against_live_server() {
    let server = start().await;
    let remote = RemoteClient::new(server.base_url(), Duration::from_secs(5)).unwrap();

    let mut tasks: ResourceStore<Task, _, _> =
        ResourceStore::new(remote.clone(), MemorySnapshotStore::new());
    tasks.load().await.unwrap();
    assert_eq!(tasks.mode(), StorageMode::Remote);

    let task = tasks.create(TaskDraft::new("Buy milk")).await.unwrap();
    assert!(tasks.toggle(&task.id).await.unwrap().completed);

    let err = tasks
        .update(&RecordId::from("9999"), TaskPatch::completed(true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(tasks.records().len(), 1);

    let mut notes: ResourceStore<Note, _, _> =
        ResourceStore::new(remote.clone(), MemorySnapshotStore::new());
    notes.load().await.unwrap();
    let note = notes
        .create(NoteDraft {
            title: "Plan".into(),
            content: "week".into(),
        })
        .await
        .unwrap();
    let mut reloaded: ResourceStore<Note, _, _> =
        ResourceStore::new(remote.clone(), MemorySnapshotStore::new());
    assert_eq!(reloaded.load().await.unwrap(), [note]);

    let mut links: ResourceStore<QuickLink, _, _> =
        ResourceStore::new(remote, MemorySnapshotStore::new());
    assert!(links.load().await.unwrap().is_empty());
    let link = links
        .create(dashboard_core::LinkDraft {
            title: "Docs".into(),
            url: "docs.rs".into(),
            icon: None,
        })
        .await
        .unwrap();
    assert_eq!(link.position, 0);
    assert_eq!(link.url, "https://docs.rs");
}
