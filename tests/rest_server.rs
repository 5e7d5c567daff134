use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use vbr_sensor::adapters::{RestBackupServer, RestSettings};
use vbr_sensor::core::{BackupServer, ExclusionSet};

const TOKEN: &str = "token-123";

struct FakeJob {
    id: String,
    name: String,
    job_type: &'static str,
    disabled: bool,
    automatic: bool,
    status: &'static str,
    last_result: &'static str,
    session_minutes: Option<i64>,
}

fn job(name: &str, last_result: &'static str, session_minutes: Option<i64>) -> FakeJob {
    FakeJob {
        id: format!("id-{}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
        job_type: "Backup",
        disabled: false,
        automatic: true,
        status: "Inactive",
        last_result,
        session_minutes,
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN));
    let version = headers.contains_key("x-api-version");
    bearer && version
}

fn paged(items: Vec<Value>, query: &HashMap<String, String>) -> Json<Value> {
    let skip: usize = query.get("skip").and_then(|s| s.parse().ok()).unwrap_or(0);
    let limit: usize = query.get("limit").and_then(|s| s.parse().ok()).unwrap_or(100);
    let total = items.len();
    let data: Vec<Value> = items.into_iter().skip(skip).take(limit).collect();
    Json(json!({
        "data": data,
        "pagination": { "total": total, "count": data.len(), "skip": skip, "limit": limit }
    }))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("grant_type").map(String::as_str) != Some("password")
        || form.get("password").map(String::as_str) != Some("secret")
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errorCode": "Unauthorized", "message": "Invalid credentials" })),
        )
            .into_response();
    }
    Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
}

async fn jobs(
    State(fleet): State<Arc<Vec<FakeJob>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let items = fleet
        .iter()
        .map(|j| {
            json!({
                "id": j.id,
                "name": j.name,
                "type": j.job_type,
                "isDisabled": j.disabled,
                "schedule": { "runAutomatically": j.automatic }
            })
        })
        .collect();
    paged(items, &query).into_response()
}

async fn states(
    State(fleet): State<Arc<Vec<FakeJob>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let items = fleet
        .iter()
        .map(|j| {
            json!({
                "id": j.id,
                "name": j.name,
                "type": j.job_type,
                "status": j.status,
                "lastResult": j.last_result
            })
        })
        .collect();
    paged(items, &query).into_response()
}

async fn sessions(
    State(fleet): State<Arc<Vec<FakeJob>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let job_id = query.get("jobIdFilter").cloned().unwrap_or_default();
    let data: Vec<Value> = fleet
        .iter()
        .filter(|j| j.id == job_id)
        .filter_map(|j| j.session_minutes)
        .map(|minutes| {
            let start = chrono::DateTime::parse_from_rfc3339("2024-03-01T22:00:00Z").unwrap();
            let end = start + chrono::Duration::minutes(minutes);
            json!({
                "id": "session",
                "creationTime": start.to_rfc3339(),
                "endTime": end.to_rfc3339(),
                "state": "Stopped"
            })
        })
        .collect();
    Json(json!({ "data": data })).into_response()
}

async fn spawn_fake(fleet: Vec<FakeJob>) -> u16 {
    let app = Router::new()
        .route("/api/oauth2/token", post(token))
        .route("/api/v1/jobs", get(jobs))
        .route("/api/v1/jobs/states", get(states))
        .route("/api/v1/sessions", get(sessions))
        .with_state(Arc::new(fleet));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

fn settings(port: u16, password: &str) -> RestSettings {
    RestSettings {
        port,
        tls: false,
        accept_invalid_certs: false,
        username: "prtg".to_string(),
        password: password.to_string(),
        api_version: "1.1-rev2".to_string(),
    }
}

#[tokio::test]
async fn test_aggregates_fleet() {
    let mut copy = job("Offsite copy", "Success", Some(300));
    copy.job_type = "BackupCopy";
    let mut manual = job("Manual", "Success", Some(300));
    manual.automatic = false;
    let mut running = job("Busy", "Failed", Some(300));
    running.status = "Running";

    let fleet = vec![
        job("File server", "Success", Some(30)),
        job("Exchange", "Warning", Some(60)),
        job("SQL", "Failed", Some(0)),
        job("Never run", "None", None),
        job("TEST restore", "Failed", Some(300)),
        running,
        copy,
        manual,
    ];
    let port = spawn_fake(fleet).await;

    let server = RestBackupServer::new(settings(port, "secret")).unwrap();
    let result = server
        .fetch_aggregate("127.0.0.1", &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(result.jobs_total, 5);
    assert_eq!(result.running_count, 1);
    assert_eq!(result.status_counts.success, 1);
    assert_eq!(result.status_counts.warning, 1);
    assert_eq!(result.status_counts.failed, 1);
    assert_eq!(result.status_counts.none, 2);
    assert_eq!(result.average_duration_minutes, 30.0);
}

#[tokio::test]
async fn test_running_job_ignores_previous_result() {
    let mut running = job("Nightly", "Failed", Some(120));
    running.status = "Running";
    let port = spawn_fake(vec![running]).await;

    let server = RestBackupServer::new(settings(port, "secret")).unwrap();
    let result = server
        .fetch_aggregate("127.0.0.1", &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(result.jobs_total, 1);
    assert_eq!(result.running_count, 1);
    assert_eq!(result.status_counts.failed, 0);
    assert_eq!(result.status_counts.none, 1);
    assert_eq!(result.average_duration_minutes, 0.0);
}

#[tokio::test]
async fn test_pages_through_large_listings() {
    let fleet: Vec<FakeJob> = (0..250)
        .map(|i| job(&format!("Job {i}"), "None", None))
        .collect();
    let port = spawn_fake(fleet).await;

    let server = RestBackupServer::new(settings(port, "secret")).unwrap();
    let result = server
        .fetch_aggregate("127.0.0.1", &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(result.jobs_total, 250);
    assert_eq!(result.status_counts.none, 250);
}

#[tokio::test]
async fn test_rejected_login_is_connection_error() {
    let port = spawn_fake(vec![job("File server", "Success", Some(30))]).await;

    let server = RestBackupServer::new(settings(port, "wrong")).unwrap();
    let err = server
        .fetch_aggregate("127.0.0.1", &ExclusionSet::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Request to target server 127.0.0.1 failed");
    let chain = format!("{:#}", err.source);
    assert!(chain.contains("Invalid credentials"), "{chain}");
}

#[tokio::test]
async fn test_unreachable_host_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server = RestBackupServer::new(settings(port, "secret")).unwrap();
    let err = server
        .fetch_aggregate("127.0.0.1", &ExclusionSet::default())
        .await
        .unwrap_err();

    assert_eq!(err.host, "127.0.0.1");
}
