//! `ApiClient` against a fake backend served by axum on an ephemeral port.

use std::sync::{Arc, Mutex};

use axum::{
  Json, Router,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header::AUTHORIZATION},
  routing::{delete, get, post},
};
use critter_client::{ApiClient, ApiConfig, ClientError};
use critter_core::{
  entity::{NewAnimal, NewTask, TaskOwner},
  source::CritterSource,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

// ─── Fake backend ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Backend {
  /// `Authorization` header of every request, in order.
  auth:    Arc<Mutex<Vec<Option<String>>>>,
  /// Bodies received by `POST /animals`.
  created: Arc<Mutex<Vec<Value>>>,
}

impl Backend {
  fn record(&self, headers: &HeaderMap) {
    let value = headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    self.auth.lock().unwrap().push(value);
  }

  fn requests(&self) -> usize { self.auth.lock().unwrap().len() }
}

async fn animals(State(b): State<Backend>, headers: HeaderMap) -> Json<Value> {
  b.record(&headers);
  Json(json!([
    { "id": 1, "name": "Basil", "speciesId": 10, "enclosureId": 0, "dob": null },
    { "id": 2, "name": "Sage", "speciesId": 10, "enclosureId": 20, "dob": "2022-02-02" },
  ]))
}

async fn create_animal(
  State(b): State<Backend>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
  b.record(&headers);
  b.created.lock().unwrap().push(body.clone());
  let mut stored = body;
  stored["id"] = json!(99);
  (StatusCode::CREATED, Json(stored))
}

async fn tasks(State(b): State<Backend>, headers: HeaderMap) -> Json<Value> {
  b.record(&headers);
  Json(json!([
    {
      "id": 40,
      "name": "Feed crickets",
      "complete": false,
      "lastCompleted": "2024-06-01T00:00:00Z",
      "repeatIntervHours": 48.0,
      "animalId": 1,
      "enclosureId": null,
    },
    {
      "id": 41,
      "name": "Stray",
      "lastCompleted": "2024-06-01T00:00:00Z",
      "repeatIntervHours": 24.0,
    },
  ]))
}

async fn complete(
  State(b): State<Backend>,
  headers: HeaderMap,
  Path(id): Path<i64>,
) -> Json<Value> {
  b.record(&headers);
  Json(json!({
    "id": id,
    "name": "Feed crickets",
    "complete": true,
    "lastCompleted": "2024-06-02T09:30:00Z",
    "repeatIntervHours": 48.0,
    "animalId": 1,
  }))
}

async fn missing(State(b): State<Backend>, headers: HeaderMap) -> StatusCode {
  b.record(&headers);
  StatusCode::NOT_FOUND
}

async fn spawn(backend: Backend) -> String {
  let app = Router::new()
    .route("/animals", get(animals).post(create_animal))
    .route("/tasks", get(tasks))
    .route("/tasks/{id}/complete", post(complete))
    .route("/tasks/{id}", delete(missing))
    .with_state(backend);

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let address = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  format!("http://{address}/")
}

async fn client(backend: &Backend, token: Option<&str>) -> ApiClient {
  let base_url = spawn(backend.clone()).await;
  ApiClient::new(ApiConfig {
    base_url,
    token: token.map(str::to_owned),
  })
  .unwrap()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lists_animals_with_bearer_token() {
  let backend = Backend::default();
  let api = client(&backend, Some("s3cret")).await;

  let animals = api.list_animals().await.unwrap();

  assert_eq!(animals.len(), 2);
  assert_eq!(animals[0].enclosure_id, None);
  assert_eq!(animals[1].enclosure_id, Some(20));
  assert_eq!(backend.auth.lock().unwrap().as_slice(), [Some(
    "Bearer s3cret".to_owned()
  )]);
}

#[tokio::test]
async fn no_token_sends_no_credentials() {
  let backend = Backend::default();
  let api = client(&backend, None).await;

  api.list_tasks().await.unwrap();

  assert_eq!(backend.auth.lock().unwrap().as_slice(), [None]);
}

#[tokio::test]
async fn tasks_resolve_owners() {
  let backend = Backend::default();
  let api = client(&backend, None).await;

  let tasks = api.list_tasks().await.unwrap();

  assert_eq!(tasks[0].owner, Some(TaskOwner::Animal(1)));
  assert_eq!(tasks[1].owner, None);
}

#[tokio::test]
async fn complete_task_posts_to_task_path() {
  let backend = Backend::default();
  let api = client(&backend, Some("t")).await;

  let task = api.complete_task(40).await.unwrap();

  assert_eq!(task.id, 40);
  assert!(task.complete);
  assert_eq!(task.last_completed.to_rfc3339(), "2024-06-02T09:30:00+00:00");
}

#[tokio::test]
async fn create_animal_sends_camel_case_body() {
  let backend = Backend::default();
  let api = client(&backend, None).await;

  let created = api
    .create_animal(NewAnimal {
      enclosure_id: Some(20),
      ..NewAnimal::new("Thyme", 10)
    })
    .await
    .unwrap();

  assert_eq!(created.id, 99);
  assert_eq!(created.enclosure_id, Some(20));
  let body = backend.created.lock().unwrap()[0].clone();
  assert_eq!(body["speciesId"], json!(10));
  assert_eq!(body["enclosureId"], json!(20));
}

#[tokio::test]
async fn error_status_is_reported() {
  let backend = Backend::default();
  let api = client(&backend, None).await;

  let err = api.delete_task(7).await.unwrap_err();

  assert!(matches!(
    err,
    ClientError::Status { method: "DELETE", ref path, status: 404 } if path == "/tasks/7"
  ));
}

#[tokio::test]
async fn invalid_task_never_leaves_the_client() {
  let backend = Backend::default();
  let api = client(&backend, None).await;

  let err = api
    .create_task(NewTask::new("Feed", f64::INFINITY, TaskOwner::Animal(1)))
    .await
    .unwrap_err();

  assert!(matches!(err, ClientError::Invalid(_)));
  assert_eq!(backend.requests(), 0);
}
