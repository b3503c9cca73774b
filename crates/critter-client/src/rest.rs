//! Async HTTP client wrapping the critter JSON API.

use std::time::Duration;

use critter_core::{
  entity::{
    Animal, Enclosure, Habitat, Id, NewAnimal, NewEnclosure, NewTask, Species,
    Task, TaskPatch,
  },
  source::CritterSource,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientError, Result};

/// Connection settings for the critter API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token for the current session; `None` sends no credentials.
  pub token:    Option<String>,
}

/// Async HTTP client for the critter JSON REST API.
///
/// Clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) if !token.is_empty() => req.bearer_auth(token),
      _ => req,
    }
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.auth(self.client.request(method, self.url(path)))
  }

  fn check(method: &Method, path: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    tracing::warn!(%method, path, %status, "request rejected");
    Err(ClientError::Status {
      method: method_name(method),
      path:   path.to_owned(),
      status: status.as_u16(),
    })
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    tracing::debug!(path, "GET");
    let resp = self.request(Method::GET, path).send().await?;
    let resp = Self::check(&Method::GET, path, resp)?;
    Ok(resp.json().await?)
  }

  async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    tracing::debug!(%method, path, "sending");
    let resp = self.request(method.clone(), path).json(body).send().await?;
    let resp = Self::check(&method, path, resp)?;
    Ok(resp.json().await?)
  }

  async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    tracing::debug!(path, "POST");
    let resp = self.request(Method::POST, path).send().await?;
    let resp = Self::check(&Method::POST, path, resp)?;
    Ok(resp.json().await?)
  }

  async fn delete(&self, path: &str) -> Result<()> {
    tracing::debug!(path, "DELETE");
    let resp = self.request(Method::DELETE, path).send().await?;
    Self::check(&Method::DELETE, path, resp)?;
    Ok(())
  }
}

fn method_name(method: &Method) -> &'static str {
  match *method {
    Method::GET => "GET",
    Method::POST => "POST",
    Method::PUT => "PUT",
    Method::DELETE => "DELETE",
    Method::PATCH => "PATCH",
    _ => "HTTP",
  }
}

// ─── CritterSource ────────────────────────────────────────────────────────────

impl CritterSource for ApiClient {
  type Error = ClientError;

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// `GET /animals`
  async fn list_animals(&self) -> Result<Vec<Animal>> {
    self.get_json("/animals").await
  }

  /// `GET /enclosures`
  async fn list_enclosures(&self) -> Result<Vec<Enclosure>> {
    self.get_json("/enclosures").await
  }

  /// `GET /habitats`
  async fn list_habitats(&self) -> Result<Vec<Habitat>> {
    self.get_json("/habitats").await
  }

  /// `GET /species`
  async fn list_species(&self) -> Result<Vec<Species>> {
    self.get_json("/species").await
  }

  /// `GET /tasks`
  async fn list_tasks(&self) -> Result<Vec<Task>> {
    self.get_json("/tasks").await
  }

  // ── Animals ───────────────────────────────────────────────────────────────

  /// `POST /animals`
  async fn create_animal(&self, input: NewAnimal) -> Result<Animal> {
    input.validate()?;
    self.send_json(Method::POST, "/animals", &input).await
  }

  /// `PUT /animals/{id}`
  async fn update_animal(&self, id: Id, input: NewAnimal) -> Result<Animal> {
    input.validate()?;
    self
      .send_json(Method::PUT, &format!("/animals/{id}"), &input)
      .await
  }

  /// `DELETE /animals/{id}`
  async fn delete_animal(&self, id: Id) -> Result<()> {
    self.delete(&format!("/animals/{id}")).await
  }

  // ── Enclosures ────────────────────────────────────────────────────────────

  /// `POST /enclosures`
  async fn create_enclosure(&self, input: NewEnclosure) -> Result<Enclosure> {
    input.validate()?;
    self.send_json(Method::POST, "/enclosures", &input).await
  }

  /// `PUT /enclosures/{id}`
  async fn update_enclosure(
    &self,
    id: Id,
    input: NewEnclosure,
  ) -> Result<Enclosure> {
    input.validate()?;
    self
      .send_json(Method::PUT, &format!("/enclosures/{id}"), &input)
      .await
  }

  /// `DELETE /enclosures/{id}`
  async fn delete_enclosure(&self, id: Id) -> Result<()> {
    self.delete(&format!("/enclosures/{id}")).await
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  /// `POST /tasks`
  async fn create_task(&self, input: NewTask) -> Result<Task> {
    input.validate()?;
    self.send_json(Method::POST, "/tasks", &input).await
  }

  /// `PATCH /tasks/{id}`
  async fn update_task(&self, id: Id, patch: TaskPatch) -> Result<Task> {
    patch.validate()?;
    self
      .send_json(Method::PATCH, &format!("/tasks/{id}"), &patch)
      .await
  }

  /// `DELETE /tasks/{id}`
  async fn delete_task(&self, id: Id) -> Result<()> {
    self.delete(&format!("/tasks/{id}")).await
  }

  /// `POST /tasks/{id}/complete`
  async fn complete_task(&self, id: Id) -> Result<Task> {
    self.post_empty(&format!("/tasks/{id}/complete")).await
  }
}
