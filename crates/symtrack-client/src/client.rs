//! Async HTTP client wrapping the symptom tracker JSON API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use symtrack_core::{
  session::Session,
  symptom::{Pattern, PatternReport, Symptom, SymptomInput},
  user::{AuthResponse, LoginRequest, RegisterRequest},
};

use crate::ClientError;

type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Per-request timeout. `None` waits indefinitely.
  pub timeout:  Option<Duration>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:5000".to_string(),
      timeout:  Some(Duration::from_secs(30)),
    }
  }
}

/// Async HTTP client for the symptom tracker REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(ClientError::Build)?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /auth/register`
  pub async fn register(&self, body: &RegisterRequest) -> Result<AuthResponse> {
    let endpoint = "POST /auth/register";
    let req = self.client.post(self.url("/auth/register")).json(body);
    let resp = self.execute(endpoint, req, false).await?;
    decode(endpoint, resp).await
  }

  /// `POST /auth/login`
  pub async fn login(&self, body: &LoginRequest) -> Result<AuthResponse> {
    let endpoint = "POST /auth/login";
    let req = self.client.post(self.url("/auth/login")).json(body);
    let resp = self.execute(endpoint, req, false).await?;
    decode(endpoint, resp).await
  }

  // ── Symptoms ──────────────────────────────────────────────────────────────

  /// `GET /users/{id}/symptoms`
  pub async fn list_symptoms(&self, session: &Session) -> Result<Vec<Symptom>> {
    let path = format!("/users/{}/symptoms", session.user_id());
    let endpoint = format!("GET {path}");
    let req = self
      .client
      .get(self.url(&path))
      .bearer_auth(&session.token);
    let resp = self.execute(&endpoint, req, true).await?;
    decode(&endpoint, resp).await
  }

  /// `POST /users/{id}/symptoms`
  pub async fn create_symptom(
    &self,
    session: &Session,
    input: &SymptomInput,
  ) -> Result<Symptom> {
    let path = format!("/users/{}/symptoms", session.user_id());
    let endpoint = format!("POST {path}");
    let req = self
      .client
      .post(self.url(&path))
      .bearer_auth(&session.token)
      .json(input);
    let resp = self.execute(&endpoint, req, true).await?;
    decode(&endpoint, resp).await
  }

  /// `PUT /users/{id}/symptoms/{symptom_id}`
  pub async fn update_symptom(
    &self,
    session: &Session,
    symptom_id: i64,
    input: &SymptomInput,
  ) -> Result<Symptom> {
    let path = format!("/users/{}/symptoms/{symptom_id}", session.user_id());
    let endpoint = format!("PUT {path}");
    let req = self
      .client
      .put(self.url(&path))
      .bearer_auth(&session.token)
      .json(input);
    let resp = self.execute(&endpoint, req, true).await?;
    decode(&endpoint, resp).await
  }

  /// `DELETE /users/{id}/symptoms/{symptom_id}`
  pub async fn delete_symptom(&self, session: &Session, symptom_id: i64) -> Result<()> {
    let path = format!("/users/{}/symptoms/{symptom_id}", session.user_id());
    let endpoint = format!("DELETE {path}");
    let req = self
      .client
      .delete(self.url(&path))
      .bearer_auth(&session.token);
    self.execute(&endpoint, req, true).await?;
    Ok(())
  }

  // ── Patterns ──────────────────────────────────────────────────────────────

  /// `GET /symptoms/patterns`
  pub async fn patterns(&self) -> Result<Vec<Pattern>> {
    let endpoint = "GET /symptoms/patterns";
    let req = self.client.get(self.url("/symptoms/patterns"));
    let resp = self.execute(endpoint, req, false).await?;
    let report: PatternReport = decode(endpoint, resp).await?;
    Ok(report.most_common_patterns)
  }

  // ── Plumbing ──────────────────────────────────────────────────────────────

  /// Send `req` and map any non-success status to a [`ClientError`].
  ///
  /// `bearer` marks requests that carried a token; for those, 401 and 403
  /// mean the session is no longer valid.
  async fn execute(
    &self,
    endpoint: &str,
    req: RequestBuilder,
    bearer: bool,
  ) -> Result<Response> {
    tracing::debug!(endpoint, "sending request");
    let resp = req.send().await.map_err(|source| ClientError::Transport {
      endpoint: endpoint.to_string(),
      source,
    })?;

    let status = resp.status();
    tracing::debug!(endpoint, %status, "received response");
    if status.is_success() {
      return Ok(resp);
    }

    if bearer && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
      return Err(ClientError::SessionExpired { status });
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Rejected {
      endpoint: endpoint.to_string(),
      status,
      message: server_message(&body),
    })
  }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T> {
  let bytes = resp.bytes().await.map_err(|source| ClientError::Transport {
    endpoint: endpoint.to_string(),
    source,
  })?;
  serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
    endpoint: endpoint.to_string(),
    source,
  })
}

/// Error bodies seen in the wild: `{"message": ..}` from the app itself,
/// `{"msg": ..}` from Flask-JWT-Extended, `{"error": ..}` from generic
/// handlers.
#[derive(Deserialize)]
struct ErrorBody {
  message: Option<String>,
  msg:     Option<String>,
  error:   Option<String>,
}

fn server_message(body: &str) -> Option<String> {
  let body: ErrorBody = serde_json::from_str(body).ok()?;
  body
    .message
    .or(body.msg)
    .or(body.error)
    .filter(|m| !m.trim().is_empty())
}
