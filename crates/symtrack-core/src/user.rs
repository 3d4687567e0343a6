//! Users and the authentication exchange.
//!
//! The password only ever travels outbound, inside [`LoginRequest`] and
//! [`RegisterRequest`]. [`User`] is what the server hands back and what gets
//! persisted, so it has no password field at all.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

// ─── Gender ──────────────────────────────────────────────────────────────────

/// Self-reported gender, transmitted as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
  #[serde(rename = "M")]
  #[strum(to_string = "M", serialize = "male")]
  Male,
  #[serde(rename = "F")]
  #[strum(to_string = "F", serialize = "female")]
  Female,
  #[serde(rename = "O")]
  #[strum(to_string = "O", serialize = "other")]
  Other,
}

/// Accepts `null`, `""`, a code (`"M"`) or a full word (`"male"`). Anything
/// else the server stored is dropped with a warning.
fn deserialize_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  Ok(match raw.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(code) => match code.parse::<Gender>() {
      Ok(gender) => Some(gender),
      Err(_) => {
        tracing::warn!(code, "unrecognised gender code, ignoring");
        None
      }
    },
  })
}

/// Accepts a non-negative integer or a numeric string; anything else becomes
/// `None` with a warning.
fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
  let age = match &raw {
    None | Some(serde_json::Value::Null) => return Ok(None),
    Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
    Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(None),
    Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
    Some(_) => None,
  };
  if age.is_none() {
    tracing::warn!(raw = ?raw, "unrecognised age, ignoring");
  }
  Ok(age)
}

// ─── User ────────────────────────────────────────────────────────────────────

/// An account as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:       i64,
  pub username: String,
  #[serde(default, deserialize_with = "deserialize_age")]
  pub age:      Option<u32>,
  #[serde(default, deserialize_with = "deserialize_gender")]
  pub gender:   Option<Gender>,
  #[serde(default)]
  pub location: Option<String>,
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
  pub username: String,
  pub password: String,
  pub age:      Option<u32>,
  pub gender:   Option<Gender>,
  pub location: Option<String>,
}

impl fmt::Debug for LoginRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoginRequest")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

impl fmt::Debug for RegisterRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RegisterRequest")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("age", &self.age)
      .field("gender", &self.gender)
      .field("location", &self.location)
      .finish()
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// Successful response of both `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  User,
}
