//! Symptoms and the server-computed co-occurrence patterns.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ─── Symptom ─────────────────────────────────────────────────────────────────

/// A user-recorded health observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
  pub id:          i64,
  pub label:       String,
  pub description: String,
  /// When the server recorded the symptom. `None` if the server omitted it or
  /// sent a format we do not recognise.
  #[serde(default, deserialize_with = "deserialize_timestamp")]
  pub timestamp:   Option<DateTime<Utc>>,
}

/// Body of the create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomInput {
  pub label:       String,
  pub description: String,
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Naive layouts tried after RFC 3339 and RFC 2822. Interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a server timestamp in any of the layouts Python backends commonly
/// emit: RFC 3339, `datetime.isoformat()` without an offset, or the HTTP-date
/// form produced by Flask's default JSON encoder.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NAIVE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(
  deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  Ok(raw.as_deref().and_then(|s| {
    let parsed = parse_timestamp(s);
    if parsed.is_none() {
      tracing::warn!(timestamp = s, "unrecognised symptom timestamp");
    }
    parsed
  }))
}

// ─── Patterns ────────────────────────────────────────────────────────────────

/// A group of symptom labels that frequently occur together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
  pub symptoms: Vec<String>,
  pub count:    u64,
}

impl Pattern {
  /// `"Headache + Nausea"`.
  pub fn joined(&self) -> String { self.symptoms.join(" + ") }
}

/// Body of `GET /symptoms/patterns`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternReport {
  #[serde(default)]
  pub most_common_patterns: Vec<Pattern>,
}
