//! Layered configuration: TOML file, then `SYMTRACK_*` environment variables,
//! then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Where the session (token and user) is persisted.
  #[serde(default)]
  pub session_path: Option<PathBuf>,
  /// Request timeout; `0` disables it.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Log destination. Logging is off when unset, since the terminal is in
  /// use.
  #[serde(default)]
  pub log_file:     Option<PathBuf>,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub base_url:     Option<String>,
  pub session_path: Option<PathBuf>,
  pub timeout_secs: Option<u64>,
  pub log_file:     Option<PathBuf>,
}

impl Settings {
  /// Load settings from `file` (or the default config file, if it exists),
  /// the environment, and `overrides`.
  pub fn load(file: Option<&Path>, overrides: Overrides) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder();
    builder = match file {
      Some(path) => builder.add_source(config::File::from(path).required(true)),
      None => match default_config_path() {
        Some(path) => builder.add_source(config::File::from(path).required(false)),
        None => builder,
      },
    };

    let settings = builder
      .add_source(config::Environment::with_prefix("SYMTRACK").try_parsing(true))
      .set_override_option("base_url", overrides.base_url)?
      .set_override_option("session_path", overrides.session_path.map(path_value))?
      .set_override_option("timeout_secs", overrides.timeout_secs.map(|s| s as i64))?
      .set_override_option("log_file", overrides.log_file.map(path_value))?
      .build()
      .context("failed to read configuration")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.session_path = settings.session_path.map(|p| expand_tilde(&p));
    settings.log_file = settings.log_file.map(|p| expand_tilde(&p));
    Ok(settings)
  }

  /// The configured session path, or `<data dir>/symtrack/session.json`.
  pub fn session_path(&self) -> PathBuf {
    self.session_path.clone().unwrap_or_else(|| {
      dirs::data_dir()
        .map(|d| d.join("symtrack").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("symtrack-session.json"))
    })
  }
}

fn default_config_path() -> Option<PathBuf> {
  dirs::config_dir().map(|d| d.join("symtrack").join("config.toml"))
}

fn path_value(path: PathBuf) -> String { path.to_string_lossy().into_owned() }

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  if let Ok(rest) = path.strip_prefix("~")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
