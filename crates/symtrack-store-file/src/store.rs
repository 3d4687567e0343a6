//! [`FileStore`]: a [`KeyValueStore`] persisted as one JSON object.

use std::{
  collections::BTreeMap,
  fs,
  io,
  path::{Path, PathBuf},
};

use symtrack_core::storage::KeyValueStore;

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A key-value store backed by a single JSON file.
///
/// The whole map is held in memory; every write rewrites the file through a
/// temporary sibling and a rename, so a crash mid-write leaves the previous
/// contents intact.
#[derive(Debug)]
pub struct FileStore {
  path:    PathBuf,
  entries: BTreeMap<String, String>,
}

impl FileStore {
  /// Open the store at `path`. A missing or empty file is an empty store; the
  /// file is not created until the first write.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let entries = match fs::read_to_string(&path) {
      Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
      Ok(raw) => decode(&path, &raw)?,
      Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
      Err(source) => return Err(Error::Io { path, source }),
    };
    tracing::debug!(path = %path.display(), keys = entries.len(), "opened session file");
    Ok(Self { path, entries })
  }

  /// Like [`open`](Self::open), but a file that is not a JSON object of
  /// strings is ignored with a warning and replaced on the next write. I/O
  /// errors are still returned.
  pub fn open_or_reset(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    match Self::open(path) {
      Err(e @ (Error::Json(_) | Error::InvalidFormat(_))) => {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
        Ok(Self {
          path:    path.to_path_buf(),
          entries: BTreeMap::new(),
        })
      }
      other => other,
    }
  }

  pub fn path(&self) -> &Path { &self.path }

  fn flush(&self) -> Result<()> {
    let io_err = |source| Error::Io {
      path: self.path.clone(),
      source,
    };

    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(io_err)?;
    }

    let raw = serde_json::to_string_pretty(&self.entries)?;
    let tmp = tmp_path(&self.path);
    fs::write(&tmp, raw).map_err(io_err)?;
    restrict_permissions(&tmp).map_err(io_err)?;
    fs::rename(&tmp, &self.path).map_err(io_err)?;
    Ok(())
  }

  /// Undo an in-memory change whose flush failed, so reads match the file.
  fn restore(&mut self, key: &str, previous: Option<String>) {
    match previous {
      Some(value) => self.entries.insert(key.to_owned(), value),
      None => self.entries.remove(key),
    };
  }
}

impl KeyValueStore for FileStore {
  type Error = Error;

  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    let previous = self.entries.insert(key.to_owned(), value.to_owned());
    self.flush().inspect_err(|_| self.restore(key, previous))
  }

  fn remove(&mut self, key: &str) -> Result<()> {
    let Some(previous) = self.entries.remove(key) else {
      return Ok(());
    };
    self.flush().inspect_err(|_| self.restore(key, Some(previous)))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn decode(path: &Path, raw: &str) -> Result<BTreeMap<String, String>> {
  let value: serde_json::Value = serde_json::from_str(raw)?;
  let serde_json::Value::Object(map) = value else {
    return Err(Error::InvalidFormat(path.to_path_buf()));
  };
  map
    .into_iter()
    .map(|(k, v)| match v {
      serde_json::Value::String(s) => Ok((k, s)),
      _ => Err(Error::InvalidFormat(path.to_path_buf())),
    })
    .collect()
}

fn tmp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().unwrap_or_default().to_os_string();
  name.push(".tmp");
  path.with_file_name(name)
}

/// The file holds a bearer token; keep it owner-only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> { Ok(()) }
