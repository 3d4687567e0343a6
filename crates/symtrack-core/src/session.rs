//! The authenticated session and its persistence.

use std::fmt;

use crate::{Error, Result, storage::KeyValueStore, user::User};

/// Storage key holding the opaque bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-serialised [`User`].
pub const USER_KEY: &str = "user";

// ─── Session ─────────────────────────────────────────────────────────────────

/// Credentials for authenticated requests, plus the user they belong to.
///
/// Passed explicitly to every call that needs a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
  pub token: String,
  pub user:  User,
}

impl Session {
  pub fn user_id(&self) -> i64 { self.user.id }
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("token", &"<redacted>")
      .field("user", &self.user)
      .finish()
  }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

/// Reads and writes a [`Session`] under [`TOKEN_KEY`] and [`USER_KEY`].
#[derive(Debug)]
pub struct SessionStorage<S> {
  store: S,
}

impl<S: KeyValueStore> SessionStorage<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// The underlying store.
  pub fn store(&self) -> &S { &self.store }

  /// Load the persisted session.
  ///
  /// Returns `None` unless both keys are present. A `user` value that does
  /// not decode is discarded together with the token.
  pub fn load(&mut self) -> Result<Option<Session>> {
    let token = self.store.get(TOKEN_KEY).map_err(Error::storage)?;
    let user = self.store.get(USER_KEY).map_err(Error::storage)?;
    let (Some(token), Some(user)) = (token, user) else {
      return Ok(None);
    };

    match serde_json::from_str::<User>(&user) {
      Ok(user) => Ok(Some(Session { token, user })),
      Err(e) => {
        tracing::warn!(error = %e, "discarding unreadable stored user");
        self.clear()?;
        Ok(None)
      }
    }
  }

  /// Persist `session`, overwriting whatever was stored.
  pub fn save(&mut self, session: &Session) -> Result<()> {
    let user = serde_json::to_string(&session.user)?;
    self
      .store
      .set(TOKEN_KEY, &session.token)
      .map_err(Error::storage)?;
    self.store.set(USER_KEY, &user).map_err(Error::storage)?;
    Ok(())
  }

  /// Remove both keys.
  pub fn clear(&mut self) -> Result<()> {
    self.store.remove(TOKEN_KEY).map_err(Error::storage)?;
    self.store.remove(USER_KEY).map_err(Error::storage)?;
    Ok(())
  }
}
