//! Application state and the operations behind every user action.

use symtrack_core::{
  form::{EditorMode, FormError, LoginForm, RegisterForm, SymptomForm},
  session::{Session, SessionStorage},
  storage::KeyValueStore,
  symptom::{Pattern, Symptom, SymptomInput},
  user::AuthResponse,
};

use crate::{ApiClient, ClientError, TrackerError};

// ─── Banner messages ─────────────────────────────────────────────────────────

pub const LOGIN_FAILED: &str = "Login failed";
pub const LOGIN_RETRY: &str = "Login failed. Please try again.";
pub const REGISTER_FAILED: &str = "Registration failed";
pub const REGISTER_RETRY: &str = "Registration failed. Please try again.";
pub const FETCH_SYMPTOMS_FAILED: &str = "Failed to fetch symptoms";
pub const ADD_FAILED: &str = "Failed to add symptom. Please try again.";
pub const UPDATE_FAILED: &str = "Failed to update symptom. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete symptom. Please try again.";
pub const FETCH_PATTERNS_FAILED: &str = "Failed to fetch patterns";
pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const NOT_LOGGED_IN: &str = "Please log in first.";

// ─── View ────────────────────────────────────────────────────────────────────

/// Top-level view, derived from whether a session is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Unauthenticated,
  Authenticated,
}

/// Which form the unauthenticated view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
  #[default]
  Login,
  Register,
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

/// Everything a front-end renders, plus the operations that change it.
///
/// Every operation takes `&mut self`, so at most one request is in flight and
/// operations never interleave. Each user-triggered operation clears the
/// banner first; on failure it leaves a message there and returns the error.
pub struct Tracker<S> {
  client:  ApiClient,
  storage: SessionStorage<S>,
  session: Option<Session>,

  pub auth_mode:     AuthMode,
  pub login_form:    LoginForm,
  pub register_form: RegisterForm,
  pub symptom_form:  SymptomForm,

  symptoms: Vec<Symptom>,
  patterns: Vec<Pattern>,
  error:    Option<String>,
}

impl<S: KeyValueStore> Tracker<S> {
  pub fn new(client: ApiClient, store: S) -> Self {
    Self {
      client,
      storage: SessionStorage::new(store),
      session: None,
      auth_mode: AuthMode::default(),
      login_form: LoginForm::default(),
      register_form: RegisterForm::default(),
      symptom_form: SymptomForm::default(),
      symptoms: Vec::new(),
      patterns: Vec::new(),
      error: None,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn view(&self) -> View {
    if self.session.is_some() {
      View::Authenticated
    } else {
      View::Unauthenticated
    }
  }

  pub fn session(&self) -> Option<&Session> { self.session.as_ref() }

  pub fn symptoms(&self) -> &[Symptom] { &self.symptoms }

  pub fn patterns(&self) -> &[Pattern] { &self.patterns }

  /// The error banner, if one is showing.
  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn dismiss_error(&mut self) { self.error = None; }

  pub fn storage(&self) -> &SessionStorage<S> { &self.storage }

  // ── Session / auth ────────────────────────────────────────────────────────

  /// Resume a persisted session, if there is one, and load the dashboard.
  /// Returns whether a session was restored.
  pub async fn restore(&mut self) -> bool {
    match self.storage.load() {
      Ok(Some(session)) => {
        tracing::info!(user = %session.user.username, "restored session");
        self.session = Some(session);
        self.load_dashboard().await;
        true
      }
      Ok(None) => false,
      Err(e) => {
        tracing::warn!(error = %e, "could not read stored session");
        false
      }
    }
  }

  pub fn toggle_auth_mode(&mut self) {
    self.auth_mode = match self.auth_mode {
      AuthMode::Login => AuthMode::Register,
      AuthMode::Register => AuthMode::Login,
    };
    self.error = None;
  }

  /// Submit whichever auth form is showing.
  pub async fn submit_auth(&mut self) -> Result<(), TrackerError> {
    match self.auth_mode {
      AuthMode::Login => self.login().await,
      AuthMode::Register => self.register().await,
    }
  }

  pub async fn login(&mut self) -> Result<(), TrackerError> {
    self.error = None;
    let req = match self.login_form.validate() {
      Ok(req) => req,
      Err(e) => return Err(self.fail_form(e)),
    };

    match self.client.login(&req).await {
      Ok(resp) => {
        self.start_session(resp).await;
        Ok(())
      }
      Err(e) => Err(self.fail_auth(e, LOGIN_FAILED, LOGIN_RETRY)),
    }
  }

  pub async fn register(&mut self) -> Result<(), TrackerError> {
    self.error = None;
    let req = match self.register_form.validate() {
      Ok(req) => req,
      Err(e) => return Err(self.fail_form(e)),
    };

    match self.client.register(&req).await {
      Ok(resp) => {
        self.start_session(resp).await;
        Ok(())
      }
      Err(e) => Err(self.fail_auth(e, REGISTER_FAILED, REGISTER_RETRY)),
    }
  }

  /// Drop the session and everything loaded under it.
  pub fn logout(&mut self) {
    if let Some(session) = &self.session {
      tracing::info!(user = %session.user.username, "logging out");
    }
    self.end_session();
    self.error = None;
  }

  async fn start_session(&mut self, resp: AuthResponse) {
    let session = Session {
      token: resp.token,
      user:  resp.user,
    };
    tracing::info!(user = %session.user.username, id = session.user.id, "logged in");
    if let Err(e) = self.storage.save(&session) {
      tracing::warn!(error = %e, "could not persist session");
    }
    self.session = Some(session);
    self.login_form.clear();
    self.register_form.clear();
    self.symptom_form.reset();
    self.load_dashboard().await;
  }

  fn end_session(&mut self) {
    self.session = None;
    self.symptoms.clear();
    self.patterns.clear();
    self.symptom_form.reset();
    self.auth_mode = AuthMode::Login;
    if let Err(e) = self.storage.clear() {
      tracing::warn!(error = %e, "could not clear stored session");
    }
  }

  // ── Refresh ───────────────────────────────────────────────────────────────

  /// Re-fetch the symptom list.
  pub async fn refresh_symptoms(&mut self) -> Result<(), TrackerError> {
    self.error = None;
    self.fetch_symptoms().await
  }

  /// Re-fetch the pattern list.
  pub async fn refresh_patterns(&mut self) -> Result<(), TrackerError> {
    self.error = None;
    self.fetch_patterns().await
  }

  /// Re-fetch both lists.
  pub async fn refresh(&mut self) -> Result<(), TrackerError> {
    self.error = None;
    self.fetch_symptoms().await?;
    self.fetch_patterns().await
  }

  /// Loads both lists without failing the caller; failures land in the
  /// banner.
  async fn load_dashboard(&mut self) {
    if let Err(e) = self.fetch_symptoms().await {
      tracing::debug!(error = %e, "symptom load failed");
    }
    if self.session.is_some()
      && let Err(e) = self.fetch_patterns().await
    {
      tracing::debug!(error = %e, "pattern load failed");
    }
  }

  async fn fetch_symptoms(&mut self) -> Result<(), TrackerError> {
    let session = self.require_session()?;
    match self.client.list_symptoms(&session).await {
      Ok(symptoms) => {
        self.symptoms = symptoms;
        Ok(())
      }
      Err(e) => Err(self.fail_request(e, FETCH_SYMPTOMS_FAILED)),
    }
  }

  async fn fetch_patterns(&mut self) -> Result<(), TrackerError> {
    match self.client.patterns().await {
      Ok(patterns) => {
        self.patterns = patterns;
        Ok(())
      }
      Err(e) => Err(self.fail_request(e, FETCH_PATTERNS_FAILED)),
    }
  }

  // ── Symptom editor ────────────────────────────────────────────────────────

  /// Submit the symptom form: create or update depending on its mode.
  pub async fn submit_symptom(&mut self) -> Result<(), TrackerError> {
    self.error = None;
    let session = self.require_session()?;
    let input = match self.symptom_form.validate() {
      Ok(input) => input,
      Err(e) => return Err(self.fail_form(e)),
    };

    match &self.symptom_form.mode {
      EditorMode::Creating => self.create(&session, input).await,
      EditorMode::Editing(record) => {
        let id = record.id;
        self.update(&session, id, input).await
      }
    }
  }

  async fn create(&mut self, session: &Session, input: SymptomInput) -> Result<(), TrackerError> {
    match self.client.create_symptom(session, &input).await {
      Ok(created) => {
        tracing::info!(id = created.id, label = %created.label, "symptom added");
        self.symptom_form.reset();
        self.reload_after_mutation().await;
        Ok(())
      }
      Err(e) => Err(self.fail_request(e, ADD_FAILED)),
    }
  }

  async fn update(
    &mut self,
    session: &Session,
    id: i64,
    input: SymptomInput,
  ) -> Result<(), TrackerError> {
    match self.client.update_symptom(session, id, &input).await {
      Ok(updated) => {
        tracing::info!(id, "symptom updated");
        if let Some(slot) = self.symptoms.iter_mut().find(|s| s.id == id) {
          *slot = updated;
        }
        self.symptom_form.reset();
        self.reload_after_mutation().await;
        Ok(())
      }
      Err(e) => Err(self.fail_request(e, UPDATE_FAILED)),
    }
  }

  /// Load symptom `id` into the form for editing.
  pub fn begin_edit(&mut self, id: i64) -> Result<(), TrackerError> {
    self.error = None;
    let symptom = self
      .symptoms
      .iter()
      .find(|s| s.id == id)
      .ok_or(TrackerError::UnknownSymptom(id))?;
    self.symptom_form.begin_edit(symptom);
    Ok(())
  }

  /// Abandon the edit in progress and go back to an empty create form.
  pub fn cancel_edit(&mut self) { self.symptom_form.reset(); }

  /// Delete symptom `id`; on success it is dropped from the local list.
  pub async fn delete_symptom(&mut self, id: i64) -> Result<(), TrackerError> {
    self.error = None;
    let session = self.require_session()?;
    match self.client.delete_symptom(&session, id).await {
      Ok(()) => {
        tracing::info!(id, "symptom deleted");
        self.symptoms.retain(|s| s.id != id);
        if self.symptom_form.editing_id() == Some(id) {
          self.symptom_form.reset();
        }
        if let Err(e) = self.fetch_patterns().await {
          tracing::debug!(error = %e, "pattern reload failed");
        }
        Ok(())
      }
      Err(e) => Err(self.fail_request(e, DELETE_FAILED)),
    }
  }

  async fn reload_after_mutation(&mut self) {
    self.load_dashboard().await;
  }

  // ── Failure handling ──────────────────────────────────────────────────────

  fn require_session(&mut self) -> Result<Session, TrackerError> {
    match &self.session {
      Some(session) => Ok(session.clone()),
      None => {
        self.error = Some(NOT_LOGGED_IN.to_string());
        Err(TrackerError::NotAuthenticated)
      }
    }
  }

  fn fail_form(&mut self, e: FormError) -> TrackerError {
    self.error = Some(capitalise(&e.to_string()));
    e.into()
  }

  /// Auth failures show the server's message when it gave one.
  fn fail_auth(&mut self, e: ClientError, rejected: &str, retry: &str) -> TrackerError {
    tracing::warn!(error = %e, "authentication failed");
    let banner = match &e {
      ClientError::Rejected { message, .. } => message.as_deref().unwrap_or(rejected),
      _ => retry,
    };
    self.error = Some(banner.to_string());
    e.into()
  }

  /// An expired session forces a logout; anything else shows `fallback`.
  fn fail_request(&mut self, e: ClientError, fallback: &str) -> TrackerError {
    if e.is_session_expired() {
      tracing::info!("session expired, logging out");
      self.end_session();
      self.error = Some(SESSION_EXPIRED.to_string());
    } else {
      tracing::warn!(error = %e, "request failed");
      self.error = Some(fallback.to_string());
    }
    e.into()
  }
}

fn capitalise(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
