//! Terminal state (focus, cursor, filter) and key dispatch.
//!
//! Everything with network meaning lives in [`Tracker`]; this layer only maps
//! keys onto tracker operations and keeps track of what has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use symtrack_client::{AuthMode, Tracker, View};
use symtrack_core::{storage::KeyValueStore, symptom::Symptom};

// ─── Focus ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// Navigating the symptom list.
  List,
  /// Typing into the add/edit form.
  Editor,
  /// Typing a list filter query.
  Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
  Username,
  Password,
  Age,
  Gender,
  Location,
}

impl AuthField {
  pub fn label(self) -> &'static str {
    match self {
      Self::Username => "Username",
      Self::Password => "Password",
      Self::Age => "Age",
      Self::Gender => "Gender (M/F/O)",
      Self::Location => "Location",
    }
  }
}

const LOGIN_FIELDS: &[AuthField] = &[AuthField::Username, AuthField::Password];
const REGISTER_FIELDS: &[AuthField] = &[
  AuthField::Username,
  AuthField::Password,
  AuthField::Age,
  AuthField::Gender,
  AuthField::Location,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
  Label,
  Description,
}

// ─── App ─────────────────────────────────────────────────────────────────────

/// Top-level terminal state.
pub struct App<S> {
  pub tracker: Tracker<S>,

  /// Keyboard focus within the dashboard.
  pub focus: Focus,

  /// Index into [`App::auth_fields`].
  pub auth_cursor: usize,

  pub editor_field: EditorField,

  /// Current fuzzy-filter string.
  pub filter: String,

  /// Cursor position within the *filtered* symptom list.
  pub list_cursor: usize,

  /// Symptom awaiting a y/n delete confirmation.
  pub confirm_delete: Option<i64>,

  /// Set when a key press issued a request; the event loop uses it to drop
  /// input that queued up meanwhile.
  sent_request: bool,
}

impl<S: KeyValueStore> App<S> {
  pub fn new(tracker: Tracker<S>) -> Self {
    Self {
      tracker,
      focus: Focus::List,
      auth_cursor: 0,
      editor_field: EditorField::Label,
      filter: String::new(),
      list_cursor: 0,
      confirm_delete: None,
      sent_request: false,
    }
  }

  /// Returns and resets the "a request went out" flag.
  pub fn take_sent_request(&mut self) -> bool { std::mem::take(&mut self.sent_request) }

  // ── Auth form ─────────────────────────────────────────────────────────────

  /// Fields shown by the current auth form, in tab order.
  pub fn auth_fields(&self) -> &'static [AuthField] {
    match self.tracker.auth_mode {
      AuthMode::Login => LOGIN_FIELDS,
      AuthMode::Register => REGISTER_FIELDS,
    }
  }

  pub fn focused_auth_field(&self) -> AuthField {
    let fields = self.auth_fields();
    fields[self.auth_cursor.min(fields.len() - 1)]
  }

  /// The raw text of `field` in the current auth form.
  pub fn auth_value(&self, field: AuthField) -> &str {
    let t = &self.tracker;
    match (t.auth_mode, field) {
      (AuthMode::Login, AuthField::Username) => t.login_form.username.as_str(),
      (AuthMode::Login, AuthField::Password) => t.login_form.password.as_str(),
      (AuthMode::Login, _) => "",
      (AuthMode::Register, AuthField::Username) => t.register_form.username.as_str(),
      (AuthMode::Register, AuthField::Password) => t.register_form.password.as_str(),
      (AuthMode::Register, AuthField::Age) => t.register_form.age.as_str(),
      (AuthMode::Register, AuthField::Gender) => t.register_form.gender.as_str(),
      (AuthMode::Register, AuthField::Location) => t.register_form.location.as_str(),
    }
  }

  fn focused_auth_value_mut(&mut self) -> &mut String {
    let field = self.focused_auth_field();
    let t = &mut self.tracker;
    match (t.auth_mode, field) {
      (AuthMode::Login, AuthField::Password) => &mut t.login_form.password,
      (AuthMode::Login, _) => &mut t.login_form.username,
      (AuthMode::Register, AuthField::Username) => &mut t.register_form.username,
      (AuthMode::Register, AuthField::Password) => &mut t.register_form.password,
      (AuthMode::Register, AuthField::Age) => &mut t.register_form.age,
      (AuthMode::Register, AuthField::Gender) => &mut t.register_form.gender,
      (AuthMode::Register, AuthField::Location) => &mut t.register_form.location,
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Symptoms matching the current filter, in server order.
  pub fn filtered_symptoms(&self) -> Vec<&Symptom> {
    let symptoms = self.tracker.symptoms();
    if self.filter.is_empty() {
      return symptoms.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    symptoms
      .iter()
      .filter(|s| {
        matcher.fuzzy_match(&s.label, &self.filter).is_some()
          || matcher.fuzzy_match(&s.description, &self.filter).is_some()
      })
      .collect()
  }

  /// The symptom under the list cursor, if any.
  pub fn cursor_symptom(&self) -> Option<&Symptom> {
    self.filtered_symptoms().get(self.list_cursor).copied()
  }

  fn clamp_cursor(&mut self) {
    let len = self.filtered_symptoms().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    let cont = match self.tracker.view() {
      View::Unauthenticated => self.handle_auth_key(key).await,
      View::Authenticated => match self.focus {
        Focus::List => self.handle_list_key(key).await,
        Focus::Editor => self.handle_editor_key(key).await,
        Focus::Filter => self.handle_filter_key(key),
      },
    };

    // A request may have ended the session (expiry) or changed the list.
    if self.tracker.view() == View::Unauthenticated {
      self.focus = Focus::List;
      self.filter.clear();
      self.list_cursor = 0;
      self.confirm_delete = None;
    } else {
      self.clamp_cursor();
    }
    Ok(cont)
  }

  async fn handle_auth_key(&mut self, key: KeyEvent) -> bool {
    let fields = self.auth_fields().len();
    match key.code {
      KeyCode::Esc => return false,

      KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.tracker.toggle_auth_mode();
        self.auth_cursor = 0;
      }

      KeyCode::Tab | KeyCode::Down => {
        self.auth_cursor = (self.auth_cursor + 1) % fields;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.auth_cursor = (self.auth_cursor + fields - 1) % fields;
      }

      KeyCode::Enter => {
        self.sent_request = true;
        if self.tracker.submit_auth().await.is_ok() {
          self.auth_cursor = 0;
          self.focus = Focus::List;
          self.list_cursor = 0;
        }
      }

      KeyCode::Backspace => {
        self.focused_auth_value_mut().pop();
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.focused_auth_value_mut().push(c);
      }

      _ => {}
    }
    true
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    if let Some(id) = self.confirm_delete.take() {
      if key.code == KeyCode::Char('y') {
        self.sent_request = true;
        if let Err(e) = self.tracker.delete_symptom(id).await {
          tracing::debug!(error = %e, "delete failed");
        }
      }
      return true;
    }

    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_symptoms().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // New symptom
      KeyCode::Char('a') | KeyCode::Char('n') => {
        self.tracker.cancel_edit();
        self.editor_field = EditorField::Label;
        self.focus = Focus::Editor;
      }

      // Edit the selected symptom
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some(id) = self.cursor_symptom().map(|s| s.id)
          && self.tracker.begin_edit(id).is_ok()
        {
          self.editor_field = EditorField::Label;
          self.focus = Focus::Editor;
        }
      }

      // Delete the selected symptom (asks first)
      KeyCode::Char('d') | KeyCode::Delete => {
        self.confirm_delete = self.cursor_symptom().map(|s| s.id);
      }

      // Filter
      KeyCode::Char('/') => {
        self.focus = Focus::Filter;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('r') => {
        self.sent_request = true;
        if let Err(e) = self.tracker.refresh().await {
          tracing::debug!(error = %e, "refresh failed");
        }
      }

      KeyCode::Char('L') => self.tracker.logout(),

      KeyCode::Esc => {
        if self.filter.is_empty() {
          self.tracker.dismiss_error();
        } else {
          self.filter.clear();
          self.list_cursor = 0;
        }
      }

      _ => {}
    }
    true
  }

  async fn handle_editor_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.tracker.cancel_edit();
        self.focus = Focus::List;
      }

      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.editor_field = match self.editor_field {
          EditorField::Label => EditorField::Description,
          EditorField::Description => EditorField::Label,
        };
      }

      KeyCode::Enter => {
        self.sent_request = true;
        if self.tracker.submit_symptom().await.is_ok() {
          self.editor_field = EditorField::Label;
          self.focus = Focus::List;
        }
      }

      KeyCode::Backspace => {
        self.focused_editor_value_mut().pop();
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.focused_editor_value_mut().push(c);
      }

      _ => {}
    }
    true
  }

  fn focused_editor_value_mut(&mut self) -> &mut String {
    let form = &mut self.tracker.symptom_form;
    match self.editor_field {
      EditorField::Label => &mut form.label,
      EditorField::Description => &mut form.description,
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.focus = Focus::List;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.focus = Focus::List;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    true
  }
}
