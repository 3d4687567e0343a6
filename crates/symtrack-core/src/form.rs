//! Form state as typed by the user, and its validation into request bodies.
//!
//! Fields hold raw text. Nothing here talks to the network; each `validate`
//! either yields the request body or a [`FormError`] to put in the banner.

use thiserror::Error;

use crate::{
  symptom::{Symptom, SymptomInput},
  user::{Gender, LoginRequest, RegisterRequest},
};

/// Why a form could not be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
  #[error("{0} is required")]
  Required(&'static str),

  #[error("age must be a whole number")]
  InvalidAge,

  #[error("gender must be M, F or O")]
  InvalidGender,
}

fn required(value: &str, field: &'static str) -> Result<(), FormError> {
  if value.trim().is_empty() {
    Err(FormError::Required(field))
  } else {
    Ok(())
  }
}

fn optional(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_owned())
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

impl LoginForm {
  pub fn validate(&self) -> Result<LoginRequest, FormError> {
    required(&self.username, "username")?;
    required(&self.password, "password")?;
    Ok(LoginRequest {
      username: self.username.clone(),
      password: self.password.clone(),
    })
  }

  pub fn clear(&mut self) { *self = Self::default(); }
}

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
  pub username: String,
  pub password: String,
  pub age:      String,
  pub gender:   String,
  pub location: String,
}

impl RegisterForm {
  pub fn validate(&self) -> Result<RegisterRequest, FormError> {
    required(&self.username, "username")?;
    required(&self.password, "password")?;

    let age = optional(&self.age)
      .map(|a| a.parse::<u32>().map_err(|_| FormError::InvalidAge))
      .transpose()?;
    let gender = optional(&self.gender)
      .map(|g| g.parse::<Gender>().map_err(|_| FormError::InvalidGender))
      .transpose()?;

    Ok(RegisterRequest {
      username: self.username.clone(),
      password: self.password.clone(),
      age,
      gender,
      location: optional(&self.location),
    })
  }

  pub fn clear(&mut self) { *self = Self::default(); }
}

// ─── Symptom editor ──────────────────────────────────────────────────────────

/// What submitting the symptom form will do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorMode {
  /// Submit creates a new symptom.
  #[default]
  Creating,
  /// Submit updates this record. Holds the record as it was when the edit
  /// began.
  Editing(Symptom),
}

/// The shared add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomForm {
  pub label:       String,
  pub description: String,
  pub mode:        EditorMode,
}

impl SymptomForm {
  pub fn validate(&self) -> Result<SymptomInput, FormError> {
    required(&self.label, "label")?;
    required(&self.description, "description")?;
    Ok(SymptomInput {
      label:       self.label.clone(),
      description: self.description.clone(),
    })
  }

  /// Load `symptom` into the form, replacing any draft or edit in progress.
  pub fn begin_edit(&mut self, symptom: &Symptom) {
    self.label = symptom.label.clone();
    self.description = symptom.description.clone();
    self.mode = EditorMode::Editing(symptom.clone());
  }

  /// Back to an empty create form.
  pub fn reset(&mut self) { *self = Self::default(); }

  /// Id of the record being edited, if any.
  pub fn editing_id(&self) -> Option<i64> {
    match &self.mode {
      EditorMode::Creating => None,
      EditorMode::Editing(s) => Some(s.id),
    }
  }
}
