// user.rs
use flow::TaskResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Vista de un usuario: id, email tal como se registró y el último
/// resultado por tarea.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
  id: String,
  email: String,
  completed_tasks: BTreeMap<String, TaskResult>,
}

impl User {
  pub fn new(id: impl Into<String>, email: impl Into<String>, completed_tasks: BTreeMap<String, TaskResult>) -> Self {
    Self { id: id.into(), email: email.into(), completed_tasks }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Email original, sin normalizar.
  pub fn email(&self) -> &str {
    &self.email
  }

  pub fn completed_tasks(&self) -> &BTreeMap<String, TaskResult> {
    &self.completed_tasks
  }
}

/// Normalización usada sólo para el índice de unicidad de emails.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}
