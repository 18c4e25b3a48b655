// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
  #[error("Ya existe un usuario con el email: {0}")]
  DuplicateUser(String),
  #[error("Usuario no encontrado: {0}")]
  UserNotFound(String),
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
}
