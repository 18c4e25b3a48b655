//! admissions-domain: usuarios y su almacén
//!
//! Define la vista `User`, el contrato `UserRepository`, la implementación
//! concurrente en memoria `InMemoryUserRepository` y la resolución del
//! instante de cada resultado (`resolve_timestamp`).

mod errors;
mod timestamp;
mod user;
mod user_repository;

pub use errors::DomainError;
pub use timestamp::{resolve_timestamp, resolve_timestamp_at, EPOCH_SECONDS_THRESHOLD_MILLIS, TIMESTAMP_FIELD};
pub use user::{normalize_email, User};
pub use user_repository::{InMemoryUserRepository, UserRepository};
