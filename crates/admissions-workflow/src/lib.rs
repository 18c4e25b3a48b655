//! admissions-workflow: motor de evaluación del proceso de admisiones
//!
//! Proyección de visibilidad, cálculo de posición y de estado, la
//! transacción de completado de tarea y `AdmissionsService`, que los
//! orquesta sobre un `flow::Flow` y un `admissions_domain::UserRepository`.

pub mod errors;
pub mod position;
pub mod progress;
pub mod service;
pub mod status;
pub mod transaction;
pub mod visibility;

pub use errors::{ErrorKind, WorkflowError, GENERIC_ERROR_MESSAGE};
pub use position::{current_position, CurrentPosition};
pub use progress::ProgressSummary;
pub use service::{AdmissionsService, TaskOutcome};
pub use status::{compute_status, UserStatus};
pub use visibility::{visible_steps, VisibleStep};
