//! Crate `flow`: modelo estático del proceso de admisiones
//!
//! Define el flujo (`Flow` → `Step` → `Task`), el vocabulario de
//! condiciones (`PassCondition`, `VisibilityCondition`) junto con su
//! compilador, los tipos de valor del estado de un usuario (`TaskResult`,
//! `UserStateSnapshot`) y el cargador de la definición declarativa.
//!
//! Diseño resumido:
//! - El flujo se construye una vez al arrancar y nunca se modifica.
//! - Las condiciones son variantes etiquetadas, inspeccionables y
//!   serializables; se evalúan con `evaluate`.
//! - Un tipo de condición desconocido es un error de configuración fatal
//!   (`FlowError::Configuration`): el flujo no se carga.
//!
//! Ejemplo rápido:
//! ```rust
//! let flow = flow::bundled_flow().expect("flujo incluido válido");
//! assert_eq!(flow.steps()[0].name(), "Personal Details Form");
//! ```
pub mod condition;
pub mod definition;
pub mod domain;
pub mod errors;
pub mod state;

pub use condition::*;
pub use definition::*;
pub use domain::*;
pub use errors::*;
pub use state::*;
