use admissions_domain::DomainError;
use flow::FlowError;
use std::collections::BTreeSet;
use thiserror::Error;

// Errores del motor de admisiones.
//
// Cada variante nombrada corresponde a un fallo por petición que se
// devuelve al llamador con un mensaje concreto. `Flow` sólo aparece al
// arrancar (definición inválida) e `Internal` agrupa cualquier otro fallo
// inesperado, cuyo detalle se registra pero no se expone.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Usuario no encontrado: {0}")]
    UserNotFound(String),

    #[error("Ya existe un usuario con el email: {0}")]
    DuplicateUser(String),

    /// Identificador desconocido o tarea no visible para el usuario.
    #[error("Tarea no encontrada: {0}")]
    TaskNotFound(String),

    /// Lleva el conjunto completo de campos ausentes, no sólo el primero.
    #[error("A la tarea '{task}' le faltan campos requeridos: {}", join_fields(.missing))]
    MissingRequiredFields { task: String, missing: BTreeSet<String> },

    #[error("No se puede completar la tarea '{task}' antes de completar la tarea previa '{prerequisite}'")]
    TaskOrderViolation { task: String, prerequisite: String },

    #[error("La tarea '{0}' ya fue completada")]
    TaskAlreadyCompleted(String),

    /// Definición de flujo inválida (fatal al arrancar).
    #[error("Error de flujo: {0}")]
    Flow(#[from] FlowError),

    #[error("Error interno: {0}")]
    Internal(String),
}

/// Clasificación estable de `WorkflowError` para la capa de frontera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    UserNotFound,
    DuplicateUser,
    TaskNotFound,
    MissingRequiredFields,
    TaskOrderViolation,
    TaskAlreadyCompleted,
    Internal,
}

pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error interno";

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::UserNotFound(_) => ErrorKind::UserNotFound,
            WorkflowError::DuplicateUser(_) => ErrorKind::DuplicateUser,
            WorkflowError::TaskNotFound(_) => ErrorKind::TaskNotFound,
            WorkflowError::MissingRequiredFields { .. } => ErrorKind::MissingRequiredFields,
            WorkflowError::TaskOrderViolation { .. } => ErrorKind::TaskOrderViolation,
            WorkflowError::TaskAlreadyCompleted(_) => ErrorKind::TaskAlreadyCompleted,
            WorkflowError::Flow(_) => ErrorKind::Configuration,
            WorkflowError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` para los fallos por petición que el llamador puede corregir.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Internal)
    }

    /// Mensaje apto para el llamador. Los errores internos y de
    /// configuración se reducen a un texto genérico.
    pub fn public_message(&self) -> String {
        if self.is_recoverable() {
            self.to_string()
        } else {
            GENERIC_ERROR_MESSAGE.to_string()
        }
    }
}

impl From<DomainError> for WorkflowError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::DuplicateUser(email) => WorkflowError::DuplicateUser(email),
            DomainError::UserNotFound(id) => WorkflowError::UserNotFound(id),
            DomainError::Storage(msg) => WorkflowError::Internal(msg),
        }
    }
}

fn join_fields(fields: &BTreeSet<String>) -> String {
    fields.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
