// Archivo: errors.rs
// Propósito: definir los errores del modelo de flujo y el alias Result<T>
// usado por las APIs del crate.
use thiserror::Error;

/// Errores del modelo de flujo.
///
/// Todos son errores de arranque: un flujo que no compila no debe cargarse.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Definición inválida (tipo de condición desconocido, parámetro
    /// faltante, identificadores vacíos o duplicados).
    #[error("Error de configuración: {0}")]
    Configuration(String),
    /// No se pudo leer el archivo de definición.
    #[error("Error de lectura: {0}")]
    Io(#[from] std::io::Error),
    /// El documento de definición no es JSON válido para el esquema.
    #[error("Error de formato: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FlowError {
    /// Atajo para construir un `Configuration` a partir de cualquier texto.
    pub fn configuration(msg: impl Into<String>) -> Self {
        FlowError::Configuration(msg.into())
    }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, FlowError>;
