// Archivo: state.rs
// Propósito: tipos de valor que describen el estado de un usuario dentro del
// flujo: el resultado de una tarea (`TaskResult`) y la foto inmutable de
// todos sus resultados (`UserStateSnapshot`) sobre la que se evalúan la
// visibilidad, la posición y el estado agregado.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Datos enviados al completar una tarea: objeto JSON clave → valor.
pub type Payload = serde_json::Map<String, JsonValue>;

/// Resultado de un usuario para una tarea.
///
/// Inmutable una vez creado. Un nuevo resultado para la misma tarea lo
/// reemplaza completo; no se guarda historial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    task_id: String,
    passed: bool,
    resolved_at: DateTime<Utc>,
    payload: Payload,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, passed: bool, resolved_at: DateTime<Utc>, payload: Payload) -> Self {
        Self { task_id: task_id.into(),
               passed,
               resolved_at,
               payload }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Instante resuelto a partir del campo `timestamp` del payload.
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Foto inmutable de los resultados de un usuario en un instante dado.
///
/// Los resultados se comparten mediante `Arc`: tomar una foto copia el mapa
/// de punteros, nunca los payloads, y nunca comparte el mapa vivo del
/// almacén.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStateSnapshot {
    user_id: String,
    completed_tasks: HashMap<String, Arc<TaskResult>>,
}

impl UserStateSnapshot {
    pub fn new(user_id: impl Into<String>, completed_tasks: HashMap<String, Arc<TaskResult>>) -> Self {
        Self { user_id: user_id.into(),
               completed_tasks }
    }

    /// Foto sin resultados (usuario nuevo o desconocido).
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self::new(user_id, HashMap::new())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Último resultado registrado para `task_id`, si existe.
    pub fn result(&self, task_id: &str) -> Option<&TaskResult> {
        self.completed_tasks.get(task_id).map(|r| r.as_ref())
    }

    /// `true` si existe cualquier resultado (aprobado o no) para la tarea.
    pub fn has_result(&self, task_id: &str) -> bool {
        self.completed_tasks.contains_key(task_id)
    }

    /// `true` sólo si existe un resultado y además está aprobado.
    pub fn has_passed(&self, task_id: &str) -> bool {
        self.result(task_id).map(TaskResult::passed).unwrap_or(false)
    }

    /// `true` si existe un resultado y no está aprobado.
    pub fn has_failed(&self, task_id: &str) -> bool {
        self.result(task_id).map(|r| !r.passed()).unwrap_or(false)
    }

    /// `true` si algún resultado del mapa completo está suspendido,
    /// independientemente de la visibilidad actual de su tarea.
    pub fn any_failed(&self) -> bool {
        self.completed_tasks.values().any(|r| !r.passed())
    }

    pub fn len(&self) -> usize {
        self.completed_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed_tasks.is_empty()
    }
}
