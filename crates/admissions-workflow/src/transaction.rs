//! Validaciones de la transacción de completado de tarea.
//!
//! Cada función corresponde a un punto de fallo de `complete_task` y se
//! evalúa contra una foto tomada dentro de la misma transacción.

use crate::errors::{Result, WorkflowError};
use crate::visibility::visible_tasks;
use flow::{Flow, Payload, Step, Task, UserStateSnapshot};

/// Busca en orden de flujo la primera tarea visible cuyo id o nombre
/// coincide con `identifier` sin distinguir mayúsculas.
pub fn resolve_task<'a>(flow: &'a Flow, identifier: &str, snapshot: &UserStateSnapshot) -> Result<&'a Task> {
    flow.tasks()
        .map(|(_, _, t)| t)
        .find(|t| t.matches_identifier(identifier) && t.is_visible(snapshot))
        .ok_or_else(|| WorkflowError::TaskNotFound(identifier.to_string()))
}

/// Paso que contiene la tarea, por búsqueda estructural.
pub fn containing_step<'a>(flow: &'a Flow, task: &Task) -> Result<&'a Step> {
    flow.step_containing(task.id())
        .map(|(_, step)| step)
        .ok_or_else(|| WorkflowError::Internal(format!("La tarea '{}' no pertenece a ningún paso", task.id())))
}

/// Una tarea no rehacible con cualquier resultado previo no se puede
/// volver a completar, haya aprobado o no.
pub fn check_redoable(task: &Task, snapshot: &UserStateSnapshot) -> Result<()> {
    if !task.is_redoable() && snapshot.has_result(task.id()) {
        return Err(WorkflowError::TaskAlreadyCompleted(task.name().to_string()));
    }
    Ok(())
}

/// Todas las tareas visibles anteriores del mismo paso deben tener un
/// resultado aprobado. Se nombra la primera que no lo cumple.
pub fn validate_order(step: &Step, task: &Task, snapshot: &UserStateSnapshot) -> Result<()> {
    let visible = visible_tasks(step, snapshot);
    let index = visible.iter().position(|t| t.id() == task.id()).ok_or_else(|| {
                                                                   WorkflowError::Internal(format!("La tarea '{}' no es visible en el paso '{}'",
                                                                                                   task.id(),
                                                                                                   step.name()))
                                                               })?;
    match visible[..index].iter().find(|t| !snapshot.has_passed(t.id())) {
        Some(prerequisite) => Err(WorkflowError::TaskOrderViolation { task: task.name().to_string(),
                                                                      prerequisite: prerequisite.name().to_string() }),
        None => Ok(()),
    }
}

/// El payload debe contener todas las claves requeridas (con cualquier
/// valor). Se informa el conjunto completo de ausentes.
pub fn validate_required_fields(task: &Task, payload: &Payload) -> Result<()> {
    let missing = task.missing_fields(payload);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WorkflowError::MissingRequiredFields { task: task.name().to_string(),
                                                   missing })
    }
}
