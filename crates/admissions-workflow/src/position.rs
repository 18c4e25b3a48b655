use crate::visibility::visible_tasks_in_order;
use flow::{Flow, Step, Task, UserStateSnapshot};
use serde::Serialize;

/// Paso y tarea sobre los que el usuario debe actuar a continuación.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentPosition<'a> {
    pub step_index: usize,
    pub step: &'a Step,
    pub task: &'a Task,
}

/// Calcula la posición actual sobre las tareas visibles.
///
/// Primero se busca la primera tarea cuyo último resultado existe y no
/// aprueba (reintento), aunque haya tareas sin intentar en pasos
/// anteriores; si no hay ninguna, la primera tarea sin resultado. `None`
/// significa que el usuario aprobó todas las tareas visibles.
///
/// No se tiene en cuenta si la tarea es rehacible: una tarea no rehacible
/// fallida se sigue devolviendo aunque completarla otra vez sea rechazado.
pub fn current_position<'a>(flow: &'a Flow, snapshot: &UserStateSnapshot) -> Option<CurrentPosition<'a>> {
    let visible = visible_tasks_in_order(flow, snapshot);
    let retry = visible.iter().find(|(_, _, t)| snapshot.has_failed(t.id()));
    retry.or_else(|| visible.iter().find(|(_, _, t)| !snapshot.has_result(t.id())))
         .map(|&(step_index, step, task)| CurrentPosition { step_index, step, task })
}
