use flow::{Flow, Step, Task, UserStateSnapshot};
use serde::Serialize;

/// Paso tal como lo ve un usuario: todas sus tareas visibles en orden.
///
/// Los pasos nunca desaparecen; un paso vacío (o sin tareas visibles) se
/// conserva con `tasks` vacío.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleStep<'a> {
    pub index: usize,
    pub step: &'a Step,
    pub tasks: Vec<&'a Task>,
}

impl<'a> VisibleStep<'a> {
    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id() == task_id)
    }
}

pub fn visible_tasks<'a>(step: &'a Step, snapshot: &UserStateSnapshot) -> Vec<&'a Task> {
    step.tasks().iter().filter(|t| t.is_visible(snapshot)).collect()
}

/// Proyección del flujo para un usuario.
pub fn visible_steps<'a>(flow: &'a Flow, snapshot: &UserStateSnapshot) -> Vec<VisibleStep<'a>> {
    flow.steps()
        .iter()
        .enumerate()
        .map(|(index, step)| VisibleStep { index,
                                           step,
                                           tasks: visible_tasks(step, snapshot) })
        .collect()
}

/// Tareas visibles de todo el flujo en orden, con el índice de su paso.
pub fn visible_tasks_in_order<'a>(flow: &'a Flow, snapshot: &UserStateSnapshot) -> Vec<(usize, &'a Step, &'a Task)> {
    flow.tasks().filter(|(_, _, t)| t.is_visible(snapshot)).collect()
}
