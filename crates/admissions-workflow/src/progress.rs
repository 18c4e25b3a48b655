use crate::position::CurrentPosition;
use serde::Serialize;

/// Resumen de avance de un usuario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressSummary {
    /// Todas las tareas visibles tienen un resultado aprobado.
    Completed { completed_tasks: usize, total_visible_tasks: usize },
    InProgress {
        step_index: usize,
        step_id: String,
        step_name: String,
        task_id: String,
        task_name: String,
        completed_tasks: usize,
        total_visible_tasks: usize,
    },
}

impl ProgressSummary {
    pub fn from_position(position: Option<&CurrentPosition<'_>>, completed_tasks: usize, total_visible_tasks: usize) -> Self {
        match position {
            None => ProgressSummary::Completed { completed_tasks,
                                                 total_visible_tasks },
            Some(p) => ProgressSummary::InProgress { step_index: p.step_index,
                                                     step_id: p.step.id().to_string(),
                                                     step_name: p.step.name().to_string(),
                                                     task_id: p.task.id().to_string(),
                                                     task_name: p.task.name().to_string(),
                                                     completed_tasks,
                                                     total_visible_tasks },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressSummary::Completed { .. })
    }
}
