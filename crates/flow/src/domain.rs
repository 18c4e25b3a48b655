// Archivo: domain.rs
// Propósito: modelo estático del proceso. Un `Flow` contiene `Step`s
// ordenados y cada `Step` contiene `Task`s ordenadas. Todo es inmutable
// después de construirse: no existe API de mutación.
use crate::condition::{PassCondition, VisibilityCondition};
use crate::errors::{FlowError, Result};
use crate::state::{Payload, UserStateSnapshot};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

fn require_text(value: String, what: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(FlowError::configuration(format!("{} no puede estar vacío", what)));
    }
    Ok(value)
}

/// Unidad mínima de trabajo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: String,
    name: String,
    required_fields: BTreeSet<String>,
    pass_condition: PassCondition,
    visibility_condition: VisibilityCondition,
    redoable: bool,
}

impl Task {
    pub fn new(id: impl Into<String>,
               name: impl Into<String>,
               required_fields: BTreeSet<String>,
               pass_condition: PassCondition,
               visibility_condition: VisibilityCondition,
               redoable: bool)
               -> Result<Self> {
        let id = require_text(id.into(), "El id de la tarea")?;
        let name = require_text(name.into(), &format!("El nombre de la tarea '{}'", id))?;
        Ok(Self { id,
                  name,
                  required_fields,
                  pass_condition,
                  visibility_condition,
                  redoable })
    }

    /// Tarea sin campos requeridos, siempre visible, que siempre aprueba y
    /// es repetible.
    pub fn simple(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Self::new(id, name, BTreeSet::new(), PassCondition::Always, VisibilityCondition::Always, true)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_fields(&self) -> &BTreeSet<String> {
        &self.required_fields
    }

    pub fn pass_condition(&self) -> &PassCondition {
        &self.pass_condition
    }

    pub fn visibility_condition(&self) -> &VisibilityCondition {
        &self.visibility_condition
    }

    pub fn is_redoable(&self) -> bool {
        self.redoable
    }

    /// `true` si `identifier` coincide con el id o con el nombre, sin
    /// distinguir mayúsculas.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let wanted = identifier.to_lowercase();
        self.id.to_lowercase() == wanted || self.name.to_lowercase() == wanted
    }

    pub fn evaluate_passed(&self, payload: &Payload) -> bool {
        self.pass_condition.evaluate(payload)
    }

    pub fn is_visible(&self, snapshot: &UserStateSnapshot) -> bool {
        self.visibility_condition.evaluate(snapshot)
    }

    /// Conjunto completo de campos requeridos que faltan como claves en el
    /// payload. El valor de una clave presente no se inspecciona.
    pub fn missing_fields(&self, payload: &Payload) -> BTreeSet<String> {
        self.required_fields
            .iter()
            .filter(|f| !payload.contains_key(f.as_str()))
            .cloned()
            .collect()
    }
}

/// Fase del proceso con tareas ordenadas.
///
/// Un paso sin tareas se interpreta como una tarea implícita: no hay nada
/// que completar, pero quien lo muestre debe tratarlo aparte.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    id: String,
    name: String,
    tasks: Vec<Task>,
}

impl Step {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tasks: Vec<Task>) -> Result<Self> {
        let id = require_text(id.into(), "El id del paso")?;
        let name = require_text(name.into(), &format!("El nombre del paso '{}'", id))?;
        Ok(Self { id, name, tasks })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn has_implicit_task(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == task_id)
    }
}

/// Definición completa del proceso.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flow {
    id: String,
    name: String,
    steps: Vec<Step>,
}

impl Flow {
    /// Construye el flujo validando identificadores. Los ids de tarea deben
    /// ser únicos en todo el flujo.
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Result<Self> {
        let id = require_text(id.into(), "El id del flujo")?;
        let name = require_text(name.into(), "El nombre del flujo")?;
        let mut seen = HashSet::new();
        for task in steps.iter().flat_map(|s| s.tasks.iter()) {
            if !seen.insert(task.id.as_str()) {
                return Err(FlowError::configuration(format!("Id de tarea duplicado en el flujo: {}", task.id)));
            }
        }
        Ok(Self { id, name, steps })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Todas las tareas en orden de flujo junto al índice de su paso.
    pub fn tasks(&self) -> impl Iterator<Item = (usize, &Step, &Task)> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.tasks.iter().map(move |t| (i, s, t)))
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks().map(|(_, _, t)| t).find(|t| t.id == task_id)
    }

    /// Paso (con su índice) que contiene la tarea `task_id`.
    pub fn step_containing(&self, task_id: &str) -> Option<(usize, &Step)> {
        self.steps.iter().enumerate().find(|(_, s)| s.contains_task(task_id))
    }

    pub fn task_count(&self) -> usize {
        self.steps.iter().map(|s| s.tasks.len()).sum()
    }
}
