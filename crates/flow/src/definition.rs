// Archivo: definition.rs
// Propósito: documento declarativo del flujo (JSON en camelCase) y su
// compilación a `Flow`. La compilación de condiciones ocurre aquí, una
// sola vez; cualquier error impide cargar el flujo.
use crate::condition::{ConditionDescriptor, PassCondition, VisibilityCondition};
use crate::domain::{Flow, Step, Task};
use crate::errors::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Definición del flujo de admisiones incluida en el crate.
pub const BUNDLED_FLOW_JSON: &str = include_str!("../config/admissions_flow.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub id: String,
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required_fields: BTreeSet<String>,
    #[serde(default)]
    pub pass_condition: Option<ConditionDescriptor>,
    #[serde(default)]
    pub visibility_condition: Option<ConditionDescriptor>,
    /// Ausente equivale a `true`.
    #[serde(default)]
    pub redoable: Option<bool>,
}

impl TaskDefinition {
    fn compile(&self) -> Result<Task> {
        let pass = PassCondition::compile_optional(self.pass_condition.as_ref()).map_err(|e| in_task(&self.id, e))?;
        let visibility =
            VisibilityCondition::compile_optional(self.visibility_condition.as_ref()).map_err(|e| in_task(&self.id, e))?;
        Task::new(self.id.clone(),
                  self.name.clone(),
                  self.required_fields.clone(),
                  pass,
                  visibility,
                  self.redoable.unwrap_or(true))
    }
}

fn in_task(task_id: &str, err: FlowError) -> FlowError {
    match err {
        FlowError::Configuration(msg) => FlowError::Configuration(format!("tarea '{}': {}", task_id, msg)),
        other => other,
    }
}

impl FlowDefinition {
    /// Compila la definición completa. Falla con `FlowError::Configuration`
    /// ante el primer problema encontrado.
    pub fn compile(&self) -> Result<Flow> {
        let steps = self.steps
                        .iter()
                        .map(|s| {
                            let tasks = s.tasks.iter().map(TaskDefinition::compile).collect::<Result<Vec<_>>>()?;
                            Step::new(s.id.clone(), s.name.clone(), tasks)
                        })
                        .collect::<Result<Vec<_>>>()?;
        Flow::new(self.id.clone(), self.name.clone(), steps)
    }
}

/// Decodifica y compila un flujo a partir de texto JSON.
pub fn load_flow_from_str(json: &str) -> Result<Flow> {
    let definition: FlowDefinition = serde_json::from_str(json)?;
    let flow = definition.compile()?;
    log::info!("Flujo '{}' cargado: {} pasos, {} tareas",
               flow.id(),
               flow.steps().len(),
               flow.task_count());
    Ok(flow)
}

/// Lee, decodifica y compila un flujo desde un archivo.
pub fn load_flow_from_path(path: impl AsRef<Path>) -> Result<Flow> {
    let path = path.as_ref();
    log::debug!("Leyendo definición de flujo desde {}", path.display());
    let text = std::fs::read_to_string(path)?;
    load_flow_from_str(&text)
}

/// Flujo de admisiones incluido en el crate.
pub fn bundled_flow() -> Result<Flow> {
    load_flow_from_str(BUNDLED_FLOW_JSON)
}
