use crate::errors::{Result, WorkflowError};
use crate::position::{current_position, CurrentPosition};
use crate::progress::ProgressSummary;
use crate::status::{compute_status, UserStatus};
use crate::transaction::{check_redoable, containing_step, resolve_task, validate_order, validate_required_fields};
use crate::visibility::{visible_steps, visible_tasks_in_order, VisibleStep};
use admissions_domain::{resolve_timestamp, InMemoryUserRepository, User, UserRepository};
use dashmap::DashMap;
use flow::{Flow, Payload, Step, TaskResult, UserStateSnapshot};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Resultado de completar una tarea.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub user_id: String,
    pub task_id: String,
    pub task_name: String,
    pub passed: bool,
    pub user_status: UserStatus,
}

/// Orquesta el flujo de admisiones sobre un almacén de usuarios.
///
/// El flujo es de sólo lectura y se comparte entre hilos. Cada
/// `complete_task` mantiene un candado exclusivo por usuario desde que
/// toma la foto hasta que guarda el resultado, de modo que dos
/// completados concurrentes del mismo usuario se serializan y el segundo
/// valida contra lo escrito por el primero. Usuarios distintos no
/// comparten candado.
pub struct AdmissionsService<R: UserRepository = InMemoryUserRepository> {
    flow: Arc<Flow>,
    users: Arc<R>,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AdmissionsService<InMemoryUserRepository> {
    /// Servicio con un almacén en memoria vacío.
    pub fn in_memory(flow: Flow) -> Self {
        Self::new(Arc::new(flow), Arc::new(InMemoryUserRepository::new()))
    }
}

impl<R: UserRepository> AdmissionsService<R> {
    pub fn new(flow: Arc<Flow>, users: Arc<R>) -> Self {
        Self { flow,
               users,
               user_locks: DashMap::new() }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn ordered_steps(&self) -> &[Step] {
        self.flow.steps()
    }

    pub fn create_user(&self, email: &str) -> Result<User> {
        Ok(self.users.create_user(email)?)
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.get_user(user_id)?)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.list_users()?)
    }

    /// Foto del usuario; vacía si el id no existe.
    pub fn snapshot(&self, user_id: &str) -> Result<UserStateSnapshot> {
        Ok(self.users.snapshot(user_id)?)
    }

    /// Todos los pasos en orden, cada uno con sus tareas visibles.
    pub fn visible_steps(&self, user_id: &str) -> Result<Vec<VisibleStep<'_>>> {
        let snapshot = self.users.snapshot(user_id)?;
        Ok(visible_steps(&self.flow, &snapshot))
    }

    /// Valida y registra el resultado de una tarea para el usuario.
    ///
    /// `task_identifier` puede ser el id o el nombre de la tarea, sin
    /// distinguir mayúsculas. El orden de validación es: tarea visible,
    /// rehacible, prerequisitos del paso y campos requeridos. El resultado
    /// reemplaza cualquier resultado anterior de la misma tarea.
    pub fn complete_task(&self, user_id: &str, task_identifier: &str, payload: Payload) -> Result<TaskOutcome> {
        self.require_user(user_id)?;
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| {
                                    log::warn!("Candado del usuario {} envenenado; se recupera", user_id);
                                    poisoned.into_inner()
                                });

        let outcome = self.complete_locked(user_id, task_identifier, payload);
        match &outcome {
            Ok(o) => log::info!("Usuario {}: tarea '{}' completada (aprobada: {}, estado: {})",
                                user_id,
                                o.task_id,
                                o.passed,
                                o.user_status),
            Err(e) => log::warn!("Usuario {}: no se pudo completar '{}': {}", user_id, task_identifier, e),
        }
        outcome
    }

    fn complete_locked(&self, user_id: &str, task_identifier: &str, payload: Payload) -> Result<TaskOutcome> {
        let snapshot = self.users.snapshot(user_id)?;
        let task = resolve_task(&self.flow, task_identifier, &snapshot)?;
        let step = containing_step(&self.flow, task)?;
        check_redoable(task, &snapshot)?;
        validate_order(step, task, &snapshot)?;
        validate_required_fields(task, &payload)?;

        let passed = task.evaluate_passed(&payload);
        let resolved_at = resolve_timestamp(&payload);
        self.users
            .record_result(user_id, TaskResult::new(task.id(), passed, resolved_at, payload))?;

        let user_status = compute_status(&self.flow, &self.users.snapshot(user_id)?);
        Ok(TaskOutcome { user_id: user_id.to_string(),
                         task_id: task.id().to_string(),
                         task_name: task.name().to_string(),
                         passed,
                         user_status })
    }

    /// Paso y tarea actuales; `None` cuando todas las tareas visibles
    /// están aprobadas.
    pub fn current_position(&self, user_id: &str) -> Result<Option<CurrentPosition<'_>>> {
        self.require_user(user_id)?;
        let snapshot = self.users.snapshot(user_id)?;
        Ok(current_position(&self.flow, &snapshot))
    }

    pub fn progress(&self, user_id: &str) -> Result<ProgressSummary> {
        self.require_user(user_id)?;
        let snapshot = self.users.snapshot(user_id)?;
        let position = current_position(&self.flow, &snapshot);
        let total_visible = visible_tasks_in_order(&self.flow, &snapshot).len();
        Ok(ProgressSummary::from_position(position.as_ref(), snapshot.len(), total_visible))
    }

    pub fn user_status(&self, user_id: &str) -> Result<UserStatus> {
        self.require_user(user_id)?;
        let snapshot = self.users.snapshot(user_id)?;
        Ok(compute_status(&self.flow, &snapshot))
    }

    fn require_user(&self, user_id: &str) -> Result<()> {
        if self.users.user_exists(user_id)? {
            Ok(())
        } else {
            Err(WorkflowError::UserNotFound(user_id.to_string()))
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.user_locks.entry(user_id.to_string()).or_default().value())
    }
}
