use crate::user::normalize_email;
use crate::{DomainError, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use flow::{TaskResult, UserStateSnapshot};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Contrato del almacén de usuarios y de sus resultados por tarea.
pub trait UserRepository: Send + Sync {
    /// Crea un usuario con id decimal monótono. Falla con `DuplicateUser`
    /// si el email normalizado (trim + minúsculas) ya existe; el email se
    /// guarda tal como llega.
    fn create_user(&self, email: &str) -> Result<User, DomainError>;

    /// Recupera un usuario por id.
    fn get_user(&self, id: &str) -> Result<Option<User>, DomainError>;

    /// Lista todos los usuarios ordenados por id numérico.
    fn list_users(&self) -> Result<Vec<User>, DomainError>;

    /// Foto de los resultados del usuario. Un id desconocido devuelve una
    /// foto vacía, no un error.
    fn snapshot(&self, id: &str) -> Result<UserStateSnapshot, DomainError>;

    /// Inserta o reemplaza el resultado de `result.task_id()` para el
    /// usuario. Retorna `UserNotFound` si el usuario no existe.
    fn record_result(&self, user_id: &str, result: TaskResult) -> Result<(), DomainError>;

    fn user_exists(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.get_user(id)?.is_some())
    }
}

/// Registro vivo de un usuario. El mapa de resultados sólo crece en número
/// de claves o reemplaza valores.
#[derive(Debug)]
struct UserRecord {
    id: String,
    email: String,
    completed: RwLock<HashMap<String, Arc<TaskResult>>>,
}

impl UserRecord {
    fn new(id: String, email: &str) -> Self {
        Self { id,
               email: email.to_string(),
               completed: RwLock::new(HashMap::new()) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Arc<TaskResult>>>, DomainError> {
        self.completed
            .read()
            .map_err(|e| DomainError::Storage(format!("RwLock de resultados del usuario '{}' envenenado: {}", self.id, e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Arc<TaskResult>>>, DomainError> {
        self.completed
            .write()
            .map_err(|e| DomainError::Storage(format!("RwLock de resultados del usuario '{}' envenenado: {}", self.id, e)))
    }

    fn to_user(&self) -> Result<User, DomainError> {
        let completed = self.read()?;
        let tasks: BTreeMap<String, TaskResult> = completed.iter().map(|(k, v)| (k.clone(), v.as_ref().clone())).collect();
        Ok(User::new(self.id.clone(), self.email.clone(), tasks))
    }
}

/// Implementación en memoria, segura para acceso concurrente.
///
/// `users` (id → registro) y `email_index` (email normalizado → id) son
/// `DashMap`s: las creaciones con emails distintos no comparten un candado
/// global. Durante una creación se mantiene tomada la entrada del índice
/// mientras se inserta el registro, así que ninguna búsqueda por ese email
/// observa uno sin el otro.
pub struct InMemoryUserRepository {
    users: Arc<DashMap<String, Arc<UserRecord>>>,
    email_index: Arc<DashMap<String, String>>,
    next_id: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self { users: Arc::new(DashMap::new()),
               email_index: Arc::new(DashMap::new()),
               next_id: AtomicU64::new(1) }
    }

    fn record(&self, id: &str) -> Option<Arc<UserRecord>> {
        self.users.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Número de usuarios registrados.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create_user(&self, email: &str) -> Result<User, DomainError> {
        match self.email_index.entry(normalize_email(email)) {
            Entry::Occupied(_) => {
                log::warn!("Email duplicado rechazado: {}", email);
                Err(DomainError::DuplicateUser(email.to_string()))
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
                let record = Arc::new(UserRecord::new(id.clone(), email));
                self.users.insert(id.clone(), record);
                slot.insert(id.clone());
                log::info!("Usuario {} creado", id);
                Ok(User::new(id, email, BTreeMap::new()))
            }
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        match self.record(id) {
            Some(record) => Ok(Some(record.to_user()?)),
            None => Ok(None),
        }
    }

    fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let records: Vec<Arc<UserRecord>> = self.users.iter().map(|r| Arc::clone(r.value())).collect();
        let mut users = records.iter().map(|r| r.to_user()).collect::<Result<Vec<_>, _>>()?;
        users.sort_by_key(|u| u.id().parse::<u64>().unwrap_or(u64::MAX));
        Ok(users)
    }

    fn snapshot(&self, id: &str) -> Result<UserStateSnapshot, DomainError> {
        match self.record(id) {
            Some(record) => {
                let completed = record.read()?;
                Ok(UserStateSnapshot::new(id, completed.clone()))
            }
            None => Ok(UserStateSnapshot::empty(id)),
        }
    }

    fn record_result(&self, user_id: &str, result: TaskResult) -> Result<(), DomainError> {
        let record = self.record(user_id)
                         .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;
        let mut completed = record.write()?;
        log::debug!("Usuario {}: resultado de '{}' (aprobado: {})",
                    user_id,
                    result.task_id(),
                    result.passed());
        completed.insert(result.task_id().to_string(), Arc::new(result));
        Ok(())
    }
}
