use crate::visibility::visible_tasks_in_order;
use flow::{Flow, UserStateSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estado agregado de un usuario en el proceso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Accepted,
    Rejected,
    InProgress,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Accepted => "accepted",
            UserStatus::Rejected => "rejected",
            UserStatus::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Rejected` si cualquier resultado guardado falla, visible o no.
/// `Accepted` si todas las tareas visibles tienen un resultado aprobado.
/// En otro caso `InProgress`.
pub fn compute_status(flow: &Flow, snapshot: &UserStateSnapshot) -> UserStatus {
    if snapshot.any_failed() {
        return UserStatus::Rejected;
    }
    if visible_tasks_in_order(flow, snapshot).iter().all(|(_, _, t)| snapshot.has_passed(t.id())) {
        UserStatus::Accepted
    } else {
        UserStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_renders_as_snake_case() -> Result<(), serde_json::Error> {
        assert_eq!(UserStatus::InProgress.to_string(), "in_progress");
        assert_eq!(serde_json::to_string(&UserStatus::Rejected)?, "\"rejected\"");
        let parsed: UserStatus = serde_json::from_str("\"accepted\"")?;
        assert_eq!(parsed, UserStatus::Accepted);
        Ok(())
    }
}
