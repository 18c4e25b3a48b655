// Archivo: condition.rs
// Propósito: vocabulario de condiciones del flujo. Un `ConditionDescriptor`
// es la forma declarativa (tal como aparece en la definición JSON); el
// compilador lo traduce una única vez a una variante etiquetada
// (`PassCondition` / `VisibilityCondition`) que se evalúa con `evaluate`.
use crate::errors::{FlowError, Result};
use crate::state::{Payload, UserStateSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Descriptor declarativo de una condición.
///
/// Los campos dependen del tipo: `field`/`threshold` para
/// `scoreGreaterThan`, `field`/`value` para `equals`. `taskId`, `min` y
/// `max` se aceptan en el documento pero ningún tipo compilado los usa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ConditionDescriptor {
    /// Descriptor `{"type": "<kind>"}` sin parámetros.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(),
               ..Default::default() }
    }

    fn require_field(&self, role: &str) -> Result<String> {
        match self.field.as_deref().map(str::trim) {
            Some(f) if !f.is_empty() => Ok(f.to_string()),
            _ => Err(FlowError::configuration(format!("La condición de {} '{}' requiere 'field'", role, self.kind))),
        }
    }
}

/// Condición de aprobación evaluada sobre el payload enviado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PassCondition {
    /// Siempre aprueba: basta con que llegue un payload.
    Always,
    /// Aprueba si `field` es numérico (o texto numérico) y estrictamente
    /// mayor que `threshold`.
    ScoreGreaterThan { field: String, threshold: f64 },
    /// Aprueba si `field` existe y su representación textual es `value`.
    Equals { field: String, value: String },
}

impl PassCondition {
    /// Compila un descriptor. Un tipo desconocido o un parámetro faltante
    /// es un error de configuración fatal.
    pub fn compile(descriptor: &ConditionDescriptor) -> Result<Self> {
        match descriptor.kind.as_str() {
            "always" => Ok(PassCondition::Always),
            "scoreGreaterThan" => {
                let field = descriptor.require_field("aprobación")?;
                let threshold = descriptor.threshold.ok_or_else(|| {
                                                        FlowError::configuration("La condición 'scoreGreaterThan' requiere 'threshold'")
                                                    })?;
                Ok(PassCondition::ScoreGreaterThan { field, threshold })
            }
            "equals" => {
                let field = descriptor.require_field("aprobación")?;
                let value = descriptor.value
                                      .as_ref()
                                      .and_then(stringify)
                                      .ok_or_else(|| FlowError::configuration("La condición 'equals' requiere 'value'"))?;
                Ok(PassCondition::Equals { field, value })
            }
            other => Err(FlowError::configuration(format!("Tipo de condición de aprobación desconocido: {}", other))),
        }
    }

    /// Compila un descriptor opcional: la ausencia equivale a `Always`.
    pub fn compile_optional(descriptor: Option<&ConditionDescriptor>) -> Result<Self> {
        descriptor.map(Self::compile).unwrap_or(Ok(PassCondition::Always))
    }

    /// Evalúa la condición contra el payload. Sin efectos secundarios.
    pub fn evaluate(&self, payload: &Payload) -> bool {
        match self {
            PassCondition::Always => true,
            PassCondition::ScoreGreaterThan { field, threshold } => {
                payload.get(field).and_then(numeric_value).map(|v| v > *threshold).unwrap_or(false)
            }
            PassCondition::Equals { field, value } => match payload.get(field) {
                None | Some(JsonValue::Null) => false,
                Some(JsonValue::String(s)) => s == value,
                Some(other) => other.to_string() == *value,
            },
        }
    }
}

/// Condición de visibilidad evaluada sobre la foto del usuario.
///
/// Sólo `always` tiene comportamiento compilado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VisibilityCondition {
    Always,
}

impl VisibilityCondition {
    pub fn compile(descriptor: &ConditionDescriptor) -> Result<Self> {
        match descriptor.kind.as_str() {
            "always" => Ok(VisibilityCondition::Always),
            other => Err(FlowError::configuration(format!("Tipo de condición de visibilidad desconocido: {}", other))),
        }
    }

    pub fn compile_optional(descriptor: Option<&ConditionDescriptor>) -> Result<Self> {
        descriptor.map(Self::compile).unwrap_or(Ok(VisibilityCondition::Always))
    }

    pub fn evaluate(&self, _snapshot: &UserStateSnapshot) -> bool {
        match self {
            VisibilityCondition::Always => true,
        }
    }
}

/// Número contenido en un valor JSON: números directos o texto parseable.
fn numeric_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Texto de comparación de un valor JSON. `null` no tiene representación.
fn stringify(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
