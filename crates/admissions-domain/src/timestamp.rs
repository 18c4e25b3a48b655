// timestamp.rs
//
// Resolución del instante de un resultado a partir del campo `timestamp`
// del payload. Los fallos de parseo nunca se propagan: se usa la hora
// actual.
use chrono::{DateTime, Utc};
use flow::Payload;
use serde_json::Value as JsonValue;

/// Campo del payload del que se toma el instante.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// 2000-01-01T00:00:00Z en milisegundos. Un número menor se interpreta como
/// segundos desde epoch; uno mayor o igual, como milisegundos.
pub const EPOCH_SECONDS_THRESHOLD_MILLIS: i64 = 946_684_800_000;

/// Resuelve el instante del payload usando la hora actual como referencia.
pub fn resolve_timestamp(payload: &Payload) -> DateTime<Utc> {
  resolve_timestamp_at(payload.get(TIMESTAMP_FIELD), Utc::now())
}

/// Variante determinista: `now` es el instante usado para `"now"`, valores
/// ausentes y cualquier fallo de parseo.
pub fn resolve_timestamp_at(value: Option<&JsonValue>, now: DateTime<Utc>) -> DateTime<Utc> {
  match value {
    None | Some(JsonValue::Null) => now,
    Some(JsonValue::String(text)) => parse_text(text, now),
    Some(JsonValue::Number(n)) => {
      let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64));
      raw.and_then(from_epoch_number).unwrap_or_else(|| {
        log::debug!("timestamp numérico fuera de rango ({}), se usa la hora actual", n);
        now
      })
    }
    Some(_) => now,
  }
}

fn parse_text(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
  if text.trim().eq_ignore_ascii_case("now") {
    return now;
  }
  if is_strict_instant(text) {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
      return dt.with_timezone(&Utc);
    }
  }
  if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
    return dt.with_timezone(&Utc);
  }
  log::debug!("timestamp '{}' no reconocido, se usa la hora actual", text);
  now
}

/// Forma estricta de un instante ISO-8601: separador `T` y zona `Z` u
/// offset `±hh:mm`, ambos en mayúsculas. `parse_from_rfc3339` acepta además
/// espacio y minúsculas.
fn is_strict_instant(text: &str) -> bool {
  let bytes = text.as_bytes();
  if bytes.len() <= 10 || bytes[10] != b'T' {
    return false;
  }
  if bytes.ends_with(b"Z") {
    return true;
  }
  let n = bytes.len();
  n >= 6 && matches!(bytes[n - 6], b'+' | b'-') && bytes[n - 3] == b':'
}

fn from_epoch_number(value: i64) -> Option<DateTime<Utc>> {
  if value < EPOCH_SECONDS_THRESHOLD_MILLIS {
    DateTime::from_timestamp(value, 0)
  } else {
    DateTime::from_timestamp_millis(value)
  }
}
