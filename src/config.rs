use flow::{Flow, FlowError};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const FLOW_PATH_VAR: &str = "ADMISSIONS_FLOW_PATH";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Variable de entorno inválida {0}: {1}")]
    EnvVarError(&'static str, env::VarError),
    #[error("No se pudo cargar el flujo: {0}")]
    Flow(#[from] FlowError),
}

/// Configuración del binario, leída del entorno (y de `.env` si existe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Definición de flujo alternativa; `None` usa la incluida.
    pub flow_path: Option<PathBuf>,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key))
    }

    /// Construye la configuración con una función de búsqueda arbitraria.
    /// Las variables ausentes o vacías toman su valor por defecto.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Result<String, env::VarError>
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                Ok(v) if v.trim().is_empty() => Ok(None),
                Ok(v) => Ok(Some(v.trim().to_string())),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(e) => Err(ConfigError::EnvVarError(key, e)),
            }
        };

        Ok(Self { flow_path: read(FLOW_PATH_VAR)?.map(PathBuf::from),
                  log_filter: read(LOG_FILTER_VAR)?.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()) })
    }

    /// Carga y compila el flujo configurado. Un error aquí aborta el
    /// arranque.
    pub fn load_flow(&self) -> Result<Flow, ConfigError> {
        let flow = match &self.flow_path {
            Some(path) => flow::load_flow_from_path(path)?,
            None => flow::bundled_flow()?,
        };
        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_when_unset() -> Result<(), ConfigError> {
        let cfg = AppConfig::from_lookup(lookup(&[]))?;
        assert_eq!(cfg.flow_path, None);
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.load_flow()?.id(), "admissions_flow");
        Ok(())
    }

    #[test]
    fn reads_flow_path_and_filter() -> Result<(), ConfigError> {
        let cfg = AppConfig::from_lookup(lookup(&[(FLOW_PATH_VAR, " /tmp/flow.json "), (LOG_FILTER_VAR, "debug")]))?;
        assert_eq!(cfg.flow_path, Some(PathBuf::from("/tmp/flow.json")));
        assert_eq!(cfg.log_filter, "debug");
        Ok(())
    }

    #[test]
    fn missing_flow_file_fails_loading() -> Result<(), ConfigError> {
        let cfg = AppConfig::from_lookup(lookup(&[(FLOW_PATH_VAR, "/definitely/not/here.json")]))?;
        assert!(matches!(cfg.load_flow(), Err(ConfigError::Flow(FlowError::Io(_)))));
        Ok(())
    }
}
