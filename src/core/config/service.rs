use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::defaults::{AppConfig, ProviderKind};
use super::paths::AppPaths;
use super::validation::validate_config;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
    explicit_path: Option<PathBuf>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self {
            paths,
            explicit_path: None,
        }
    }

    /// Uses `path` instead of the discovered `config.yml` (CLI `--config`).
    pub fn with_config_path(paths: Arc<AppPaths>, path: PathBuf) -> Self {
        Self {
            paths,
            explicit_path: Some(path),
        }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return path.clone();
        }

        if let Ok(path) = env::var("RAG_QUERY_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Loads `config.yml`, merges `secrets.yaml` over it, applies environment
    /// overrides and validates the result.
    pub fn load_config(&self) -> Result<AppConfig, ApiError> {
        let public_config = load_yaml_file(&self.config_path())?;
        let secrets_config = load_yaml_file(&self.secrets_path())?;
        let merged = deep_merge(&public_config, &secrets_config);

        let mut config: AppConfig = serde_json::from_value(merged)
            .map_err(|e| ApiError::BadRequest(format!("invalid configuration: {}", e)))?;
        apply_env_overrides(&mut config);

        validate_config(&config)?;
        Ok(config)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ApiError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(ApiError::internal)?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match serde_yaml::from_str::<Value>(&contents) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(_) => Err(ApiError::BadRequest(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
        Err(e) => Err(ApiError::BadRequest(format!(
            "failed to parse {}: {}",
            path.display(),
            e
        ))),
    }
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
        config.server.port = port;
    }

    if let Ok(host) = env::var("OLLAMA_HOST") {
        let host = host.trim();
        if !host.is_empty() {
            let url = normalize_ollama_host(host);
            if config.llm.provider == ProviderKind::Ollama {
                config.llm.base_url = url.clone();
            }
            if config.embedding.provider == ProviderKind::Ollama {
                config.embedding.base_url = url;
            }
        }
    }
}

fn normalize_ollama_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", host.trim_end_matches('/'))
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}
