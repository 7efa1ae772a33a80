use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use super::defaults::{default_config, EnvKind, ENV_OVERRIDES};
use super::paths::AppPaths;
use super::settings::Settings;
use super::validation::validate_settings;
use crate::core::errors::ConfigError;

/// Builds [`Settings`] from defaults, an optional YAML file and the environment,
/// in that order of precedence (later wins).
#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("SURVEY_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        self.paths.project_root.join("config.yml")
    }

    /// Loads settings using the process environment.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        self.load_settings_with(&self.config_path(), |key| env::var(key).ok())
    }

    /// Loads settings from `config_path` with a caller-supplied environment lookup.
    pub fn load_settings_with<F>(&self, config_path: &Path, lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_config = load_yaml_file(config_path)?;
        let mut merged = deep_merge(&default_config(), &file_config);
        apply_env_overrides(&mut merged, lookup)?;

        let mut settings: Settings =
            serde_json::from_value(merged).map_err(ConfigError::Shape)?;
        settings.corpus.source_file = self.paths.resolve(&settings.corpus.source_file);
        settings.corpus.index_dir = self.paths.resolve(&settings.corpus.index_dir);

        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let value = serde_yaml::from_str::<Value>(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    match value {
        Value::Object(_) => Ok(value),
        _ => Ok(Value::Object(Map::new())),
    }
}

fn apply_env_overrides<F>(config: &mut Value, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, path, kind) in ENV_OVERRIDES.iter() {
        let Some(raw) = lookup(var) else {
            continue;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value = parse_env_value(var, trimmed, *kind)?;
        ensure_object_path(config, path, value);
    }
    Ok(())
}

fn parse_env_value(var: &'static str, raw: &str, kind: EnvKind) -> Result<Value, ConfigError> {
    let invalid = |expected: &'static str| ConfigError::InvalidEnv {
        var,
        value: raw.to_string(),
        expected,
    };

    match kind {
        EnvKind::Str => Ok(Value::String(raw.to_string())),
        EnvKind::Uint => raw
            .parse::<u64>()
            .map(|v| Value::Number(v.into()))
            .map_err(|_| invalid("unsigned integer")),
        EnvKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid("number")),
        EnvKind::Bool => Ok(Value::Bool(
            raw.eq_ignore_ascii_case("true") || raw == "1",
        )),
        EnvKind::List => Ok(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        )),
    }
}

fn ensure_object_path(config: &mut Value, path: &[&str], value: Value) {
    if path.is_empty() {
        return;
    }

    let mut current = config;
    for (index, key) in path.iter().enumerate() {
        if index == path.len() - 1 {
            if let Some(map) = current.as_object_mut() {
                map.insert(key.to_string(), value);
            }
            return;
        }

        if !current.get(*key).map(|v| v.is_object()).unwrap_or(false) {
            let Some(map) = current.as_object_mut() else {
                return;
            };
            map.insert((*key).to_string(), Value::Object(Map::new()));
        }

        let Some(next) = current.get_mut(*key) else {
            return;
        };
        current = next;
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn service(root: &Path) -> ConfigService {
        ConfigService::new(Arc::new(AppPaths::with_root(root.to_path_buf())))
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = service(tmp.path())
            .load_settings_with(&tmp.path().join("config.yml"), env_of(&[]))
            .unwrap();

        assert_eq!(settings.server.port, 5001);
        assert!(!settings.server.debug);
        assert_eq!(settings.corpus.chunk_size, 500);
        assert_eq!(settings.corpus.chunk_overlap, 50);
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(settings.llm.max_tokens, 4000);
        assert_eq!(settings.generation.max_questions, 12);
        assert!(settings.llm.api_key.is_none());
        assert_eq!(settings.corpus.index_dir, tmp.path().join("vector_index"));
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
    }

    #[test]
    fn env_overrides_file_and_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.yml");
        fs::write(
            &config_path,
            "server:\n  port: 8080\nretrieval:\n  top_k: 5\nllm:\n  model: from-file\n",
        )
        .unwrap();

        let settings = service(tmp.path())
            .load_settings_with(
                &config_path,
                env_of(&[
                    ("PORT", "9000"),
                    ("DEBUG", "True"),
                    ("CORS_ORIGINS", "http://a.test, http://b.test,"),
                    ("TEMPERATURE", "0.2"),
                    ("OPENAI_API_KEY", "sk-test"),
                ]),
            )
            .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert!(settings.server.debug);
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.llm.model, "from-file");
        assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
        assert!((settings.llm.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn unparsable_env_value_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = service(tmp.path())
            .load_settings_with(&tmp.path().join("config.yml"), env_of(&[("PORT", "eighty")]))
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let tmp = tempfile::tempdir().unwrap();
        let err = service(tmp.path())
            .load_settings_with(
                &tmp.path().join("config.yml"),
                env_of(&[("CHUNK_SIZE", "50"), ("CHUNK_OVERLAP", "50")]),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "corpus.chunk_overlap",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_never_contains_api_key() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = service(tmp.path())
            .load_settings_with(
                &tmp.path().join("config.yml"),
                env_of(&[("OPENAI_API_KEY", "sk-very-secret")]),
            )
            .unwrap();

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-very-secret"));
    }
}
