// Validation message configuration

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::{env, fs};
use thiserror::Error;

/// Environment variable naming a TOML or JSON message file
pub const CONFIG_ENV_VAR: &str = "TRELLIS_VALIDATION_CONFIG";

static DEFAULT: Lazy<Arc<ValidationConfig>> = Lazy::new(|| Arc::new(ValidationConfig::default()));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read validation config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse validation config: {0}")]
    Parse(String),

    #[error("Unsupported validation config format: {0}")]
    UnsupportedFormat(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),

    #[error("Failed to load .env file: {0}")]
    Dotenv(String),
}

/// Message catalog shared by validators.
///
/// Mirrors a language file:
///
/// ```toml
/// [messages]
/// required = "Please fill in :attribute."
///
/// [custom]
/// "email.email" = "That does not look like an email address."
///
/// [attributes]
/// email = "email address"
/// ```
///
/// `messages` replaces a rule's default template, `custom` targets one
/// `attribute.rule` pair, `attributes` supplies fallback display labels.
/// All three are templates: `:attribute` and rule placeholders are
/// substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub messages: BTreeMap<String, String>,
    pub custom: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty configuration
    pub fn shared_default() -> Arc<ValidationConfig> {
        Arc::clone(&DEFAULT)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e)))
    }

    /// Load from a file, picking the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loading validation messages");

        match ext.as_str() {
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Load the file named by `TRELLIS_VALIDATION_CONFIG`, reading `.env`
    /// first. Without the variable the default configuration is returned.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
        Self::from_env_var(CONFIG_ENV_VAR)
    }

    /// Like [`from_env`](Self::from_env) with an explicit `.env` file, which must exist
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref()).map_err(|e| ConfigError::Dotenv(e.to_string()))?;
        Self::from_env_var(CONFIG_ENV_VAR)
    }

    /// Same as [`from_env`](Self::from_env) for an arbitrary variable name
    pub fn from_env_var(key: &str) -> Result<Self, ConfigError> {
        match env::var(key) {
            Ok(path) => Self::from_file(path),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }

    pub fn with_message(mut self, rule: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(rule.into(), template.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.custom.insert(key.into(), template.into());
        self
    }

    pub fn with_attribute(
        mut self,
        attribute: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.attributes.insert(attribute.into(), label.into());
        self
    }

    /// Template for a failed rule: `custom` first, then `messages`
    pub fn template(&self, attribute: &str, rule: &str) -> Option<&str> {
        self.custom
            .get(&format!("{}.{}", attribute, rule))
            .or_else(|| self.messages.get(rule))
            .map(String::as_str)
    }

    pub fn label(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config = ValidationConfig::from_toml_str(
            r#"
            [messages]
            required = "Please fill in :attribute."

            [custom]
            "email.email" = "Bad email."

            [attributes]
            email = "email address"
            "#,
        )
        .unwrap();

        assert_eq!(config.template("name", "required"), Some("Please fill in :attribute."));
        assert_eq!(config.template("email", "email"), Some("Bad email."));
        assert_eq!(config.template("name", "email"), None);
        assert_eq!(config.label("email"), Some("email address"));
    }

    #[test]
    fn test_parse_json_with_missing_sections() {
        let config = ValidationConfig::from_json_str(r#"{"attributes": {"dob": "date of birth"}}"#)
            .unwrap();
        assert!(config.messages.is_empty());
        assert_eq!(config.label("dob"), Some("date of birth"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ValidationConfig::from_toml_str("messages = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = env::temp_dir();
        let path = dir.join(format!("trellis-validation-{}.toml", std::process::id()));
        fs::write(&path, "[messages]\nemail = \"Nope.\"\n").unwrap();

        let config = ValidationConfig::from_file(&path).unwrap();
        assert_eq!(config.template("x", "email"), Some("Nope."));
        fs::remove_file(&path).unwrap();

        let unsupported = dir.join("trellis-validation.yaml");
        fs::write(&unsupported, "messages: {}").unwrap();
        assert!(matches!(
            ValidationConfig::from_file(&unsupported),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
        fs::remove_file(&unsupported).unwrap();
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ValidationConfig::from_file("/nonexistent/trellis/messages.toml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_env_file_names_config() {
        let dir = env::temp_dir();
        let messages = dir.join(format!("trellis-env-messages-{}.json", std::process::id()));
        fs::write(&messages, r#"{"messages": {"required": "Fill in :attribute."}}"#).unwrap();
        let dotenv = dir.join(format!("trellis-{}.env", std::process::id()));
        fs::write(&dotenv, format!("{}='{}'\n", CONFIG_ENV_VAR, messages.display())).unwrap();

        let config = ValidationConfig::from_env_file(&dotenv).unwrap();
        assert_eq!(config.template("name", "required"), Some("Fill in :attribute."));

        // The variable is now set for the process
        assert_eq!(ValidationConfig::from_env().unwrap(), config);

        fs::remove_file(&dotenv).unwrap();
        fs::remove_file(&messages).unwrap();

        assert!(matches!(
            ValidationConfig::from_env_file(dir.join("trellis-missing.env")),
            Err(ConfigError::Dotenv(_))
        ));
    }

    #[test]
    fn test_env_var_absent_gives_default() {
        let config = ValidationConfig::from_env_var("TRELLIS_TEST_UNSET_VAR_48213").unwrap();
        assert_eq!(config, ValidationConfig::default());
    }
}
