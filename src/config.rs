//! Configuration for the form schema engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (form-schema.toml)
//! - Environment variables (FORM_SCHEMA_*)
//!
//! ## Example config file (form-schema.toml):
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:8001"
//! timeout_secs = 10
//!
//! [validation]
//! trigger = "submit"
//! server_side = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Admin API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Validation behavior
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Admin API endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base endpoint the schema routes hang off of
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// When and how form values are validated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Whether checkers run on submit or on field blur
    #[serde(default)]
    pub trigger: ValidationTrigger,

    /// Also run server-side schema validation on submit
    #[serde(default = "default_true")]
    pub server_side: bool,
}

/// Validation trigger mode; the engine itself is trigger-agnostic, this is
/// a knob for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationTrigger {
    #[default]
    Submit,
    Blur,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            trigger: ValidationTrigger::Submit,
            server_side: true,
        }
    }
}

impl FormConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "form-schema.toml",
            ".form-schema.toml",
            "config/form-schema.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "gateway", "form-schema") {
            let xdg_config = config_dir.config_dir().join("form-schema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (FORM_SCHEMA_*)
        builder = builder.add_source(
            Environment::with_prefix("FORM_SCHEMA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8001");
        assert_eq!(config.validation.trigger, ValidationTrigger::Submit);
        assert!(config.validation.server_side);
    }

    #[test]
    fn test_serialize_config() {
        let config = FormConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[validation]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form-schema.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://localhost:9001\"\n\n[validation]\ntrigger = \"blur\"\n",
        )
        .unwrap();

        let config = FormConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9001");
        assert_eq!(config.validation.trigger, ValidationTrigger::Blur);
        // Unspecified values fall back to defaults
        assert_eq!(config.api.timeout_secs, 10);
    }
}
