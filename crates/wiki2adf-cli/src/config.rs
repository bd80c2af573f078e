//! Configuration file support for wiki2adf CLI
//!
//! Loads settings from `_wiki2adf.toml` configuration file.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_wiki2adf.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/wiki2adf/wiki2adf/main/crates/wiki2adf-cli/schema/wiki2adf.schema.json";

pub const DEFAULT_SUFFIX: &str = "-adf";
pub const DEFAULT_EXTENSION: &str = "json";
pub const DEFAULT_INPUT_EXTENSIONS: &[&str] = &["txt", "wiki"];

/// Root configuration structure
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Output file configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Input file selection
    #[serde(skip_serializing_if = "InputConfig::is_empty")]
    pub input: InputConfig,
    /// Diagnostics reporting configuration
    #[serde(skip_serializing_if = "DiagnosticsConfig::is_empty")]
    pub diagnostics: DiagnosticsConfig,
}

/// Output file configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the JSON output (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
    /// Suffix appended to the input file stem (default: "-adf")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Output file extension without the dot (default: "json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.pretty.is_none() && self.suffix.is_none() && self.extension.is_none()
    }
}

/// Input file selection
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct InputConfig {
    /// File extensions converted in directory mode (default: ["txt", "wiki"])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl InputConfig {
    fn is_empty(&self) -> bool {
        self.extensions.is_none()
    }
}

/// Diagnostics reporting configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Write `<stem><suffix>-errors.json` next to each output (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<bool>,
    /// Exit with a non-zero status when any diagnostic is recorded (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl DiagnosticsConfig {
    fn is_empty(&self) -> bool {
        self.error_log.is_none() && self.strict.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_wiki2adf.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out
    pub fn sample() -> Self {
        Config {
            output: OutputConfig {
                pretty: Some(true),
                suffix: Some(DEFAULT_SUFFIX.to_string()),
                extension: Some(DEFAULT_EXTENSION.to_string()),
            },
            input: InputConfig {
                extensions: Some(
                    DEFAULT_INPUT_EXTENSIONS
                        .iter()
                        .map(|ext| ext.to_string())
                        .collect(),
                ),
            },
            diagnostics: DiagnosticsConfig {
                error_log: Some(false),
                strict: Some(false),
            },
        }
    }

    pub fn pretty(&self) -> bool {
        self.output.pretty.unwrap_or(true)
    }

    pub fn suffix(&self) -> &str {
        self.output.suffix.as_deref().unwrap_or(DEFAULT_SUFFIX)
    }

    pub fn extension(&self) -> &str {
        self.output.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// Whether `ext` is one of the configured input extensions
    pub fn accepts_extension(&self, ext: &str) -> bool {
        match &self.input.extensions {
            Some(extensions) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => DEFAULT_INPUT_EXTENSIONS
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext)),
        }
    }

    pub fn error_log(&self) -> bool {
        self.diagnostics.error_log.unwrap_or(false)
    }

    pub fn strict(&self) -> bool {
        self.diagnostics.strict.unwrap_or(false)
    }
}
