use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub gutter: GutterConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,
}

/// Editor behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditorConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Point size
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Spaces inserted for Tab and per indent level
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    #[serde(default = "default_true")]
    pub auto_indent: bool,

    #[serde(default = "default_true")]
    pub bracket_matching: bool,

    #[serde(default = "default_true")]
    pub line_numbers: bool,

    /// A line whose trimmed text ends with one of these gets one extra indent
    /// level on the next line
    #[serde(default = "default_indent_triggers")]
    pub indent_triggers: Vec<String>,
}

fn default_font_family() -> String {
    "Cascadia Code".to_string()
}

fn default_font_size() -> u32 {
    10
}

fn default_tab_width() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_indent_triggers() -> Vec<String> {
    vec!["{".to_string(), ":".to_string()]
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            tab_width: default_tab_width(),
            auto_indent: true,
            bracket_matching: true,
            line_numbers: true,
            indent_triggers: default_indent_triggers(),
        }
    }
}

/// Line-number gutter geometry, in the host view's units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GutterConfig {
    /// Fixed width added to the digits
    #[serde(default = "default_base_margin")]
    pub base_margin: i32,

    /// Space between the numbers and the text
    #[serde(default = "default_right_padding")]
    pub right_padding: i32,
}

fn default_base_margin() -> i32 {
    20
}

fn default_right_padding() -> i32 {
    5
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            base_margin: default_base_margin(),
            right_padding: default_right_padding(),
        }
    }
}

/// Embedded terminal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TerminalConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Shell program used instead of `sh` (or `cmd` on Windows)
    #[serde(default)]
    pub shell: Option<String>,

    /// Print the greeting when a session starts
    #[serde(default = "default_true")]
    pub banner: bool,
}

fn default_history_capacity() -> usize {
    50
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            shell: None,
            banner: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.editor.tab_width == 0 {
            return Err(ConfigError::ValidationError(
                "tab_width must be greater than 0".to_string(),
            ));
        }

        if self.editor.tab_width > 16 {
            return Err(ConfigError::ValidationError(
                "tab_width must be <= 16".to_string(),
            ));
        }

        if self.editor.font_size == 0 {
            return Err(ConfigError::ValidationError(
                "font_size must be greater than 0".to_string(),
            ));
        }

        if self.editor.indent_triggers.iter().any(String::is_empty) {
            return Err(ConfigError::ValidationError(
                "indent_triggers cannot contain an empty string".to_string(),
            ));
        }

        if self.terminal.history_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "history_capacity must be greater than 0".to_string(),
            ));
        }

        if self.gutter.base_margin < 0 || self.gutter.right_padding < 0 {
            return Err(ConfigError::ValidationError(
                "gutter margins cannot be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> Result<String, ConfigError> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
