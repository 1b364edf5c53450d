use crate::error::{ParserError, Result};
use serde::Deserialize;
use std::env;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub parser: ParseOptions,
    #[serde(default)]
    pub assembler: AssemblerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Switches for the block pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Split chart JSON out of text blocks
    pub detect_charts: bool,
    /// Emit chart blocks for chart-shaped tool output
    pub scan_tool_output: bool,
    /// Recognise the pre-rendered markdown/details format
    pub rendered_format: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            detect_charts: true,
            scan_tool_output: true,
            rendered_format: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    pub initial_capacity: usize,
    /// A reset shrinks the buffer back to `initial_capacity` above this size
    pub max_retained_capacity: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 8192,
            max_retained_capacity: 65536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(ParserError::ConfigError(format!(
                "Invalid boolean for {}: {}",
                key, other
            ))),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl ParserConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = ParserConfig::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;

        let mut config: ParserConfig = toml::from_str(&contents)
            .map_err(|e| ParserError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        // Allow environment variables to override file config
        config.apply_env()?;

        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_bool("PARSER_DETECT_CHARTS")? {
            self.parser.detect_charts = v;
        }
        if let Some(v) = env_bool("PARSER_SCAN_TOOL_OUTPUT")? {
            self.parser.scan_tool_output = v;
        }
        if let Some(v) = env_bool("PARSER_RENDERED_FORMAT")? {
            self.parser.rendered_format = v;
        }
        if let Ok(capacity) = env::var("PARSER_ASSEMBLER_CAPACITY") {
            self.assembler.initial_capacity = capacity.parse::<usize>().map_err(|e| {
                ParserError::ConfigError(format!("Invalid assembler capacity: {}", e))
            })?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.assembler.initial_capacity == 0 {
            return Err(ParserError::ConfigError(
                "Assembler initial capacity must be greater than 0".to_string(),
            ));
        }

        if self.assembler.max_retained_capacity < self.assembler.initial_capacity {
            return Err(ParserError::ConfigError(
                "Assembler retained capacity must not be below the initial capacity".to_string(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ParserError::ConfigError("Log filter is empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let valid_config = ParserConfig::default();
        assert!(valid_config.validate().is_ok());

        let mut invalid_config = ParserConfig::default();
        invalid_config.assembler.initial_capacity = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = ParserConfig::default();
        invalid_config.assembler.max_retained_capacity = 16;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: ParserConfig = toml::from_str(
            r#"
            [parser]
            detect_charts = false

            [assembler]
            initial_capacity = 1024
            "#,
        )
        .unwrap();

        assert!(!config.parser.detect_charts);
        assert!(config.parser.scan_tool_output);
        assert_eq!(config.assembler.initial_capacity, 1024);
        assert_eq!(config.assembler.max_retained_capacity, 65536);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_missing_file() {
        let err = ParserConfig::from_file("/nonexistent/parser.toml").unwrap_err();
        assert!(matches!(err, ParserError::IoError(_)));
        assert!(err.to_string().starts_with("IO error:"));
    }
}
