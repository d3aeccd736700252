use crate::error::{EventPrintError, Result};
use crate::logic::EmissionFactorTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub factors: EmissionFactorTable,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Decimal places shown for kilograms and kilometres.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_precision() -> usize {
    2
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: default_precision(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Loads the config from `config_override`, or from the first standard location
    /// that exists. Falls back to defaults when nothing is found; an explicit path
    /// that does not exist is an error.
    pub fn load(config_override: Option<&Path>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(EventPrintError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p.to_path_buf()
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::debug!("No config file found, using built-in emission factors");
                    return Ok(Self::default());
                }
            },
        };

        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| EventPrintError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_yaml(&config_str)?;
        tracing::info!(
            path = %path.display(),
            factors = %config.factors.version,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| EventPrintError::Config(format!("Failed to parse config: {}", e)))?;

        config.factors.validate()?;
        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("eventprint").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/eventprint/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventPrintError::Config("Cannot determine config directory".into()))?
            .join("eventprint");
        Ok(config_dir.join("config.yaml"))
    }

    /// Writes the built-in configuration to `path`, refusing to overwrite unless `force`.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(EventPrintError::Config(format!(
                "{} already exists; pass --force to overwrite",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&Config::default())
            .map_err(|e| EventPrintError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# EventPrint Configuration\n# Generated by `eventprint init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(path, content)?;

        tracing::info!(path = %path.display(), "Wrote default configuration");
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| EventPrintError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}
