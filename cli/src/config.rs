//! Optional YAML configuration for the `protoflag` binary.
//!
//! Supplies defaults for flags that are tedious to repeat on every run.
//! Command-line flags always take precedence.
//!
//! # Example YAML
//!
//! ```yaml
//! schema: schemas/deploy.json
//! message: demo.v1.Deploy
//! inspect_format: table
//! parse_format: yaml
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::output::{OutputFormat, ValueFormat};

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = ".protoflag.yml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Schema file (JSON or YAML).
    pub schema: Option<PathBuf>,
    /// Fully qualified root message.
    pub message: Option<String>,
    pub inspect_format: Option<OutputFormat>,
    pub parse_format: Option<ValueFormat>,
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read config '{}': {err}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&raw)
            .map_err(|err| format!("Invalid config '{}': {err}", path.display()))?;

        // Relative schema paths are relative to the config file.
        let base = path.parent().unwrap_or(Path::new(""));
        config.schema = config.schema.map(|schema| {
            if schema.is_relative() {
                base.join(schema)
            } else {
                schema
            }
        });
        Ok(config)
    }

    /// Loads the explicit config, or [`DEFAULT_CONFIG_FILE`] when it exists,
    /// or falls back to an empty config.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the schema path from the flag or the config.
    pub fn schema_path(&self, flag: Option<PathBuf>) -> Result<PathBuf, String> {
        flag.or_else(|| self.schema.clone()).ok_or_else(|| {
            format!("No schema given: pass --schema or set `schema` in {DEFAULT_CONFIG_FILE}")
        })
    }

    /// Resolves the root message from the flag or the config.
    pub fn root_message(&self, flag: Option<String>) -> Result<String, String> {
        flag.or_else(|| self.message.clone()).ok_or_else(|| {
            format!("No message given: pass --message or set `message` in {DEFAULT_CONFIG_FILE}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_resolves_schema_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protoflag.yml");
        std::fs::write(
            &path,
            "schema: schemas/app.json\nmessage: demo.App\ninspect_format: markdown\n",
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.schema, Some(dir.path().join("schemas/app.json")));
        assert_eq!(config.message.as_deref(), Some("demo.App"));
        assert_eq!(config.inspect_format, Some(OutputFormat::Markdown));
        assert_eq!(config.parse_format, None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protoflag.yml");
        std::fs::write(&path, "shema: typo.json\n").unwrap();
        assert!(CliConfig::load(&path).unwrap_err().contains("Invalid config"));
    }

    #[test]
    fn test_flags_take_precedence() {
        let config = CliConfig {
            schema: Some(PathBuf::from("from-config.json")),
            message: None,
            ..Default::default()
        };
        assert_eq!(
            config.schema_path(Some(PathBuf::from("flag.json"))).unwrap(),
            PathBuf::from("flag.json")
        );
        assert_eq!(
            config.schema_path(None).unwrap(),
            PathBuf::from("from-config.json")
        );
        assert!(config.root_message(None).is_err());
    }
}
