//! Configuration loading and parsing

use anyhow::{Context, Result};
use log::LevelFilter;
use osml_decoder::CheckConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from osml.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level when neither `-v` nor `-q` is given
    pub level: Option<LevelFilter>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [check]
            output_dir = "cleaned"
            overwrite = true
            data_prefix = "DATA"

            [logging]
            level = "debug"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.check.output_dir, PathBuf::from("cleaned"));
        assert!(config.check.overwrite);
        assert!(!config.check.write_report);
        assert_eq!(config.check.report_name, "report.json");
        assert_eq!(config.logging.level, Some(LevelFilter::Debug));
    }

    #[test]
    fn test_log_level_names() {
        for (name, level) in [("off", LevelFilter::Off), ("WARN", LevelFilter::Warn)] {
            let config: AppConfig =
                toml::from_str(&format!("[logging]\nlevel = \"{}\"", name)).unwrap();
            assert_eq!(config.logging.level, Some(level));
        }
        assert!(toml::from_str::<AppConfig>("[logging]\nlevel = \"loud\"").is_err());
    }

    #[test]
    fn test_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.check, CheckConfig::default());
        assert!(config.logging.level.is_none());
    }
}
