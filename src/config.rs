use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Database file used when neither the config file nor the environment
/// names one.
pub const DEFAULT_DATABASE_PATH: &str = "finance.db";

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_report_dir() -> String {
    ".".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Directory the plain-text report is written into; the file name
    /// itself is fixed.
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            report_dir: default_report_dir(),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {path_ref:?}: {e}")))?;
    let app_config: AppConfig = toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {path_ref:?}: {e}"
        ))
    })?;
    Ok(app_config)
}

/// Resolves the application configuration for a desktop launch.
///
/// `.env` is loaded first (non-fatal if absent), then `FINTRACK_CONFIG`
/// names an explicit TOML file, then `fintrack.toml` in the working
/// directory, and finally built-in defaults. `FINTRACK_DATABASE_PATH`
/// overrides the database path from any source.
pub fn load_app_configuration() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = if let Ok(path) = std::env::var("FINTRACK_CONFIG") {
        load_config(path)?
    } else if Path::new("fintrack.toml").exists() {
        load_config("fintrack.toml")?
    } else {
        tracing::debug!("No config file found; using defaults");
        AppConfig::default()
    };

    if let Ok(db_path) = std::env::var("FINTRACK_DATABASE_PATH") {
        config.database_path = db_path;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fintrack.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "database_path = \"data/ledger.db\"").unwrap();
        writeln!(file, "report_dir = \"reports\"").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.database_path, "data/ledger.db");
        assert_eq!(config.report_dir, "reports");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fintrack.toml");
        fs::write(&path, "").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.report_dir, ".");
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = load_config("no/such/fintrack.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
