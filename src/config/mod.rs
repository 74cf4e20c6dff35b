/**
 * Application configuration, using hierarchical configuration
 * https://docs.rs/config/latest/config/
 *
 * 1. First applog.yaml is read
 * 2. Then applog.{environment}.yaml is read
 * 3. Then applog.local.yaml is read (this is normally used for dev and not checked in git)
 * 4. Then the file given on the command line, if any
 * 5. Finally, environment variables are read (APPLOG_GENERAL__LOG__SCREEN_LEVEL=warn)
 */
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

mod run_mode;

pub use run_mode::RunMode;

/// Environment variable selecting the run mode.
pub const ENVIRONMENT_VAR: &str = "APPLOG_ENVIRONMENT";

/**
 * Represents the resolved application configuration.
 *
 * Fields:
 * - `environment`: The run mode (development, staging or production).
 * - `general`: Settings shared by every part of the application.
 */
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub environment: RunMode,
    #[serde(default)]
    pub general: General,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct General {
    #[serde(default)]
    pub log: LogSettings,
}

/**
 * The `general.log` section consumed by the log facility.
 *
 * Levels stay raw strings here: they are parsed when the facility is
 * initialized so that a bad value is reported there and replaced by the
 * level's default instead of failing the whole configuration.
 *
 * Fields:
 * - `screen_level`: Minimum level written to stdout (default: info, debug in development).
 * - `file_path`: Log file to append to. Empty disables the file destination.
 * - `file_level`: Minimum level written to the file (default: debug).
 * - `independent_levels`: Filter each destination with its own level instead of one shared threshold.
 * - `async_output`: Write records from a background thread.
 */
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogSettings {
    pub screen_level: String,
    pub file_path: String,
    pub file_level: String,
    pub independent_levels: bool,
    pub async_output: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            screen_level: "info".to_string(),
            file_path: String::new(),
            file_level: "debug".to_string(),
            independent_levels: false,
            async_output: false,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /**
     * Loads the layered configuration.
     *
     * @param config_file An extra, required configuration file read after the
     *                    applog.*.yaml files and before the environment.
     * @return The resolved settings, or the first source that failed.
     */
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let run_mode: RunMode = env::var(ENVIRONMENT_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let mut builder = Config::builder()
            // default config file
            .add_source(File::with_name("applog.yaml").required(false))
            // environment-based config file
            .add_source(File::with_name(&format!("applog.{}.yaml", run_mode.as_str())).required(false))
            // local config file (don't check this into source control)
            .add_source(File::with_name("applog.local.yaml").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let s = builder
            .add_source(
                Environment::with_prefix("APPLOG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("environment", run_mode.as_str())?
            .set_default("general.log.screen_level", run_mode.default_screen_level())?
            .set_default("general.log.file_path", "")?
            .set_default("general.log.file_level", "debug")?
            .set_default("general.log.independent_levels", false)?
            .set_default("general.log.async_output", false)?
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use std::fs;

    use super::*;

    fn set_env_var(key: &str, value: &str) {
        env::set_var(key, value);
    }

    fn reset_env_var() {
        let v = env::vars().collect::<Vec<(String, String)>>();
        for (name, _) in v {
            if name.starts_with("APPLOG_") {
                env::remove_var(name);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        reset_env_var();
        let settings = Settings::new().expect("Deserialization failed");
        assert_eq!(settings.environment, RunMode::Production);
        assert_eq!(settings.general.log, LogSettings::default());
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_development_defaults_to_debug() {
        reset_env_var();
        set_env_var("APPLOG_ENVIRONMENT", "dev");
        let settings = Settings::new().expect("Deserialization failed");
        assert_eq!(settings.environment, RunMode::Development);
        assert_eq!(settings.general.log.screen_level, "debug");
        assert_eq!(settings.general.log.file_level, "debug");
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_staging_defaults_to_info() {
        reset_env_var();
        set_env_var("APPLOG_ENVIRONMENT", "staging");
        let settings = Settings::new().expect("Deserialization failed");
        assert_eq!(settings.environment, RunMode::Staging);
        assert_eq!(settings.general.log.screen_level, "info");
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_environment_garbage() {
        reset_env_var();
        set_env_var("APPLOG_ENVIRONMENT", "garbage");
        let settings = Settings::new().expect("Deserialization failed");
        assert_eq!(settings.environment, RunMode::Production);
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_log_section_from_environment() {
        reset_env_var();
        set_env_var("APPLOG_GENERAL__LOG__SCREEN_LEVEL", "warn");
        set_env_var("APPLOG_GENERAL__LOG__FILE_PATH", "/tmp/applog/app.log");
        set_env_var("APPLOG_GENERAL__LOG__FILE_LEVEL", "Error");
        let settings = Settings::new().expect("Deserialization failed");
        let log = settings.general.log;
        assert_eq!(log.screen_level, "warn");
        assert_eq!(log.file_path, "/tmp/applog/app.log");
        assert_eq!(log.file_level, "Error");
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_garbage_level_is_kept_raw() {
        reset_env_var();
        set_env_var("APPLOG_GENERAL__LOG__SCREEN_LEVEL", "garbage");
        let settings = Settings::new().expect("Deserialization failed");
        assert_eq!(settings.general.log.screen_level, "garbage");
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_flags_from_environment() {
        reset_env_var();
        set_env_var("APPLOG_GENERAL__LOG__INDEPENDENT_LEVELS", "true");
        set_env_var("APPLOG_GENERAL__LOG__ASYNC_OUTPUT", "1");
        let settings = Settings::new().expect("Deserialization failed");
        assert!(settings.general.log.independent_levels);
        assert!(settings.general.log.async_output);

        set_env_var("APPLOG_GENERAL__LOG__ASYNC_OUTPUT", "0");
        let settings = Settings::new().expect("Deserialization failed");
        assert!(!settings.general.log.async_output);
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_explicit_file_is_overridden_by_environment() {
        reset_env_var();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom.yaml");
        fs::write(
            &path,
            "general:\n  log:\n    screen_level: error\n    file_path: /var/log/app.log\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).expect("Deserialization failed");
        assert_eq!(settings.general.log.screen_level, "error");
        assert_eq!(settings.general.log.file_path, "/var/log/app.log");
        assert_eq!(settings.general.log.file_level, "debug");

        set_env_var("APPLOG_GENERAL__LOG__SCREEN_LEVEL", "debug");
        let settings = Settings::load(Some(&path)).expect("Deserialization failed");
        assert_eq!(settings.general.log.screen_level, "debug");
        reset_env_var();
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        reset_env_var();
        let tmp = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&tmp.path().join("missing.yaml"))).is_err());
        reset_env_var();
    }
}
