use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::InteractionMode;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub listening: ListeningConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RecognitionConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ListeningConfig {
    #[serde(default)]
    pub default_mode: InteractionMode,
    #[serde(default = "default_startup_delay")]
    pub startup_delay_ms: u64,
    #[serde(default = "default_restart_delay")]
    pub restart_delay_ms: u64,
    #[serde(default = "default_restart_backoff")]
    pub restart_backoff_ms: u64,
    #[serde(default = "default_restarts_per_second")]
    pub restarts_per_second: u32,
    #[serde(default = "default_restart_burst")]
    pub restart_burst: u32,
    #[serde(default = "default_max_fatal_errors")]
    pub max_fatal_errors: u32,
}

impl Default for ListeningConfig {
    fn default() -> Self {
        Self {
            default_mode: InteractionMode::VoiceTouch,
            startup_delay_ms: default_startup_delay(),
            restart_delay_ms: default_restart_delay(),
            restart_backoff_ms: default_restart_backoff(),
            restarts_per_second: default_restarts_per_second(),
            restart_burst: default_restart_burst(),
            max_fatal_errors: default_max_fatal_errors(),
        }
    }
}

impl ListeningConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn restart_backoff(&self) -> Duration {
        Duration::from_millis(self.restart_backoff_ms)
    }
}

fn default_startup_delay() -> u64 {
    500
}
fn default_restart_delay() -> u64 {
    100
}
fn default_restart_backoff() -> u64 {
    1000
}
fn default_restarts_per_second() -> u32 {
    5
}
fn default_restart_burst() -> u32 {
    10
}
fn default_max_fatal_errors() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeedbackConfig {
    #[serde(default = "default_transcript_clear")]
    pub transcript_clear_ms: u64,
    #[serde(default = "default_match_clear")]
    pub match_clear_ms: u64,
    #[serde(default = "default_true")]
    pub auto_execute: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            transcript_clear_ms: default_transcript_clear(),
            match_clear_ms: default_match_clear(),
            auto_execute: true,
        }
    }
}

impl FeedbackConfig {
    pub fn transcript_clear(&self) -> Duration {
        Duration::from_millis(self.transcript_clear_ms)
    }

    pub fn match_clear(&self) -> Duration {
        Duration::from_millis(self.match_clear_ms)
    }
}

fn default_transcript_clear() -> u64 {
    3000
}
fn default_match_clear() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AssistantConfig {
    #[serde(default = "default_thinking_delay")]
    pub thinking_delay_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: default_thinking_delay(),
        }
    }
}

impl AssistantConfig {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

fn default_thinking_delay() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path
            .clone()
            .unwrap_or_else(shared::ipc::default_socket_path)
    }
}

pub fn load_config() -> Result<Config> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => {
            tracing::warn!("No config directory available, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        tracing::info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(Config::default());
    }

    tracing::info!("Loading config from {:?}", config_path);
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

    tracing::info!("Config loaded successfully");
    Ok(config)
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cashier").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.recognition.locale, "en-US");

        assert_eq!(config.listening.default_mode, InteractionMode::VoiceTouch);
        assert_eq!(config.listening.startup_delay_ms, 500);
        assert_eq!(config.listening.restart_delay_ms, 100);
        assert_eq!(config.listening.restart_backoff_ms, 1000);
        assert_eq!(config.listening.restarts_per_second, 5);
        assert_eq!(config.listening.restart_burst, 10);
        assert_eq!(config.listening.max_fatal_errors, 3);

        assert_eq!(config.feedback.transcript_clear_ms, 3000);
        assert_eq!(config.feedback.match_clear_ms, 2000);
        assert!(config.feedback.auto_execute);

        assert_eq!(config.assistant.thinking_delay_ms, 1000);
        assert!(config.server.socket_path.is_none());
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config::default();
        assert_eq!(config.listening.restart_delay(), Duration::from_millis(100));
        assert_eq!(config.listening.startup_delay(), Duration::from_millis(500));
        assert_eq!(config.feedback.transcript_clear(), Duration::from_secs(3));
        assert_eq!(config.feedback.match_clear(), Duration::from_secs(2));
        assert_eq!(config.assistant.thinking_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains("[recognition]"));
        assert!(toml_str.contains("[listening]"));
        assert!(toml_str.contains("[feedback]"));
        assert!(toml_str.contains("[assistant]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_recognition_mode_is_not_configurable() {
        let config: Config = toml::from_str(
            r#"
            [recognition]
            locale = "de-DE"
            continuous = false
            interim_results = false
        "#,
        )
        .unwrap();

        let settings = crate::recognition::RecognizerSettings::from(&config.recognition);
        assert_eq!(settings.locale, "de-DE");
        assert!(settings.continuous);
        assert!(settings.interim_results);
    }

    #[test]
    fn test_config_with_custom_values() {
        let toml_str = r#"
            [recognition]
            locale = "en-GB"

            [listening]
            default_mode = "touch"
            restart_delay_ms = 250

            [feedback]
            auto_execute = false

            [assistant]
            thinking_delay_ms = 0

            [server]
            socket_path = "/run/kiosk/cashierd.sock"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.recognition.locale, "en-GB");
        assert_eq!(config.listening.default_mode, InteractionMode::Touch);
        assert_eq!(config.listening.restart_delay_ms, 250);
        assert_eq!(config.listening.startup_delay_ms, 500);
        assert!(!config.feedback.auto_execute);
        assert_eq!(config.feedback.transcript_clear_ms, 3000);
        assert_eq!(config.assistant.thinking_delay_ms, 0);
        assert_eq!(
            config.server.socket_path(),
            PathBuf::from("/run/kiosk/cashierd.sock")
        );
    }

    #[test]
    fn test_config_with_missing_sections_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_with_invalid_types() {
        let toml_str = r#"
            [listening]
            restart_delay_ms = "soon"
        "#;
        let result: Result<Config, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_with_invalid_mode() {
        let toml_str = r#"
            [listening]
            default_mode = "telepathy"
        "#;
        let result: Result<Config, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feedback]\nmatch_clear_ms = 1500").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.feedback.match_clear_ms, 1500);
        assert_eq!(config.feedback.transcript_clear_ms, 3000);
    }

    #[test]
    fn test_load_config_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml content [unclosed").unwrap();

        let result = load_config_from(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }
}
