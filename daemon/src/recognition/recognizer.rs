use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::RecognitionConfig;

/// Session configuration handed to the platform recognizer. Capture is always
/// continuous with interim results; only the locale comes from config.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerSettings {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

impl From<&RecognitionConfig> for RecognizerSettings {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechResult {
    pub transcript: String,
    pub is_final: bool,
}

impl SpeechResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_text(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerEvent {
    Started,
    Result {
        result_index: usize,
        results: Vec<SpeechResult>,
    },
    Error {
        code: String,
        message: Option<String>,
    },
    Ended,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    #[error("Recognition already started")]
    AlreadyStarted,

    #[error("Recognizer failed to start: {0}")]
    StartFailed(String),
}

/// How a recognizer error code affects the listening session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Silence timeouts and aborts that happen during normal continuous listening.
    Benign,
    /// Surfaced to the user; listening carries on.
    Fault,
    /// Surfaced and counted; repeated occurrences suspend listening.
    Fatal,
}

impl ErrorClass {
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" | "aborted" => ErrorClass::Benign,
            "not-allowed" | "service-not-allowed" | "audio-capture" => ErrorClass::Fatal,
            _ => ErrorClass::Fault,
        }
    }
}

/// Platform speech-to-text facility.
///
/// Implementations report everything asynchronously through the sender passed to
/// [`SpeechRecognizer::configure`]; `start`/`stop` only request a transition.
pub trait SpeechRecognizer: Send {
    fn is_supported(&self) -> bool;

    fn configure(
        &mut self,
        settings: &RecognizerSettings,
        events: mpsc::UnboundedSender<RecognizerEvent>,
    );

    fn start(&mut self) -> Result<(), RecognizerError>;

    fn stop(&mut self);

    fn abort(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(ErrorClass::from_code("no-speech"), ErrorClass::Benign);
        assert_eq!(ErrorClass::from_code("aborted"), ErrorClass::Benign);
        assert_eq!(ErrorClass::from_code("not-allowed"), ErrorClass::Fatal);
        assert_eq!(ErrorClass::from_code("audio-capture"), ErrorClass::Fatal);
        assert_eq!(ErrorClass::from_code("network"), ErrorClass::Fault);
        assert_eq!(ErrorClass::from_code("language-not-supported"), ErrorClass::Fault);
    }

    #[test]
    fn test_settings_from_config() {
        let config = RecognitionConfig {
            locale: "fr-FR".to_string(),
        };
        let settings = RecognizerSettings::from(&config);
        assert_eq!(settings.locale, "fr-FR");
        assert!(settings.continuous);
        assert!(settings.interim_results);
    }

    #[test]
    fn test_default_settings() {
        let settings = RecognizerSettings::default();
        assert_eq!(settings.locale, "en-US");
        assert!(settings.continuous);
        assert!(settings.interim_results);
    }
}
