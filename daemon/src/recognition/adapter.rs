use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::recognizer::{
    ErrorClass, RecognizerError, RecognizerEvent, RecognizerSettings, SpeechRecognizer,
};
use crate::error::VoiceError;

/// Observable state of the capture session.
///
/// `is_active` follows the recognizer's own start/end events and may briefly
/// disagree with `continuous_mode_requested` while a restart is pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionSession {
    pub is_active: bool,
    pub continuous_mode_requested: bool,
    pub final_transcript: String,
    pub interim_transcript: String,
    pub last_error: Option<String>,
}

/// What the supervisor needs to react to after an event was absorbed.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterSignal {
    Started,
    Finalized(String),
    Fault { code: String, class: ErrorClass },
    Ended,
}

pub struct CaptureAdapter {
    recognizer: Box<dyn SpeechRecognizer>,
    settings: RecognizerSettings,
    session: RecognitionSession,
    transcript_clear_delay: Duration,
    transcript_clear_at: Option<Instant>,
}

impl CaptureAdapter {
    pub fn initialize(
        mut recognizer: Box<dyn SpeechRecognizer>,
        settings: RecognizerSettings,
        transcript_clear_delay: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RecognizerEvent>), VoiceError> {
        if !recognizer.is_supported() {
            warn!("No speech recognition capability available");
            return Err(VoiceError::UnsupportedPlatform);
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        recognizer.configure(&settings, events_tx);

        info!(
            "Capture adapter initialized: locale={}, continuous={}, interim_results={}",
            settings.locale, settings.continuous, settings.interim_results
        );

        Ok((
            Self {
                recognizer,
                settings,
                session: RecognitionSession::default(),
                transcript_clear_delay,
                transcript_clear_at: None,
            },
            events_rx,
        ))
    }

    pub fn session(&self) -> &RecognitionSession {
        &self.session
    }

    pub fn settings(&self) -> &RecognizerSettings {
        &self.settings
    }

    pub(crate) fn set_continuous(&mut self, requested: bool) {
        self.session.continuous_mode_requested = requested;
    }

    pub(crate) fn clear_error(&mut self) {
        self.session.last_error = None;
    }

    /// Requests capture. Starting an already running session is not an error.
    pub(crate) fn start(&mut self) -> Result<(), VoiceError> {
        match self.recognizer.start() {
            Ok(()) => {
                debug!("Recognizer start requested");
                Ok(())
            }
            Err(RecognizerError::AlreadyStarted) => {
                debug!("Recognizer already started, ignoring start request");
                Ok(())
            }
            Err(RecognizerError::StartFailed(reason)) => {
                warn!("Recognizer failed to start: {}", reason);
                self.session.last_error = Some(reason.clone());
                Err(VoiceError::RecognitionFault(reason))
            }
        }
    }

    pub(crate) fn stop(&mut self) {
        debug!("Recognizer stop requested");
        self.recognizer.stop();
    }

    pub(crate) fn abort(&mut self) {
        self.transcript_clear_at = None;
        self.recognizer.abort();
    }

    pub fn handle_event(&mut self, event: RecognizerEvent, now: Instant) -> Option<AdapterSignal> {
        match event {
            RecognizerEvent::Started => {
                self.session.is_active = true;
                self.session.last_error = None;
                Some(AdapterSignal::Started)
            }
            RecognizerEvent::Result {
                result_index,
                results,
            } => {
                let mut final_text = String::new();
                let mut interim = String::new();
                for result in results.iter().skip(result_index) {
                    if result.is_final {
                        final_text.push_str(&result.transcript);
                    } else {
                        interim.push_str(&result.transcript);
                    }
                }

                self.session.interim_transcript = interim;

                if final_text.trim().is_empty() {
                    return None;
                }

                info!("Final transcript: '{}'", final_text);
                self.session.final_transcript = final_text.clone();
                self.session.interim_transcript.clear();
                self.transcript_clear_at = Some(now + self.transcript_clear_delay);
                Some(AdapterSignal::Finalized(final_text))
            }
            RecognizerEvent::Error { code, message } => {
                let class = ErrorClass::from_code(&code);
                if class == ErrorClass::Benign {
                    debug!("Ignoring benign recognizer error: {}", code);
                    return None;
                }
                warn!(
                    "Recognizer error: {} ({})",
                    code,
                    message.as_deref().unwrap_or("no details")
                );
                self.session.last_error = Some(code.clone());
                Some(AdapterSignal::Fault { code, class })
            }
            RecognizerEvent::Ended => {
                self.session.is_active = false;
                Some(AdapterSignal::Ended)
            }
        }
    }

    pub fn reset_transcript(&mut self) {
        self.session.final_transcript.clear();
        self.session.interim_transcript.clear();
        self.transcript_clear_at = None;
    }

    pub fn poll_timers(&mut self, now: Instant) {
        if self.transcript_clear_at.is_some_and(|at| at <= now) {
            debug!("Clearing stale transcript");
            self.reset_transcript();
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.transcript_clear_at
    }
}
