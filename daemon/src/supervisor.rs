//! Continuous listening supervisor.
//!
//! Owns the capture adapter and is the only caller of its start/stop. Keeps the
//! recognizer alive while voice mode is requested: restarts after natural
//! termination, delays the first start on mount, and suspends after repeated
//! fatal faults until [`ListeningSupervisor::retry`] is called.

use shared::{InteractionMode, ListeningState};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::VoiceError;
use crate::rate_limit::RestartLimiter;
use crate::recognition::{
    AdapterSignal, CaptureAdapter, ErrorClass, RecognitionSession, RecognizerEvent,
    RecognizerSettings, SpeechRecognizer,
};

pub struct ListeningSupervisor {
    adapter: Option<CaptureAdapter>,
    mode: InteractionMode,
    state: ListeningState,
    startup_at: Option<Instant>,
    restart_at: Option<Instant>,
    restart_delay: Duration,
    restart_backoff: Duration,
    limiter: RestartLimiter,
    fatal_errors: u32,
    max_fatal_errors: u32,
}

impl ListeningSupervisor {
    /// Builds the supervisor and initializes the adapter. The event receiver is
    /// `None` when the platform has no speech capability.
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        config: &Config,
        now: Instant,
    ) -> (Self, Option<mpsc::UnboundedReceiver<RecognizerEvent>>) {
        let settings = RecognizerSettings::from(&config.recognition);
        let (adapter, events) =
            match CaptureAdapter::initialize(recognizer, settings, config.feedback.transcript_clear())
            {
                Ok((adapter, events)) => (Some(adapter), Some(events)),
                Err(e) => {
                    warn!("Voice commands unavailable: {}", e);
                    (None, None)
                }
            };

        let listening = &config.listening;
        let mut supervisor = Self {
            adapter,
            mode: InteractionMode::Touch,
            state: ListeningState::Disabled,
            startup_at: None,
            restart_at: None,
            restart_delay: listening.restart_delay(),
            restart_backoff: listening.restart_backoff(),
            limiter: RestartLimiter::new(
                listening.restarts_per_second,
                listening.restart_burst,
                now,
            ),
            fatal_errors: 0,
            max_fatal_errors: listening.max_fatal_errors.max(1),
        };

        if listening.default_mode.is_voice() {
            if let Some(adapter) = supervisor.adapter.as_mut() {
                adapter.set_continuous(true);
                supervisor.mode = InteractionMode::VoiceTouch;
                supervisor.state = ListeningState::Starting;
                supervisor.startup_at = Some(now + listening.startup_delay());
                info!(
                    "Voice mode enabled by default, first start in {:?}",
                    listening.startup_delay()
                );
            }
        }

        (supervisor, events)
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_supported(&self) -> bool {
        self.adapter.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.session().is_some_and(|s| s.is_active)
    }

    pub fn session(&self) -> Option<&RecognitionSession> {
        self.adapter.as_ref().map(CaptureAdapter::session)
    }

    pub fn locale(&self) -> Option<&str> {
        self.adapter.as_ref().map(|a| a.settings().locale.as_str())
    }

    pub fn set_mode(&mut self, mode: InteractionMode) -> Result<(), VoiceError> {
        match mode {
            InteractionMode::VoiceTouch => {
                if self.adapter.is_none() {
                    warn!("Rejecting voice mode: speech recognition unsupported");
                    return Err(VoiceError::UnsupportedPlatform);
                }
                info!("Interaction mode: voice-touch");
                self.mode = InteractionMode::VoiceTouch;
                self.enter_starting();
            }
            InteractionMode::Touch => {
                info!("Interaction mode: touch");
                self.mode = InteractionMode::Touch;
                self.disable();
            }
        }
        Ok(())
    }

    /// Manual re-entry into the starting state, e.g. after suspension.
    pub fn retry(&mut self) -> Result<(), VoiceError> {
        if self.adapter.is_none() {
            return Err(VoiceError::UnsupportedPlatform);
        }
        if !self.mode.is_voice() {
            return Err(VoiceError::VoiceModeDisabled);
        }
        info!("Retrying voice listening");
        self.enter_starting();
        Ok(())
    }

    fn enter_starting(&mut self) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };

        self.fatal_errors = 0;
        self.startup_at = None;
        self.restart_at = None;
        adapter.set_continuous(true);
        adapter.clear_error();

        if adapter.session().is_active {
            self.state = ListeningState::Listening;
            return;
        }

        self.state = ListeningState::Starting;
        if let Err(e) = adapter.start() {
            warn!("Voice listening failed to start: {}", e);
        }
    }

    fn disable(&mut self) {
        self.startup_at = None;
        self.restart_at = None;
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.set_continuous(false);
            adapter.stop();
        }
        self.state = ListeningState::Disabled;
    }

    /// Absorbs one recognizer event. Returns a finalized transcript that should
    /// be matched against the command registry.
    pub fn handle_event(&mut self, event: RecognizerEvent, now: Instant) -> Option<String> {
        let adapter = self.adapter.as_mut()?;
        let signal = adapter.handle_event(event, now)?;
        let requested = adapter.session().continuous_mode_requested;

        match signal {
            AdapterSignal::Started => {
                if requested {
                    debug!("Recognizer running");
                    self.state = ListeningState::Listening;
                } else {
                    debug!("Recognizer started after voice mode was disabled, stopping");
                    adapter.stop();
                }
                None
            }
            AdapterSignal::Finalized(text) => {
                self.fatal_errors = 0;
                if requested {
                    Some(text)
                } else {
                    debug!("Ignoring transcript while voice mode is off: '{}'", text);
                    None
                }
            }
            AdapterSignal::Fault {
                class: ErrorClass::Fatal,
                code,
            } => {
                self.fatal_errors += 1;
                if self.fatal_errors >= self.max_fatal_errors {
                    warn!(
                        "Suspending voice listening after {} fatal errors (last: {})",
                        self.fatal_errors, code
                    );
                    self.disable();
                }
                None
            }
            AdapterSignal::Fault { .. } => None,
            AdapterSignal::Ended => {
                if requested {
                    debug!("Recognizer ended, restarting in {:?}", self.restart_delay);
                    self.state = ListeningState::Restarting;
                    self.restart_at = Some(now + self.restart_delay);
                } else {
                    self.state = ListeningState::Disabled;
                }
                None
            }
        }
    }

    pub fn poll_timers(&mut self, now: Instant) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };

        adapter.poll_timers(now);

        if self.startup_at.is_some_and(|at| at <= now) {
            self.startup_at = None;
            if adapter.session().continuous_mode_requested {
                debug!("Initial voice listening start");
                if let Err(e) = adapter.start() {
                    warn!("Voice listening failed to start: {}", e);
                }
            }
        }

        if self.restart_at.is_some_and(|at| at <= now) {
            self.restart_at = None;
            // The flag may have flipped since the restart was scheduled.
            if !adapter.session().continuous_mode_requested {
                return;
            }
            if !self.limiter.try_acquire(now) {
                warn!(
                    "Recognizer restarting too often, backing off {:?}",
                    self.restart_backoff
                );
                self.restart_at = Some(now + self.restart_backoff);
                return;
            }
            if let Err(e) = adapter.start() {
                warn!("Voice listening failed to restart: {}", e);
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let transcript = self.adapter.as_ref().and_then(CaptureAdapter::next_deadline);
        [transcript, self.startup_at, self.restart_at]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn reset_transcript(&mut self) {
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.reset_transcript();
        }
    }

    /// Cancels every pending timer and releases the recognizer.
    pub fn shutdown(&mut self) {
        self.startup_at = None;
        self.restart_at = None;
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.set_continuous(false);
            adapter.abort();
        }
        self.state = ListeningState::Disabled;
        info!("Listening supervisor shut down");
    }
}
