//! In-process recognizer backend.
//!
//! The kiosk has no speech model; transcripts are injected through a
//! [`SimulatedHandle`] (by the IPC server, or by tests) and surface through the
//! same event channel a platform recognizer would use.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

use super::recognizer::{
    RecognizerError, RecognizerEvent, RecognizerSettings, SpeechRecognizer, SpeechResult,
};

#[derive(Default)]
struct Inner {
    supported: bool,
    running: bool,
    settings: Option<RecognizerSettings>,
    events: Option<mpsc::UnboundedSender<RecognizerEvent>>,
    start_calls: usize,
    stop_calls: usize,
}

impl Inner {
    fn emit(&self, event: RecognizerEvent) {
        if let Some(tx) = self.events.as_ref() {
            let _ = tx.send(event);
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SimulatedRecognizer {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedRecognizer {
    pub fn new() -> (Self, SimulatedHandle) {
        Self::with_support(true)
    }

    /// A backend for a runtime without any speech capability.
    pub fn unsupported() -> (Self, SimulatedHandle) {
        Self::with_support(false)
    }

    fn with_support(supported: bool) -> (Self, SimulatedHandle) {
        let inner = Arc::new(Mutex::new(Inner {
            supported,
            ..Default::default()
        }));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            SimulatedHandle { inner },
        )
    }
}

impl SpeechRecognizer for SimulatedRecognizer {
    fn is_supported(&self) -> bool {
        lock(&self.inner).supported
    }

    fn configure(
        &mut self,
        settings: &RecognizerSettings,
        events: mpsc::UnboundedSender<RecognizerEvent>,
    ) {
        let mut inner = lock(&self.inner);
        inner.settings = Some(settings.clone());
        inner.events = Some(events);
        debug!("Simulated recognizer configured: {:?}", settings);
    }

    fn start(&mut self) -> Result<(), RecognizerError> {
        let mut inner = lock(&self.inner);
        inner.start_calls += 1;
        if inner.running {
            return Err(RecognizerError::AlreadyStarted);
        }
        if inner.events.is_none() {
            return Err(RecognizerError::StartFailed(
                "recognizer not configured".to_string(),
            ));
        }
        inner.running = true;
        inner.emit(RecognizerEvent::Started);
        Ok(())
    }

    fn stop(&mut self) {
        let mut inner = lock(&self.inner);
        inner.stop_calls += 1;
        if inner.running {
            inner.running = false;
            inner.emit(RecognizerEvent::Ended);
        }
    }

    fn abort(&mut self) {
        let mut inner = lock(&self.inner);
        if inner.running {
            inner.running = false;
            inner.emit(RecognizerEvent::Error {
                code: "aborted".to_string(),
                message: None,
            });
            inner.emit(RecognizerEvent::Ended);
        }
    }
}

/// Drives a [`SimulatedRecognizer`] from outside the voice service.
#[derive(Clone)]
pub struct SimulatedHandle {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedHandle {
    /// Delivers an utterance. Returns false when the recognizer is not capturing.
    pub fn speak(&self, text: &str, is_final: bool) -> bool {
        let inner = lock(&self.inner);
        if !inner.running {
            debug!("Dropping speech while recognizer is stopped: '{}'", text);
            return false;
        }
        let result = if is_final {
            SpeechResult::final_text(text)
        } else {
            SpeechResult::interim(text)
        };
        inner.emit(RecognizerEvent::Result {
            result_index: 0,
            results: vec![result],
        });
        true
    }

    /// Raises a recognizer error code without ending the session.
    pub fn fail(&self, code: &str) {
        lock(&self.inner).emit(RecognizerEvent::Error {
            code: code.to_string(),
            message: None,
        });
    }

    /// Natural termination, as when the platform closes a session after silence.
    pub fn end_session(&self) -> bool {
        let mut inner = lock(&self.inner);
        if !inner.running {
            return false;
        }
        inner.running = false;
        inner.emit(RecognizerEvent::Ended);
        true
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner).running
    }

    pub fn start_calls(&self) -> usize {
        lock(&self.inner).start_calls
    }

    pub fn stop_calls(&self) -> usize {
        lock(&self.inner).stop_calls
    }

    pub fn settings(&self) -> Option<RecognizerSettings> {
        lock(&self.inner).settings.clone()
    }
}
