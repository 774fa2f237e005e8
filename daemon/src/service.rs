//! Voice service actor.
//!
//! One task owns the supervisor, the matcher and the registry. Everything else
//! talks to it through a cloneable [`VoiceHandle`]. Timers are deadlines held
//! by the components; the loop sleeps until the earliest one.

use shared::{CommandInfo, InteractionMode, ListeningState};
use std::future;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use crate::bus::EventBus;
use crate::commands::{CommandMatcher, CommandRegistry, NavigationContext, RegistryBuilder};
use crate::config::Config;
use crate::error::VoiceError;
use crate::recognition::{RecognizerEvent, SpeechRecognizer};
use crate::supervisor::ListeningSupervisor;

const CONTROL_QUEUE: usize = 32;

/// Snapshot of what the UI shows about voice input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceStatus {
    pub mode: InteractionMode,
    pub state: ListeningState,
    pub is_supported: bool,
    pub is_listening: bool,
    pub transcript: String,
    pub interim_transcript: String,
    pub matched_command: Option<String>,
    pub last_error: Option<String>,
    pub locale: String,
}

enum Control {
    SetMode(InteractionMode, oneshot::Sender<Result<(), VoiceError>>),
    Toggle(oneshot::Sender<Result<InteractionMode, VoiceError>>),
    Retry(oneshot::Sender<Result<(), VoiceError>>),
    Status(oneshot::Sender<VoiceStatus>),
    SetContext(NavigationContext, oneshot::Sender<()>),
    Commands(oneshot::Sender<Vec<CommandInfo>>),
    ResetTranscript(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct VoiceHandle {
    tx: mpsc::Sender<Control>,
}

impl VoiceHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Control,
    ) -> Result<T, VoiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| VoiceError::ServiceStopped)?;
        reply_rx.await.map_err(|_| VoiceError::ServiceStopped)
    }

    pub async fn set_mode(&self, mode: InteractionMode) -> Result<(), VoiceError> {
        self.request(|reply| Control::SetMode(mode, reply)).await?
    }

    pub async fn mode(&self) -> Result<InteractionMode, VoiceError> {
        Ok(self.status().await?.mode)
    }

    /// Flips between touch-only and voice-and-touch in one step on the actor.
    /// Returns the new mode.
    pub async fn toggle(&self) -> Result<InteractionMode, VoiceError> {
        self.request(Control::Toggle).await?
    }

    pub async fn retry(&self) -> Result<(), VoiceError> {
        self.request(Control::Retry).await?
    }

    pub async fn status(&self) -> Result<VoiceStatus, VoiceError> {
        self.request(Control::Status).await
    }

    pub async fn set_context(&self, context: NavigationContext) -> Result<(), VoiceError> {
        self.request(|reply| Control::SetContext(context, reply))
            .await
    }

    pub async fn commands(&self) -> Result<Vec<CommandInfo>, VoiceError> {
        self.request(Control::Commands).await
    }

    /// Clears the displayed transcript and the last matched command.
    pub async fn reset_transcript(&self) -> Result<(), VoiceError> {
        self.request(Control::ResetTranscript).await
    }

    pub async fn shutdown(&self) -> Result<(), VoiceError> {
        self.request(Control::Shutdown).await
    }
}

pub struct VoiceService {
    supervisor: ListeningSupervisor,
    matcher: CommandMatcher,
    builder: RegistryBuilder,
    registry: CommandRegistry,
}

impl VoiceService {
    /// Spawns the actor on the current runtime.
    pub fn spawn(
        recognizer: Box<dyn SpeechRecognizer>,
        config: &Config,
        bus: EventBus,
        context: NavigationContext,
    ) -> Result<(VoiceHandle, JoinHandle<()>), VoiceError> {
        let (supervisor, events) = ListeningSupervisor::new(recognizer, config, Instant::now());
        let mut builder = RegistryBuilder::new(bus);
        let registry = builder.current(context)?;
        let matcher = CommandMatcher::new(
            config.feedback.auto_execute,
            config.feedback.match_clear(),
        );

        let service = Self {
            supervisor,
            matcher,
            builder,
            registry,
        };
        let (tx, rx) = mpsc::channel(CONTROL_QUEUE);
        let task = tokio::spawn(service.run(rx, events));
        Ok((VoiceHandle { tx }, task))
    }

    async fn run(
        mut self,
        mut control_rx: mpsc::Receiver<Control>,
        mut events: Option<mpsc::UnboundedReceiver<RecognizerEvent>>,
    ) {
        info!("Voice service started");
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                control = control_rx.recv() => match control {
                    Some(control) => {
                        if !self.handle_control(control) {
                            break;
                        }
                    }
                    None => {
                        self.shutdown();
                        break;
                    }
                },
                Some(event) = next_event(&mut events) => {
                    self.handle_event(event, Instant::now());
                }
                _ = sleep_until(deadline) => {
                    self.supervisor.poll_timers(Instant::now());
                    self.matcher.poll_timers(Instant::now());
                }
            }
        }
        info!("Voice service stopped");
    }

    /// Returns `false` once the service should stop.
    fn handle_control(&mut self, control: Control) -> bool {
        match control {
            Control::SetMode(mode, reply) => {
                let _ = reply.send(self.supervisor.set_mode(mode));
            }
            Control::Toggle(reply) => {
                let next = self.supervisor.mode().toggled();
                let _ = reply.send(self.supervisor.set_mode(next).map(|()| next));
            }
            Control::Retry(reply) => {
                let _ = reply.send(self.supervisor.retry());
            }
            Control::Status(reply) => {
                let _ = reply.send(self.status());
            }
            Control::SetContext(context, reply) => {
                match self.builder.current(context) {
                    Ok(registry) => self.registry = registry,
                    Err(e) => error!("Keeping previous command registry: {}", e),
                }
                let _ = reply.send(());
            }
            Control::Commands(reply) => {
                let _ = reply.send(self.registry.describe());
            }
            Control::ResetTranscript(reply) => {
                self.supervisor.reset_transcript();
                self.matcher.clear();
                let _ = reply.send(());
            }
            Control::Shutdown(reply) => {
                self.shutdown();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    /// The transcript is already stored in the session when the supervisor
    /// hands it back, so matching always follows emission.
    fn handle_event(&mut self, event: RecognizerEvent, now: Instant) {
        if let Some(transcript) = self.supervisor.handle_event(event, now) {
            debug!("Final transcript: '{}'", transcript);
            self.matcher.dispatch(&transcript, &self.registry, now);
        }
    }

    fn status(&self) -> VoiceStatus {
        let session = self.supervisor.session();
        VoiceStatus {
            mode: self.supervisor.mode(),
            state: self.supervisor.state(),
            is_supported: self.supervisor.is_supported(),
            is_listening: self.supervisor.is_listening(),
            transcript: session
                .map(|s| s.final_transcript.clone())
                .unwrap_or_default(),
            interim_transcript: session
                .map(|s| s.interim_transcript.clone())
                .unwrap_or_default(),
            matched_command: self
                .matcher
                .last_match()
                .map(|m| m.command.label().to_string()),
            last_error: session.and_then(|s| s.last_error.clone()),
            locale: self.supervisor.locale().unwrap_or_default().to_string(),
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        [self.supervisor.next_deadline(), self.matcher.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    fn shutdown(&mut self) {
        self.supervisor.shutdown();
        self.matcher.clear();
    }
}

async fn next_event(
    events: &mut Option<mpsc::UnboundedReceiver<RecognizerEvent>>,
) -> Option<RecognizerEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => future::pending().await,
    }
}
