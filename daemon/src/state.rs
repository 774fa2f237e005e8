use crate::assistant::ChatSession;
use crate::bus::EventBus;
use crate::config::Config;
use crate::error::VoiceError;
use crate::kiosk::{spawn_kiosk_task, KioskState};
use crate::recognition::{SimulatedHandle, SimulatedRecognizer, SpeechRecognizer};
use crate::service::{VoiceHandle, VoiceService};
use shared::ipc::{ChatLine, StatusInfo};
use shared::{KioskEvent, Page};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

pub struct DaemonState {
    pub config: Config,
    pub bus: EventBus,
    pub voice: VoiceHandle,
    pub simulator: SimulatedHandle,
    pub kiosk: Arc<Mutex<KioskState>>,
    pub chat: Arc<Mutex<Option<ChatSession>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DaemonState {
    /// Spawns the voice service and the kiosk task on the simulated backend.
    pub fn start(config: Config) -> Result<Self, VoiceError> {
        let (recognizer, simulator) = SimulatedRecognizer::new();
        Self::with_recognizer(config, Box::new(recognizer), simulator)
    }

    pub fn with_recognizer(
        config: Config,
        recognizer: Box<dyn SpeechRecognizer>,
        simulator: SimulatedHandle,
    ) -> Result<Self, VoiceError> {
        let bus = EventBus::default();
        let kiosk = KioskState::new();
        let context = kiosk.context();
        let kiosk = Arc::new(Mutex::new(kiosk));

        let (voice, voice_task) = VoiceService::spawn(recognizer, &config, bus.clone(), context)?;
        let kiosk_task = spawn_kiosk_task(kiosk.clone(), bus.clone(), voice.clone());

        tracing::info!("Daemon state initialized");
        Ok(Self {
            config,
            bus,
            voice,
            simulator,
            kiosk,
            chat: Arc::new(Mutex::new(None)),
            tasks: Mutex::new(vec![voice_task, kiosk_task]),
        })
    }

    pub async fn get_status(&self) -> Result<StatusInfo, VoiceError> {
        let voice = self.voice.status().await?;
        let kiosk = self.kiosk.lock().await;
        Ok(StatusInfo {
            mode: voice.mode,
            state: voice.state,
            is_supported: voice.is_supported,
            is_listening: voice.is_listening,
            transcript: voice.transcript,
            interim_transcript: voice.interim_transcript,
            matched_command: voice.matched_command,
            last_error: voice.last_error,
            locale: voice.locale,
            page: kiosk.page(),
            cart_items: kiosk.cart_items(),
            filter: kiosk.filter(),
            payment_method: kiosk.payment_method(),
        })
    }

    /// Touch navigation; goes through the bus like a voice command would.
    pub fn navigate(&self, page: Page) {
        self.bus.emit(KioskEvent::Navigate { page });
    }

    /// Sends one message to the help assistant, opening the dialog if needed,
    /// and waits out the thinking delay. A blank message only opens it.
    pub async fn chat(&self, text: &str) -> Vec<ChatLine> {
        let due = {
            let mut chat = self.chat.lock().await;
            let session = chat
                .get_or_insert_with(|| ChatSession::open(self.config.assistant.thinking_delay()));
            if text.trim().is_empty() {
                return session.messages().to_vec();
            }
            session.submit(text, Instant::now())
        };

        time::sleep_until(due).await;

        let mut chat = self.chat.lock().await;
        match chat.as_mut() {
            Some(session) => {
                session.poll(Instant::now());
                session.messages().to_vec()
            }
            // Closed while the reply was pending.
            None => Vec::new(),
        }
    }

    pub async fn close_chat(&self) {
        if self.chat.lock().await.take().is_some() {
            tracing::info!("Help dialog closed");
        }
    }

    pub async fn shutdown(&self) {
        if let Err(e) = self.voice.shutdown().await {
            tracing::debug!("Voice service already stopped: {}", e);
        }
        self.close_chat().await;
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        tracing::info!("Daemon state shut down");
    }
}
