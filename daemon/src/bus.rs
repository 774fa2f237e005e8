use shared::{KioskEvent, Notice};
use tokio::sync::broadcast;
use tracing::debug;

/// Typed broadcast channel connecting voice commands to the rest of the kiosk.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<KioskEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fire and forget; having no subscribers is not an error.
    pub fn emit(&self, event: KioskEvent) {
        debug!("Emitting {}", event.name());
        let _ = self.tx.send(event);
    }

    pub fn notify(&self, notice: Notice) {
        self.emit(KioskEvent::Notice(notice));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<KioskEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
