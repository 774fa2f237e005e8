//! Minimal kiosk state driven by the event channel.
//!
//! Stands in for the touch UI: it tracks the page, the cart and the payment
//! selection, and reacts to voice-emitted events the way the screens would.

use shared::{GenderFilter, KioskEvent, Notice, Page, PaymentMethod};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::commands::NavigationContext;
use crate::service::VoiceHandle;

const NOTICE_LOG_LIMIT: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct KioskState {
    page: Page,
    cart_items: u32,
    filter: GenderFilter,
    payment_method: Option<PaymentMethod>,
    notices: VecDeque<Notice>,
}

impl KioskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn cart_items(&self) -> u32 {
        self.cart_items
    }

    pub fn filter(&self) -> GenderFilter {
        self.filter
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Most recent last.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn context(&self) -> NavigationContext {
        NavigationContext::new(self.page, self.cart_items == 0)
    }

    /// Applies one event and returns the follow-up events the kiosk emits in
    /// response.
    pub fn apply(&mut self, event: &KioskEvent) -> Vec<KioskEvent> {
        match event {
            KioskEvent::Navigate { page } => {
                if self.page != *page {
                    info!("Kiosk page: {}", page);
                }
                self.page = *page;
                if *page != Page::Catalogue {
                    self.filter = GenderFilter::All;
                }
                Vec::new()
            }
            KioskEvent::ScanItem => {
                self.cart_items += 1;
                debug!("Cart now holds {} items", self.cart_items);
                vec![KioskEvent::Notice(Notice::success("Item added to cart"))]
            }
            KioskEvent::ClearCart => {
                self.cart_items = 0;
                self.payment_method = None;
                Vec::new()
            }
            KioskEvent::SelectCardPayment => {
                self.payment_method = Some(PaymentMethod::Card);
                Vec::new()
            }
            KioskEvent::SelectFaceIdPayment => {
                self.payment_method = Some(PaymentMethod::FaceId);
                Vec::new()
            }
            KioskEvent::ConfirmPayment => {
                if self.cart_items == 0 {
                    warn!("Payment confirmed with an empty cart");
                    return vec![KioskEvent::Notice(Notice::error("Cart is empty"))];
                }
                info!("Payment of {} items confirmed", self.cart_items);
                self.cart_items = 0;
                self.payment_method = None;
                vec![
                    KioskEvent::Notice(Notice::success("Payment successful! Thank you")),
                    KioskEvent::Navigate { page: Page::Home },
                ]
            }
            KioskEvent::FilterProducts { gender } => {
                self.filter = *gender;
                Vec::new()
            }
            KioskEvent::Notice(notice) => {
                if self.notices.len() == NOTICE_LOG_LIMIT {
                    self.notices.pop_front();
                }
                self.notices.push_back(notice.clone());
                Vec::new()
            }
        }
    }
}

/// Consumes the bus until it closes, keeping the voice service's navigation
/// context in step with the kiosk.
pub fn spawn_kiosk_task(
    kiosk: Arc<Mutex<KioskState>>,
    bus: EventBus,
    voice: VoiceHandle,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Kiosk lagged, dropped {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let (before, after, follow_ups) = {
                let mut kiosk = kiosk.lock().await;
                let before = kiosk.context();
                let follow_ups = kiosk.apply(&event);
                (before, kiosk.context(), follow_ups)
            };

            if before != after {
                if let Err(e) = voice.set_context(after).await {
                    warn!("Failed to update voice context: {}", e);
                    break;
                }
            }
            for follow_up in follow_ups {
                bus.emit(follow_up);
            }
        }
        debug!("Kiosk task stopped");
    })
}
