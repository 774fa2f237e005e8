//! Context-dependent command sets.
//!
//! Page-specific commands are listed before the cross-page baseline so that a
//! contextual phrase ("scan item") wins over a generic keyword it contains
//! ("scan").

use shared::{GenderFilter, KioskEvent, Notice, Page};
use tracing::debug;

use super::registry::{CommandRegistry, VoiceCommand};
use crate::bus::EventBus;
use crate::error::VoiceError;

/// Everything the command set depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationContext {
    pub page: Page,
    pub cart_empty: bool,
}

impl NavigationContext {
    pub fn new(page: Page, cart_empty: bool) -> Self {
        Self { page, cart_empty }
    }
}

pub struct RegistryBuilder {
    bus: EventBus,
    cached: Option<(NavigationContext, CommandRegistry)>,
}

impl RegistryBuilder {
    pub fn new(bus: EventBus) -> Self {
        Self { bus, cached: None }
    }

    /// Returns the registry for `context`, rebuilding only when it changed.
    pub fn current(&mut self, context: NavigationContext) -> Result<CommandRegistry, VoiceError> {
        if let Some((cached_context, registry)) = self.cached.as_ref() {
            if *cached_context == context {
                return Ok(registry.clone());
            }
        }

        let registry = self.build(context)?;
        debug!(
            "Rebuilt command registry for {} (cart empty: {}): {} commands",
            context.page,
            context.cart_empty,
            registry.len()
        );
        self.cached = Some((context, registry.clone()));
        Ok(registry)
    }

    pub fn build(&self, context: NavigationContext) -> Result<CommandRegistry, VoiceError> {
        let mut commands = match context.page {
            Page::Scanner => self.scanner_commands(context.cart_empty)?,
            Page::Payment => self.payment_commands()?,
            Page::Catalogue => self.catalogue_commands()?,
            _ => Vec::new(),
        };
        commands.extend(self.baseline_commands()?);
        CommandRegistry::new(commands)
    }

    fn baseline_commands(&self) -> Result<Vec<VoiceCommand>, VoiceError> {
        Ok(vec![
            self.navigation(
                "Go Home",
                &["go home", "home", "main page", "start page", "back to home"],
                "Navigate to home page",
                Page::Home,
                "Navigating to Home",
            )?,
            self.navigation(
                "Start Checkout",
                &["checkout", "start checkout", "scan", "scanner", "scan items"],
                "Go to item scanner",
                Page::Scanner,
                "Opening Scanner",
            )?,
            self.navigation(
                "Browse Catalogue",
                &[
                    "catalogue",
                    "catalog",
                    "browse",
                    "products",
                    "browse products",
                    "show products",
                ],
                "Browse product catalogue",
                Page::Catalogue,
                "Opening Catalogue",
            )?,
            self.navigation(
                "Return Items",
                &["return", "return items", "refund", "returns"],
                "Go to returns page",
                Page::Return,
                "Opening Returns",
            )?,
            self.navigation(
                "Virtual Try On",
                &["try on", "virtual try", "try clothes", "fitting room"],
                "Go to virtual try-on",
                Page::TryOn,
                "Opening Virtual Try-On",
            )?,
        ])
    }

    fn scanner_commands(&self, cart_empty: bool) -> Result<Vec<VoiceCommand>, VoiceError> {
        let clear_bus = self.bus.clone();
        let pay_bus = self.bus.clone();

        Ok(vec![
            self.broadcast(
                "Scan Item",
                &["scan item", "add item", "scan product"],
                "Scan an item",
                KioskEvent::ScanItem,
            )?,
            command(
                "Clear Cart",
                &["clear cart", "empty cart", "remove all", "clear all"],
                "Clear all items from cart",
                move || {
                    clear_bus.emit(KioskEvent::ClearCart);
                    clear_bus.notify(Notice::info("Cart cleared"));
                },
            )?,
            command(
                "Pay Now",
                &["pay", "pay now", "payment", "proceed to payment"],
                "Proceed to payment",
                move || {
                    if cart_empty {
                        pay_bus.notify(Notice::error("Cart is empty"));
                    } else {
                        pay_bus.emit(KioskEvent::Navigate {
                            page: Page::Payment,
                        });
                        pay_bus.notify(Notice::info("Proceeding to payment"));
                    }
                },
            )?,
        ])
    }

    fn payment_commands(&self) -> Result<Vec<VoiceCommand>, VoiceError> {
        Ok(vec![
            self.broadcast(
                "Pay with Card",
                &["card", "credit card", "pay with card", "use card"],
                "Select card payment",
                KioskEvent::SelectCardPayment,
            )?,
            self.broadcast(
                "Pay with Face ID",
                &["face", "face id", "faceid", "biometric", "face payment"],
                "Select Face ID payment",
                KioskEvent::SelectFaceIdPayment,
            )?,
            self.broadcast(
                "Confirm Payment",
                &["confirm", "confirm payment", "complete", "finish"],
                "Confirm the payment",
                KioskEvent::ConfirmPayment,
            )?,
        ])
    }

    // "women" contains "men", so the women's filter has to come first.
    fn catalogue_commands(&self) -> Result<Vec<VoiceCommand>, VoiceError> {
        Ok(vec![
            self.broadcast(
                "Show Women's",
                &["women", "womens", "women's", "female", "show women"],
                "Filter women's clothing",
                KioskEvent::FilterProducts {
                    gender: GenderFilter::Women,
                },
            )?,
            self.broadcast(
                "Show Men's",
                &["men", "mens", "men's", "male", "show men"],
                "Filter men's clothing",
                KioskEvent::FilterProducts {
                    gender: GenderFilter::Men,
                },
            )?,
            self.broadcast(
                "Show All",
                &["all", "show all", "clear filter", "reset"],
                "Show all products",
                KioskEvent::FilterProducts {
                    gender: GenderFilter::All,
                },
            )?,
        ])
    }

    fn navigation(
        &self,
        label: &str,
        triggers: &[&str],
        description: &str,
        page: Page,
        notice: &'static str,
    ) -> Result<VoiceCommand, VoiceError> {
        let bus = self.bus.clone();
        command(label, triggers, description, move || {
            bus.emit(KioskEvent::Navigate { page });
            bus.notify(Notice::info(notice));
        })
    }

    fn broadcast(
        &self,
        label: &str,
        triggers: &[&str],
        description: &str,
        event: KioskEvent,
    ) -> Result<VoiceCommand, VoiceError> {
        let bus = self.bus.clone();
        command(label, triggers, description, move || bus.emit(event.clone()))
    }
}

/// The label itself is always one of the trigger phrases.
fn command(
    label: &str,
    triggers: &[&str],
    description: &str,
    action: impl Fn() + Send + Sync + 'static,
) -> Result<VoiceCommand, VoiceError> {
    let lowered = label.to_lowercase();
    let phrases = std::iter::once(lowered.as_str()).chain(triggers.iter().copied());
    VoiceCommand::new(label, phrases, description, action)
}
