pub mod assistant;
pub mod bus;
pub mod commands;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod rate_limit;
pub mod recognition;
pub mod server;
pub mod service;
pub mod state;
pub mod supervisor;

pub use assistant::{classify, ChatSession};
pub use bus::EventBus;
pub use commands::{CommandMatcher, CommandRegistry, NavigationContext, RegistryBuilder};
pub use error::VoiceError;
pub use kiosk::KioskState;
pub use rate_limit::RestartLimiter;
pub use recognition::{SimulatedHandle, SimulatedRecognizer, SpeechRecognizer};
pub use service::{VoiceHandle, VoiceService, VoiceStatus};
pub use supervisor::ListeningSupervisor;
