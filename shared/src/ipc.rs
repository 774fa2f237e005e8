use crate::events::{GenderFilter, Page, PaymentMethod};
use crate::mode::{InteractionMode, ListeningState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const SOCKET_NAME: &str = "cashierd.sock";

/// Unix socket path for the daemon.
/// Uses XDG runtime directory if available, falls back to /tmp/cashierd.sock
pub fn default_socket_path() -> PathBuf {
    if let Some(runtime_dir) = dirs::runtime_dir() {
        runtime_dir.join(SOCKET_NAME)
    } else {
        PathBuf::from("/tmp").join(SOCKET_NAME)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Command {
    SetMode(InteractionMode),
    Toggle,
    Retry,
    Status,
    Navigate(Page),
    Speak { text: String, is_final: bool },
    EndSession,
    ResetTranscript,
    InjectError(String),
    Commands,
    Chat(String),
    CloseChat,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Response {
    Ok,
    Error(String),
    Status(StatusInfo),
    Commands(Vec<CommandInfo>),
    Chat(Vec<ChatLine>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub mode: InteractionMode,
    pub state: ListeningState,
    pub is_supported: bool,
    pub is_listening: bool,
    pub transcript: String,
    pub interim_transcript: String,
    pub matched_command: Option<String>,
    pub last_error: Option<String>,
    pub locale: String,
    pub page: Page,
    pub cart_items: u32,
    pub filter: GenderFilter,
    pub payment_method: Option<PaymentMethod>,
}

/// A registry entry as shown to the user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandInfo {
    pub label: String,
    pub description: String,
    pub keywords: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub id: u64,
    pub sender: ChatSender,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused: is cashierd running?")]
    ConnectionRefused,

    #[error("Connection timeout")]
    Timeout,

    #[error("Connection closed before a response was received")]
    Closed,
}
