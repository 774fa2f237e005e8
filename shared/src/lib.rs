pub mod events;
pub mod ipc;
pub mod mode;

pub use events::{GenderFilter, KioskEvent, Notice, NoticeLevel, Page, PaymentMethod};
pub use ipc::{ChatLine, ChatSender, Command, CommandInfo, IpcError, Response, StatusInfo};
pub use mode::{InteractionMode, ListeningState};
