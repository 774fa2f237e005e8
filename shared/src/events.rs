//! Typed events broadcast by voice commands and consumed by the kiosk.
//!
//! Every variant has a stable wire name so external consumers can subscribe by
//! name the same way they would to a DOM-style custom event.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Home,
    Scanner,
    Catalogue,
    Return,
    TryOn,
    Payment,
    Help,
    Account,
    Signup,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Scanner => "/scanner",
            Page::Catalogue => "/catalogue",
            Page::Return => "/return",
            Page::TryOn => "/try-on",
            Page::Payment => "/payment",
            Page::Help => "/help",
            Page::Account => "/account",
            Page::Signup => "/signup",
        }
    }

    /// Resolves a router path; nested paths resolve to their top-level page.
    pub fn from_path(path: &str) -> Option<Self> {
        let head = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match head {
            "" => Some(Page::Home),
            "scanner" => Some(Page::Scanner),
            "catalogue" => Some(Page::Catalogue),
            "return" => Some(Page::Return),
            "try-on" => Some(Page::TryOn),
            "payment" => Some(Page::Payment),
            "help" => Some(Page::Help),
            "account" => Some(Page::Account),
            "signup" => Some(Page::Signup),
            _ => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let path = if s.starts_with('/') {
            s
        } else if s == "home" {
            "/".to_string()
        } else {
            format!("/{}", s)
        };
        Page::from_path(&path).ok_or_else(|| format!("unknown page: {}", path))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenderFilter {
    Men,
    Women,
    #[default]
    All,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Card,
    FaceId,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient, user-visible notification (toast).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "detail", rename_all = "kebab-case")]
pub enum KioskEvent {
    Navigate { page: Page },
    #[serde(rename = "voice-scan-item")]
    ScanItem,
    ClearCart,
    #[serde(rename = "voice-select-card")]
    SelectCardPayment,
    #[serde(rename = "voice-select-faceid")]
    SelectFaceIdPayment,
    #[serde(rename = "voice-confirm-payment")]
    ConfirmPayment,
    #[serde(rename = "voice-filter")]
    FilterProducts { gender: GenderFilter },
    Notice(Notice),
}

impl KioskEvent {
    pub fn name(&self) -> &'static str {
        match self {
            KioskEvent::Navigate { .. } => "navigate",
            KioskEvent::ScanItem => "voice-scan-item",
            KioskEvent::ClearCart => "clear-cart",
            KioskEvent::SelectCardPayment => "voice-select-card",
            KioskEvent::SelectFaceIdPayment => "voice-select-faceid",
            KioskEvent::ConfirmPayment => "voice-confirm-payment",
            KioskEvent::FilterProducts { .. } => "voice-filter",
            KioskEvent::Notice(_) => "notice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_path() {
        assert_eq!(Page::from_path("/"), Some(Page::Home));
        assert_eq!(Page::from_path("/scanner"), Some(Page::Scanner));
        assert_eq!(Page::from_path("/payment/confirm"), Some(Page::Payment));
        assert_eq!(Page::from_path("/try-on"), Some(Page::TryOn));
        assert_eq!(Page::from_path("/nowhere"), None);
    }

    #[test]
    fn test_page_from_str() {
        assert_eq!("home".parse(), Ok(Page::Home));
        assert_eq!("Catalogue".parse(), Ok(Page::Catalogue));
        assert_eq!("/return".parse(), Ok(Page::Return));
        assert!("basement".parse::<Page>().is_err());
    }

    #[test]
    fn test_event_wire_name_matches_serialized_tag() {
        let events = vec![
            KioskEvent::ScanItem,
            KioskEvent::SelectCardPayment,
            KioskEvent::SelectFaceIdPayment,
            KioskEvent::ConfirmPayment,
            KioskEvent::FilterProducts {
                gender: GenderFilter::Men,
            },
            KioskEvent::ClearCart,
            KioskEvent::Navigate { page: Page::Help },
            KioskEvent::Notice(Notice::info("hi")),
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }

    #[test]
    fn test_filter_payload_shape() {
        let event = KioskEvent::FilterProducts {
            gender: GenderFilter::Women,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"voice-filter","detail":{"gender":"women"}}"#);
    }

    #[test]
    fn test_notice_constructors() {
        assert_eq!(Notice::error("Cart is empty").level, NoticeLevel::Error);
        assert_eq!(Notice::info("x").level, NoticeLevel::Info);
        assert_eq!(Notice::success("y").message, "y");
    }
}
