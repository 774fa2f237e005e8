use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-facing toggle between touch-only and voice-plus-touch operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[serde(rename = "touch")]
    Touch,
    #[default]
    #[serde(rename = "voice-touch")]
    VoiceTouch,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Touch => "touch",
            InteractionMode::VoiceTouch => "voice-touch",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            InteractionMode::Touch => InteractionMode::VoiceTouch,
            InteractionMode::VoiceTouch => InteractionMode::Touch,
        }
    }

    pub fn is_voice(&self) -> bool {
        matches!(self, InteractionMode::VoiceTouch)
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "touch" | "touch-only" => Ok(InteractionMode::Touch),
            "voice-touch" | "voice" | "voice-and-touch" => Ok(InteractionMode::VoiceTouch),
            other => Err(format!("unknown interaction mode: {}", other)),
        }
    }
}

/// Continuous listening supervisor states.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningState {
    #[default]
    Disabled,
    Starting,
    Listening,
    Restarting,
}

impl ListeningState {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ListeningState::Disabled)
    }
}

impl fmt::Display for ListeningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListeningState::Disabled => "disabled",
            ListeningState::Starting => "enabled-starting",
            ListeningState::Listening => "enabled-listening",
            ListeningState::Restarting => "enabled-restarting",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_interaction_mode_tokens() {
        assert_tokens(
            &InteractionMode::Touch,
            &[Token::UnitVariant {
                name: "InteractionMode",
                variant: "touch",
            }],
        );
        assert_tokens(
            &InteractionMode::VoiceTouch,
            &[Token::UnitVariant {
                name: "InteractionMode",
                variant: "voice-touch",
            }],
        );
    }

    #[test]
    fn test_interaction_mode_from_str() {
        assert_eq!("touch".parse(), Ok(InteractionMode::Touch));
        assert_eq!("Voice-Touch".parse(), Ok(InteractionMode::VoiceTouch));
        assert_eq!("voice".parse(), Ok(InteractionMode::VoiceTouch));
        assert!("keyboard".parse::<InteractionMode>().is_err());
    }

    #[test]
    fn test_interaction_mode_toggle() {
        assert_eq!(InteractionMode::Touch.toggled(), InteractionMode::VoiceTouch);
        assert_eq!(InteractionMode::VoiceTouch.toggled(), InteractionMode::Touch);
    }

    #[test]
    fn test_default_mode_is_voice() {
        assert!(InteractionMode::default().is_voice());
    }

    #[test]
    fn test_listening_state_enabled() {
        assert!(!ListeningState::Disabled.is_enabled());
        assert!(ListeningState::Starting.is_enabled());
        assert!(ListeningState::Listening.is_enabled());
        assert!(ListeningState::Restarting.is_enabled());
        assert_eq!(ListeningState::Restarting.to_string(), "enabled-restarting");
    }
}
