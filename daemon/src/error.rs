use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Speech recognition is not supported on this platform")]
    UnsupportedPlatform,

    #[error("Voice mode is disabled (touch-only)")]
    VoiceModeDisabled,

    #[error("Recognition fault: {0}")]
    RecognitionFault(String),

    #[error("Voice command '{0}' has no trigger phrases")]
    EmptyTriggers(String),

    #[error("Duplicate voice command label: {0}")]
    DuplicateLabel(String),

    #[error("Voice service is not running")]
    ServiceStopped,
}
