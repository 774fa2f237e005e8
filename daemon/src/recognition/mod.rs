pub mod adapter;
pub mod recognizer;
pub mod simulated;

pub use adapter::{AdapterSignal, CaptureAdapter, RecognitionSession};
pub use recognizer::{
    ErrorClass, RecognizerError, RecognizerEvent, RecognizerSettings, SpeechRecognizer,
    SpeechResult,
};
pub use simulated::{SimulatedHandle, SimulatedRecognizer};
