pub mod voice;
pub mod wav;

pub use voice::{AudioRecorder, MicrophoneRecorder, VoiceCapture};
