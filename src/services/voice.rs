use crate::agents::AnalysisBackend;
use crate::cases::{CaseFile, PreviewRef, PreviewRegistry, ingest_bytes};
use crate::error::VoiceError;
use crate::services::wav;
use tracing::{info, warn};

/// File name and MIME type of a packaged voice recording
pub const RECORDING_NAME: &str = "voice-input.wav";
pub const RECORDING_MIME: &str = "audio/wav";

/// Interleaved float samples captured between start and stop
#[derive(Debug, Clone, Default)]
pub struct RecordedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RecordedAudio {
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        let per_second = self.sample_rate as f32 * f32::from(self.channels.max(1));
        if per_second == 0.0 {
            return 0.0;
        }
        self.samples.len() as f32 / per_second
    }
}

/// Source of microphone audio
pub trait AudioRecorder {
    fn start(&mut self) -> Result<(), VoiceError>;
    fn stop(&mut self) -> Result<RecordedAudio, VoiceError>;
}

/// Default input device recorder
pub struct MicrophoneRecorder {
    #[cfg_attr(not(feature = "microphone"), allow(dead_code))]
    max_seconds: u32,
    #[cfg(feature = "microphone")]
    active: Option<capture::ActiveCapture>,
}

impl MicrophoneRecorder {
    pub fn new(max_seconds: u32) -> Self {
        Self {
            max_seconds,
            #[cfg(feature = "microphone")]
            active: None,
        }
    }
}

#[cfg(feature = "microphone")]
impl AudioRecorder for MicrophoneRecorder {
    fn start(&mut self) -> Result<(), VoiceError> {
        if self.active.is_some() {
            return Err(VoiceError::AlreadyRecording);
        }
        self.active = Some(capture::ActiveCapture::open(self.max_seconds)?);
        Ok(())
    }

    fn stop(&mut self) -> Result<RecordedAudio, VoiceError> {
        self.active
            .take()
            .ok_or(VoiceError::NotRecording)
            .map(capture::ActiveCapture::finish)
    }
}

#[cfg(not(feature = "microphone"))]
impl AudioRecorder for MicrophoneRecorder {
    fn start(&mut self) -> Result<(), VoiceError> {
        Err(VoiceError::Unavailable(
            "built without the `microphone` feature".to_string(),
        ))
    }

    fn stop(&mut self) -> Result<RecordedAudio, VoiceError> {
        Err(VoiceError::NotRecording)
    }
}

#[cfg(feature = "microphone")]
mod capture {
    use super::RecordedAudio;
    use crate::error::VoiceError;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use std::sync::{Arc, Mutex};
    use tracing::{error, info};

    pub(super) struct ActiveCapture {
        stream: cpal::Stream,
        samples: Arc<Mutex<Vec<f32>>>,
        sample_rate: u32,
        channels: u16,
    }

    impl ActiveCapture {
        pub(super) fn open(max_seconds: u32) -> Result<Self, VoiceError> {
            let host = cpal::default_host();
            let device = host
                .default_input_device()
                .ok_or_else(|| VoiceError::Unavailable("no input device".to_string()))?;
            let supported = device
                .default_input_config()
                .map_err(|e| VoiceError::Unavailable(e.to_string()))?;
            info!(device = ?device.name(), "using input device");

            let config: cpal::StreamConfig = supported.into();
            let sample_rate = config.sample_rate.0;
            let channels = config.channels;
            let limit = max_seconds as usize * sample_rate as usize * usize::from(channels);

            let samples = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&samples);
            let stream = device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                        let mut buffer = match sink.lock() {
                            Ok(buffer) => buffer,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        let room = limit.saturating_sub(buffer.len());
                        buffer.extend(data.iter().take(room));
                    },
                    move |err| {
                        error!("audio input error: {err}");
                    },
                    None,
                )
                .map_err(|e| VoiceError::Stream(e.to_string()))?;
            stream
                .play()
                .map_err(|e| VoiceError::Stream(e.to_string()))?;

            Ok(Self {
                stream,
                samples,
                sample_rate,
                channels,
            })
        }

        pub(super) fn finish(self) -> RecordedAudio {
            drop(self.stream);
            let samples = match self.samples.lock() {
                Ok(mut buffer) => std::mem::take(&mut *buffer),
                Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
            };
            RecordedAudio {
                samples,
                sample_rate: self.sample_rate,
                channels: self.channels,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Recording,
    Transcribing,
}

/// Single-session voice capture. Recording and transcription both count as
/// an active session.
pub struct VoiceCapture {
    recorder: Box<dyn AudioRecorder>,
    state: VoiceState,
    pending: Option<PreviewRef>,
}

impl VoiceCapture {
    pub fn new(recorder: Box<dyn AudioRecorder>) -> Self {
        Self {
            recorder,
            state: VoiceState::Idle,
            pending: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> VoiceState {
        self.state
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state != VoiceState::Idle
    }

    pub fn start(&mut self) -> Result<(), VoiceError> {
        if self.is_busy() {
            return Err(VoiceError::AlreadyRecording);
        }
        if let Err(error) = self.recorder.start() {
            warn!(%error, "microphone capture did not start");
            return Err(error);
        }
        self.state = VoiceState::Recording;
        info!("recording started");
        Ok(())
    }

    /// Stops recording and packages the audio for transcription
    pub fn stop(&mut self, previews: &PreviewRegistry) -> Result<CaseFile, VoiceError> {
        if self.state != VoiceState::Recording {
            return Err(VoiceError::NotRecording);
        }
        let audio = match self.recorder.stop() {
            Ok(audio) => audio,
            Err(error) => {
                self.state = VoiceState::Idle;
                return Err(error);
            }
        };
        info!(seconds = audio.duration_secs(), "recording stopped");
        let file = package_recording(&audio, previews);
        self.pending = Some(file.preview.clone());
        self.state = VoiceState::Transcribing;
        Ok(file)
    }

    /// Ends the transcription phase and releases the recording's preview
    pub fn finish(&mut self, previews: &PreviewRegistry) {
        if let Some(preview) = self.pending.take() {
            previews.release(&preview);
        }
        self.state = VoiceState::Idle;
    }
}

/// Wraps captured audio as a WAV attachment
#[must_use]
pub fn package_recording(audio: &RecordedAudio, previews: &PreviewRegistry) -> CaseFile {
    let bytes = wav::encode_pcm16(&audio.samples, audio.sample_rate, audio.channels);
    ingest_bytes(RECORDING_NAME, RECORDING_MIME, &bytes, previews)
}

pub fn transcribe_recording<B>(backend: &B, recording: &CaseFile) -> Result<String, VoiceError>
where
    B: AnalysisBackend + ?Sized,
{
    Ok(backend.transcribe(recording)?)
}

/// Joins a transcript onto the unsent prompt with a single space
#[must_use]
pub fn merge_transcript(prompt: &str, transcript: &str) -> String {
    if prompt.is_empty() {
        transcript.to_string()
    } else {
        format!("{prompt} {transcript}")
    }
}
