use super::AgentEvent;
use crate::app::App;
use crate::services::voice::{VoiceState, transcribe_recording};

impl App {
    /// Ctrl+R: starts a recording, or stops it and transcribes in the background
    pub fn toggle_recording(&mut self) {
        match self.voice.state() {
            VoiceState::Idle => match self.voice.start() {
                Ok(()) => self.show_status_toast("RECORDING"),
                Err(error) => self.show_status_toast(format!("MIC: {error}")),
            },
            VoiceState::Recording => {
                let recording = match self.voice.stop(self.store.previews()) {
                    Ok(recording) => recording,
                    Err(error) => {
                        self.show_status_toast(format!("MIC: {error}"));
                        return;
                    }
                };
                let backend = std::sync::Arc::clone(&self.backend);
                let tx = self.agent_tx.clone();
                std::thread::spawn(move || {
                    let event = match transcribe_recording(backend.as_ref(), &recording) {
                        Ok(text) => AgentEvent::Transcribed(text),
                        Err(error) => AgentEvent::TranscriptionFailed(error),
                    };
                    let _ = tx.send(event);
                });
                self.show_status_toast("TRANSCRIBING");
            }
            VoiceState::Transcribing => self.show_status_toast("STILL TRANSCRIBING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::testing::ScriptedBackend;
    use crate::app::test_support::{app_with, pump_until};
    use crate::services::voice::VoiceState;

    fn transcribing_backend(text: Option<&str>) -> ScriptedBackend {
        ScriptedBackend {
            transcript: text.map(str::to_string),
            ..ScriptedBackend::default()
        }
    }

    #[test]
    fn test_transcript_appends_to_typed_prompt() {
        let mut app = app_with(transcribing_backend(Some("and the invoice")));
        for character in "Compare".chars() {
            app.add_chat_input_char(character);
        }
        app.toggle_recording();
        assert_eq!(app.voice.state(), VoiceState::Recording);

        app.add_chat_input_char('x');
        assert_eq!(app.chat_input.content(), "Compare");

        app.toggle_recording();
        pump_until(&mut app, |app| !app.voice.is_busy());
        assert_eq!(app.chat_input.content(), "Compare and the invoice");
        assert_eq!(app.store.previews().live_count(), 0);
    }

    #[test]
    fn test_failed_transcription_leaves_prompt() {
        let mut app = app_with(transcribing_backend(None));
        for character in "keep me".chars() {
            app.add_chat_input_char(character);
        }
        app.toggle_recording();
        app.toggle_recording();
        pump_until(&mut app, |app| !app.voice.is_busy());

        assert_eq!(app.chat_input.content(), "keep me");
        assert_eq!(app.status_toast_message(), Some("TRANSCRIPTION FAILED"));
    }
}
