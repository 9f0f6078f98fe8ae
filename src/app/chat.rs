use super::AgentEvent;
use crate::agents::{AnalysisBackend, AnalysisOptions};
use crate::app::{App, InputCommand};
use crate::services::voice::merge_transcript;
use crate::session::{PendingTurn, SessionController, StreamEnd, drain_stream};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

impl App {
    /// Handles Enter in the input: an input command or a prompt
    pub fn send_chat_message(&mut self) {
        if self.chat_input.is_empty() {
            return;
        }
        if self.voice.is_busy() {
            self.show_status_toast("WAIT FOR VOICE INPUT");
            return;
        }

        if let Some(command) = InputCommand::parse(self.chat_input.content()) {
            // A rejected command stays in the input for correction
            let accepted = match command {
                InputCommand::Attach(paths) => self.attach_files(&paths),
                InputCommand::Detach(name) => self.detach_file(&name),
            };
            if accepted {
                self.chat_input.clear();
            }
            return;
        }

        let Some(case_id) = self.store.active_id().cloned() else {
            self.show_status_toast("CREATE A CASE FIRST (Ctrl+N)");
            return;
        };
        let text = self.chat_input.content().to_string();
        let session = self
            .sessions
            .entry(case_id.clone())
            .or_insert_with(|| SessionController::new(case_id.clone()));
        if session.is_awaiting() {
            self.show_status_toast("STILL ANALYZING");
            return;
        }
        let Some(turn) = session.begin(&mut self.store, &text) else {
            return;
        };

        self.chat_input.clear();
        self.reset_chat_scroll();

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_flags.insert(case_id, Arc::clone(&cancel));
        spawn_analysis_thread(
            Arc::clone(&self.backend),
            turn,
            self.analysis_options(),
            cancel,
            self.agent_tx.clone(),
        );
    }

    pub fn add_chat_input_char(&mut self, character: char) {
        if self.voice.is_busy() {
            return;
        }
        self.chat_input.add_char(character);
    }

    pub fn remove_chat_input_char(&mut self) {
        if self.voice.is_busy() {
            return;
        }
        self.chat_input.remove_char();
    }

    pub fn handle_chat_paste(&mut self, text: &str) {
        for character in text.chars().filter(|character| !character.is_control()) {
            self.add_chat_input_char(character);
        }
    }

    /// Whether the active case has a turn in flight
    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        self.store
            .active_id()
            .and_then(|id| self.sessions.get(id))
            .is_some_and(SessionController::is_awaiting)
    }

    /// Applies every pending worker event
    pub fn check_agent_response(&mut self) {
        while let Ok(event) = self.agent_rx.try_recv() {
            self.apply_agent_event(event);
        }
    }

    fn apply_agent_event(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::Fragment { case_id, text } => {
                // Events for deleted cases find no session and are dropped
                if let Some(session) = self.sessions.get_mut(&case_id) {
                    session.apply_fragment(&mut self.store, &text);
                }
            }
            AgentEvent::StreamFinished { case_id } => {
                self.cancel_flags.remove(&case_id);
                if let Some(session) = self.sessions.get_mut(&case_id) {
                    session.complete();
                }
            }
            AgentEvent::StreamFailed { case_id, error } => {
                self.cancel_flags.remove(&case_id);
                if let Some(session) = self.sessions.get_mut(&case_id) {
                    session.fail(&mut self.store, &error);
                }
            }
            AgentEvent::FilesIngested { case_id, files } => {
                self.finish_ingest();
                let count = files.len();
                let live_case = self.store.get(&case_id).is_some();
                self.store.add_files(&case_id, files);
                if live_case {
                    self.show_status_toast(format!("{count} FILE(S) ADDED"));
                }
            }
            AgentEvent::IngestFailed { case_id, error } => {
                self.finish_ingest();
                self.report_ingest_failure(&case_id, &error.to_string());
            }
            AgentEvent::Transcribed(transcript) => {
                self.voice.finish(self.store.previews());
                let merged = merge_transcript(self.chat_input.content(), &transcript);
                self.chat_input.set_content(merged);
                self.show_status_toast("TRANSCRIBED");
            }
            AgentEvent::TranscriptionFailed(error) => {
                self.voice.finish(self.store.previews());
                warn!(%error, "voice input abandoned");
                self.show_status_toast("TRANSCRIPTION FAILED");
            }
        }
        if self.chat_auto_scroll {
            self.chat_scroll_offset = 0;
        }
    }
}

/// Streams one turn on a background thread, forwarding fragments as events
fn spawn_analysis_thread(
    backend: Arc<dyn AnalysisBackend>,
    turn: PendingTurn,
    options: AnalysisOptions,
    cancel: Arc<AtomicBool>,
    agent_tx: Sender<AgentEvent>,
) {
    std::thread::spawn(move || {
        let case_id = turn.case_id.clone();
        let result = backend
            .stream_analysis(&turn.prompt, &turn.files, options)
            .and_then(|stream| {
                drain_stream(stream, Some(&cancel), |text| {
                    let _ = agent_tx.send(AgentEvent::Fragment {
                        case_id: case_id.clone(),
                        text,
                    });
                })
            });

        let event = match result {
            Ok(StreamEnd::Finished) => AgentEvent::StreamFinished { case_id },
            Ok(StreamEnd::Cancelled) => {
                debug!(case_id = %case_id, "analysis stream dropped");
                return;
            }
            Err(error) => AgentEvent::StreamFailed { case_id, error },
        };
        let _ = agent_tx.send(event);
    });
}

#[cfg(test)]
mod tests {
    use crate::agents::testing::ScriptedBackend;
    use crate::app::test_support::{app_with, pump_until};
    use crate::app::{AgentEvent, App};
    use crate::cases::{CaseId, MessageRole};
    use crate::session::STREAM_FAILURE_NOTICE;

    fn type_text(app: &mut App, text: &str) {
        for character in text.chars() {
            app.add_chat_input_char(character);
        }
    }

    fn contents(app: &App, id: &CaseId) -> Vec<(MessageRole, String)> {
        app.store
            .get(id)
            .unwrap()
            .messages()
            .iter()
            .map(|message| (message.role, message.content.clone()))
            .collect()
    }

    #[test]
    fn test_submit_streams_into_active_case() {
        let mut app = app_with(ScriptedBackend::with_fragments(&["Sum", "mary."]));
        app.create_case();
        let id = app.store.active_id().cloned().unwrap();

        type_text(&mut app, "summarize");
        app.send_chat_message();
        assert!(app.chat_input.is_empty());
        assert!(app.is_analyzing());

        pump_until(&mut app, |app| !app.is_analyzing());
        assert_eq!(
            contents(&app, &id),
            vec![
                (MessageRole::User, "summarize".to_string()),
                (MessageRole::Model, "Summary.".to_string()),
            ]
        );
    }

    #[test]
    fn test_failure_appends_notice() {
        let mut app = app_with(ScriptedBackend::failing_after(&["Par", "tial"], 2));
        app.create_case();
        let id = app.store.active_id().cloned().unwrap();
        type_text(&mut app, "hi");
        app.send_chat_message();
        pump_until(&mut app, |app| !app.is_analyzing());

        assert_eq!(
            contents(&app, &id)[1].1,
            format!("Partial{STREAM_FAILURE_NOTICE}")
        );
    }

    #[test]
    fn test_fragments_follow_originating_case_after_switch() {
        let mut app = app_with(ScriptedBackend::with_fragments(&["late ", "answer"]));
        app.create_case();
        let first = app.store.active_id().cloned().unwrap();
        type_text(&mut app, "question");
        app.send_chat_message();

        // No events are applied before the switch
        app.create_case();
        let second = app.store.active_id().cloned().unwrap();
        assert!(!app.is_analyzing());
        pump_until(&mut app, |app| {
            app.sessions.get(&first).is_some_and(|session| !session.is_awaiting())
        });

        assert_eq!(contents(&app, &first)[1].1, "late answer");
        assert!(contents(&app, &second).is_empty());
    }

    #[test]
    fn test_events_for_deleted_case_are_ignored() {
        let mut app = app_with(ScriptedBackend::default());
        app.create_case();
        let id = app.store.active_id().cloned().unwrap();
        type_text(&mut app, "question");
        app.send_chat_message();
        app.delete_case(&id);

        app.agent_tx
            .send(AgentEvent::Fragment {
                case_id: id.clone(),
                text: "orphan".to_string(),
            })
            .unwrap();
        app.agent_tx
            .send(AgentEvent::StreamFinished { case_id: id.clone() })
            .unwrap();
        app.check_agent_response();

        assert!(app.store.get(&id).is_none());
        assert!(app.sessions.is_empty());
    }

    #[test]
    fn test_submit_without_case_keeps_input() {
        let mut app = app_with(ScriptedBackend::with_fragments(&["x"]));
        type_text(&mut app, "hello");
        app.send_chat_message();
        assert_eq!(app.chat_input.content(), "hello");
        assert_eq!(app.status_toast_message(), Some("CREATE A CASE FIRST (Ctrl+N)"));
    }

    #[test]
    fn test_blank_prompt_is_ignored() {
        let mut app = app_with(ScriptedBackend::with_fragments(&["x"]));
        app.create_case();
        let id = app.store.active_id().cloned().unwrap();
        type_text(&mut app, "   ");
        app.send_chat_message();
        assert!(contents(&app, &id).is_empty());
        assert!(!app.is_analyzing());
    }

    #[test]
    fn test_rejected_command_is_kept_in_input() {
        let mut app = app_with(ScriptedBackend::with_fragments(&["x"]));
        app.create_case();
        let id = app.store.active_id().cloned().unwrap();
        type_text(&mut app, ":detach missing.pdf");
        app.send_chat_message();
        assert!(contents(&app, &id).is_empty());
        assert_eq!(app.chat_input.content(), ":detach missing.pdf");
        assert_eq!(app.status_toast_message(), Some("NO FILE NAMED missing.pdf"));
    }

    #[test]
    fn test_prompt_starting_with_attach_is_submitted() {
        let backend = ScriptedBackend::with_fragments(&["Done."]);
        let mut app = app_with(backend);
        app.create_case();
        let id = app.store.active_id().cloned().unwrap();
        type_text(&mut app, "attach a risk summary to the report");
        app.send_chat_message();
        assert!(app.chat_input.is_empty());

        pump_until(&mut app, |app| !app.is_analyzing());
        assert_eq!(
            contents(&app, &id),
            vec![
                (MessageRole::User, "attach a risk summary to the report".to_string()),
                (MessageRole::Model, "Done.".to_string()),
            ]
        );
        assert_eq!(app.pending_ingests, 0);
    }
}
