mod cases;
mod chat;
mod help;
mod menu;
mod navigation;
mod scroll;
#[path = "text-input.rs"]
mod text_input;
mod types;
mod voice;

pub use help::HELP_SECTIONS;
pub use navigation::Navigable;
pub use text_input::TextInput;
pub use types::*;

use crate::agents::{AnalysisBackend, AnalysisOptions};
use crate::cases::{CaseFile, CaseId, CaseStore};
use crate::error::{AnalysisError, IngestError, VoiceError};
use crate::services::{AudioRecorder, VoiceCapture};
use crate::session::SessionController;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

/// Application mode state
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Chat,
    CommandMenu,
    Help,
}

/// Events from worker threads, applied on the UI thread
#[derive(Debug)]
pub enum AgentEvent {
    Fragment { case_id: CaseId, text: String },
    StreamFinished { case_id: CaseId },
    StreamFailed { case_id: CaseId, error: AnalysisError },
    FilesIngested { case_id: CaseId, files: Vec<CaseFile> },
    IngestFailed { case_id: CaseId, error: IngestError },
    Transcribed(String),
    TranscriptionFailed(VoiceError),
}

/// Main application state
pub struct App {
    pub mode: AppMode,
    pub previous_mode: Option<AppMode>,
    pub focus: Focus,
    pub should_quit: bool,

    // Command palette
    pub input: String,
    pub selected_index: usize,
    pub menu_items: Vec<MenuItem>,

    // Cases and sessions
    pub store: CaseStore,
    pub sidebar_index: usize,
    pub sessions: HashMap<CaseId, SessionController>,
    cancel_flags: HashMap<CaseId, Arc<AtomicBool>>,
    pub pending_ingests: usize,

    // Chat pane
    pub chat_input: TextInput,
    pub extended_reasoning: bool,
    pub chat_scroll_offset: usize,
    pub chat_auto_scroll: bool,
    pub voice: VoiceCapture,
    pub status_toast: Option<StatusToast>,

    backend: Arc<dyn AnalysisBackend>,
    agent_tx: Sender<AgentEvent>,
    agent_rx: Receiver<AgentEvent>,
}

fn menu_item(name: &str, description: &str) -> MenuItem {
    MenuItem {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn base_menu_items() -> Vec<MenuItem> {
    vec![
        menu_item("new", "Create a new case"),
        menu_item("delete", "Delete the active case"),
        menu_item("think", "Toggle extended reasoning"),
        menu_item("record", "Start or stop voice input"),
        menu_item("help", "Show keyboard shortcuts"),
        menu_item("quit", "Exit the application"),
    ]
}

impl App {
    pub fn new(backend: Arc<dyn AnalysisBackend>, recorder: Box<dyn AudioRecorder>) -> Self {
        let (agent_tx, agent_rx) = channel();
        Self {
            mode: AppMode::Chat,
            previous_mode: None,
            focus: Focus::Input,
            should_quit: false,
            input: String::new(),
            selected_index: 0,
            menu_items: base_menu_items(),
            store: CaseStore::new(),
            sidebar_index: 0,
            sessions: HashMap::new(),
            cancel_flags: HashMap::new(),
            pending_ingests: 0,
            chat_input: TextInput::new(),
            extended_reasoning: false,
            chat_scroll_offset: 0,
            chat_auto_scroll: true,
            voice: VoiceCapture::new(recorder),
            status_toast: None,
            backend,
            agent_tx,
            agent_rx,
        }
    }

    pub fn execute_command(&mut self, command: &str) {
        self.input.clear();
        self.selected_index = 0;

        match command {
            "new" => {
                self.close_menu();
                self.create_case();
            }
            "delete" => {
                self.close_menu();
                self.delete_active_case();
            }
            "think" => {
                self.close_menu();
                self.toggle_extended_reasoning();
            }
            "record" => {
                self.close_menu();
                self.toggle_recording();
            }
            "help" => self.open_help(),
            "quit" => self.should_quit = true,
            other => {
                self.close_menu();
                self.show_status_toast(format!("UNKNOWN COMMAND: {other}"));
            }
        }
    }

    pub fn execute_selected(&mut self) {
        let filtered = self.filtered_items();
        if let Some(item) = filtered.get(self.selected_index) {
            let command = item.name.clone();
            self.execute_command(&command);
        }
    }

    #[must_use]
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            extended_reasoning: self.extended_reasoning,
        }
    }

    /// Model variant the next submission will use
    #[must_use]
    pub fn current_model(&self) -> &str {
        self.backend.model_name(self.analysis_options())
    }

    pub fn toggle_extended_reasoning(&mut self) {
        self.extended_reasoning = !self.extended_reasoning;
        let model = self.current_model().to_string();
        self.show_status_toast(format!("MODEL: {model}"));
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Input,
            Focus::Input => Focus::Sidebar,
        };
    }

    pub fn show_status_toast(&mut self, message: impl Into<String>) {
        self.status_toast = Some(StatusToast::new(message));
    }

    pub fn clear_expired_status_toast(&mut self) {
        let should_clear = self
            .status_toast
            .as_ref()
            .is_some_and(|toast| toast.is_expired(Duration::from_secs(3)));
        if should_clear {
            self.status_toast = None;
        }
    }

    #[must_use]
    pub fn status_toast_message(&self) -> Option<&str> {
        self.status_toast.as_ref().map(|toast| toast.message.as_str())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::agents::testing::ScriptedBackend;
    use crate::services::voice::RecordedAudio;

    /// Recorder that always yields a short silent clip
    pub struct SilentRecorder;

    impl AudioRecorder for SilentRecorder {
        fn start(&mut self) -> Result<(), VoiceError> {
            Ok(())
        }

        fn stop(&mut self) -> Result<RecordedAudio, VoiceError> {
            Ok(RecordedAudio {
                samples: vec![0.0; 160],
                sample_rate: 16_000,
                channels: 1,
            })
        }
    }

    pub fn app_with(backend: ScriptedBackend) -> App {
        App::new(Arc::new(backend), Box::new(SilentRecorder))
    }

    /// Applies every event the workers have produced so far, waiting until
    /// `done` holds or a second has passed
    pub fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while !done(app) && std::time::Instant::now() < deadline {
            app.check_agent_response();
            std::thread::sleep(Duration::from_millis(5));
        }
        app.check_agent_response();
    }
}
