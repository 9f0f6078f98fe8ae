//! Per-case submission state machine.
//!
//! A `SessionController` owns the Idle/Awaiting state of one case. The
//! interactive UI splits a turn into `begin`, `apply_fragment` and
//! `complete`/`fail` so fragments can arrive through the event channel;
//! `submit` drives the same steps synchronously for the command line.

use crate::agents::{AnalysisBackend, AnalysisOptions, FragmentStream};
use crate::cases::{CaseFile, CaseId, CaseStore, ChatMessage};
use crate::error::AnalysisError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Appended verbatim to the model message when a stream fails
pub const STREAM_FAILURE_NOTICE: &str = "\n\nSorry, an error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Awaiting,
}

/// What a worker needs to run an accepted submission
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub case_id: CaseId,
    pub prompt: String,
    pub files: Arc<Vec<CaseFile>>,
}

#[derive(Debug)]
pub enum TurnOutcome {
    /// Guard rejected the submission; nothing was appended
    Skipped,
    Completed,
    Failed(AnalysisError),
}

/// How a fragment sequence stopped without failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Finished,
    Cancelled,
}

#[derive(Debug)]
pub struct SessionController {
    case_id: CaseId,
    state: SessionState,
}

impl SessionController {
    pub fn new(case_id: CaseId) -> Self {
        Self {
            case_id,
            state: SessionState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.state == SessionState::Awaiting
    }

    /// Accepts a submission: appends the user message and an empty model
    /// placeholder, then moves to Awaiting.
    ///
    /// Returns `None` (and touches nothing) for blank text, a case that no
    /// longer exists, or a turn already in flight.
    pub fn begin(&mut self, store: &mut CaseStore, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_awaiting() {
            debug!(case_id = %self.case_id, "submission ignored, turn in flight");
            return None;
        }
        let files = store.get(&self.case_id)?.files_snapshot();

        store.append_message(&self.case_id, ChatMessage::user(text));
        store.append_message(&self.case_id, ChatMessage::model(""));
        self.state = SessionState::Awaiting;
        info!(case_id = %self.case_id, files = files.len(), "turn started");

        Some(PendingTurn {
            case_id: self.case_id.clone(),
            prompt: text.to_string(),
            files,
        })
    }

    /// Appends one fragment to the placeholder. Ignored unless Awaiting.
    pub fn apply_fragment(&mut self, store: &mut CaseStore, fragment: &str) {
        if !self.is_awaiting() {
            return;
        }
        store.append_to_last_model_message(&self.case_id, fragment);
    }

    pub fn complete(&mut self) {
        if self.is_awaiting() {
            info!(case_id = %self.case_id, "turn completed");
        }
        self.state = SessionState::Idle;
    }

    /// Ends the turn with the fixed notice appended to the model message
    pub fn fail(&mut self, store: &mut CaseStore, error: &AnalysisError) {
        if !self.is_awaiting() {
            return;
        }
        warn!(case_id = %self.case_id, %error, "turn failed");
        store.append_to_last_model_message(&self.case_id, STREAM_FAILURE_NOTICE);
        self.state = SessionState::Idle;
    }

    /// Runs a whole turn on the calling thread, reporting each fragment to
    /// `on_fragment` after it has been applied.
    pub fn submit<B>(
        &mut self,
        store: &mut CaseStore,
        text: &str,
        backend: &B,
        options: AnalysisOptions,
        mut on_fragment: impl FnMut(&str),
    ) -> TurnOutcome
    where
        B: AnalysisBackend + ?Sized,
    {
        let Some(turn) = self.begin(store, text) else {
            return TurnOutcome::Skipped;
        };

        let result = backend
            .stream_analysis(&turn.prompt, &turn.files, options)
            .and_then(|stream| {
                drain_stream(stream, None, |fragment| {
                    self.apply_fragment(store, &fragment);
                    on_fragment(&fragment);
                })
            });

        match result {
            Ok(_) => {
                self.complete();
                TurnOutcome::Completed
            }
            Err(error) => {
                self.fail(store, &error);
                TurnOutcome::Failed(error)
            }
        }
    }
}

/// Pulls fragments one at a time until the sequence ends, fails or `cancel`
/// is raised. A raised flag stops pulling before the next fragment.
pub fn drain_stream(
    stream: FragmentStream,
    cancel: Option<&AtomicBool>,
    mut sink: impl FnMut(String),
) -> Result<StreamEnd, AnalysisError> {
    for item in stream {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Ok(StreamEnd::Cancelled);
        }
        sink(item?);
    }
    Ok(StreamEnd::Finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedBackend;
    use crate::cases::{MessageRole, ingest_bytes};

    fn store_with_case() -> (CaseStore, CaseId) {
        let mut store = CaseStore::new();
        let id = store.create();
        (store, id)
    }

    fn transcript(store: &CaseStore, id: &CaseId) -> Vec<(MessageRole, String)> {
        store
            .get(id)
            .unwrap()
            .messages()
            .iter()
            .map(|message| (message.role, message.content.clone()))
            .collect()
    }

    #[test]
    fn test_summarize_scenario() {
        let (mut store, id) = store_with_case();
        let pdf = ingest_bytes("a.pdf", "application/pdf", b"%PDF", store.previews());
        store.add_files(&id, vec![pdf]);

        let backend = ScriptedBackend::with_fragments(&["Sum", "mary."]);
        let mut session = SessionController::new(id.clone());
        let mut seen = Vec::new();
        let outcome = session.submit(
            &mut store,
            "summarize",
            &backend,
            AnalysisOptions::default(),
            |fragment| seen.push(fragment.to_string()),
        );

        assert!(matches!(outcome, TurnOutcome::Completed));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(seen, vec!["Sum", "mary."]);
        assert_eq!(
            transcript(&store, &id),
            vec![
                (MessageRole::User, "summarize".to_string()),
                (MessageRole::Model, "Summary.".to_string()),
            ]
        );

        let calls = backend.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "summarize");
        assert_eq!(calls[0].file_names, vec!["a.pdf"]);
    }

    #[test]
    fn test_failure_keeps_partial_text_and_appends_notice() {
        let (mut store, id) = store_with_case();
        let backend = ScriptedBackend::failing_after(&["Hel", "lo", "never"], 2);
        let mut session = SessionController::new(id.clone());
        let outcome = session.submit(
            &mut store,
            "hi",
            &backend,
            AnalysisOptions::default(),
            |_| {},
        );

        assert!(matches!(outcome, TurnOutcome::Failed(AnalysisError::Remote(_))));
        assert_eq!(session.state(), SessionState::Idle);
        let messages = transcript(&store, &id);
        assert_eq!(
            messages[1].1,
            "Hello\n\nSorry, an error occurred. Please try again."
        );
    }

    #[test]
    fn test_failure_before_stream_opens() {
        let (mut store, id) = store_with_case();
        let backend = ScriptedBackend {
            fail_to_open: true,
            ..ScriptedBackend::default()
        };
        let mut session = SessionController::new(id.clone());
        let outcome = session.submit(
            &mut store,
            "hi",
            &backend,
            AnalysisOptions::default(),
            |_| {},
        );

        assert!(matches!(
            outcome,
            TurnOutcome::Failed(AnalysisError::Status { status: 503, .. })
        ));
        assert_eq!(transcript(&store, &id)[1].1, STREAM_FAILURE_NOTICE);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_blank_submission_appends_nothing() {
        let (mut store, id) = store_with_case();
        let backend = ScriptedBackend::with_fragments(&["x"]);
        let mut session = SessionController::new(id.clone());

        for text in ["", "   ", "\n\t"] {
            let outcome =
                session.submit(&mut store, text, &backend, AnalysisOptions::default(), |_| {});
            assert!(matches!(outcome, TurnOutcome::Skipped));
        }
        assert!(transcript(&store, &id).is_empty());
        assert!(backend.recorded_calls().is_empty());
    }

    #[test]
    fn test_submission_while_awaiting_is_ignored() {
        let (mut store, id) = store_with_case();
        let mut session = SessionController::new(id.clone());
        assert!(session.begin(&mut store, "first").is_some());
        assert!(session.is_awaiting());
        assert!(session.begin(&mut store, "second").is_none());
        assert_eq!(transcript(&store, &id).len(), 2);
    }

    #[test]
    fn test_missing_case_is_skipped() {
        let (mut store, id) = store_with_case();
        store.delete(&id);
        let mut session = SessionController::new(id);
        assert!(session.begin(&mut store, "hello").is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_reasoning_option_reaches_backend() {
        let (mut store, id) = store_with_case();
        let backend = ScriptedBackend::with_fragments(&["ok"]);
        let mut session = SessionController::new(id);
        session.submit(
            &mut store,
            "think hard",
            &backend,
            AnalysisOptions {
                extended_reasoning: true,
            },
            |_| {},
        );
        assert!(backend.recorded_calls()[0].options.extended_reasoning);
    }

    #[test]
    fn test_turn_snapshot_ignores_later_file_changes() {
        let (mut store, id) = store_with_case();
        let pdf = ingest_bytes("a.pdf", "application/pdf", b"%PDF", store.previews());
        store.add_files(&id, vec![pdf]);
        let mut session = SessionController::new(id.clone());
        let turn = session.begin(&mut store, "summarize").unwrap();

        store.remove_file(&id, "a.pdf");
        assert_eq!(turn.files.len(), 1);
        assert!(store.get(&id).unwrap().files().is_empty());
    }

    #[test]
    fn test_fragments_after_completion_are_ignored() {
        let (mut store, id) = store_with_case();
        let mut session = SessionController::new(id.clone());
        session.begin(&mut store, "q");
        session.apply_fragment(&mut store, "answer");
        session.complete();
        session.apply_fragment(&mut store, " late");
        assert_eq!(transcript(&store, &id)[1].1, "answer");
    }

    #[test]
    fn test_drain_stops_when_cancelled() {
        let stream: FragmentStream = Box::new(
            vec![Ok("a".to_string()), Ok("b".to_string())].into_iter(),
        );
        let cancel = AtomicBool::new(true);
        let mut seen = Vec::new();
        let end = drain_stream(stream, Some(&cancel), |fragment| seen.push(fragment)).unwrap();
        assert_eq!(end, StreamEnd::Cancelled);
        assert!(seen.is_empty());
    }
}
