use super::AgentEvent;
use crate::app::{App, Focus};
use crate::cases::{CaseId, ingest_batch};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

impl App {
    pub fn create_case(&mut self) {
        self.store.create();
        self.sidebar_index = 0;
        self.focus = Focus::Input;
        self.reset_chat_scroll();
    }

    /// Opens the case highlighted in the sidebar
    pub fn select_highlighted_case(&mut self) {
        let Some(id) = self.highlighted_case_id() else {
            return;
        };
        self.store.select(&id);
        self.focus = Focus::Input;
        self.reset_chat_scroll();
    }

    pub fn delete_highlighted_case(&mut self) {
        if let Some(id) = self.highlighted_case_id() {
            self.delete_case(&id);
        }
    }

    pub fn delete_active_case(&mut self) {
        if let Some(id) = self.store.active_id().cloned() {
            self.delete_case(&id);
        }
    }

    /// Removes a case and stops any turn still streaming into it
    pub fn delete_case(&mut self, id: &CaseId) {
        if let Some(cancel) = self.cancel_flags.remove(id) {
            cancel.store(true, Ordering::Relaxed);
            info!(case_id = %id, "cancelled in-flight analysis");
        }
        self.sessions.remove(id);
        if self.store.delete(id) {
            self.clamp_sidebar_index();
            self.show_status_toast("CASE DELETED");
        }
    }

    #[must_use]
    pub fn highlighted_case_id(&self) -> Option<CaseId> {
        self.store
            .cases()
            .get(self.sidebar_index)
            .map(|case| case.id().clone())
    }

    fn clamp_sidebar_index(&mut self) {
        let count = self.store.cases().len();
        if self.sidebar_index >= count {
            self.sidebar_index = count.saturating_sub(1);
        }
    }

    /// Reads a batch of files on a worker thread. The batch lands in the
    /// case that was active when the command ran. Returns false if the
    /// command was rejected before any work started.
    pub fn attach_files(&mut self, paths: &[String]) -> bool {
        let Some(case_id) = self.store.active_id().cloned() else {
            self.show_status_toast("NO ACTIVE CASE");
            return false;
        };
        if paths.is_empty() {
            self.show_status_toast("USAGE: :attach <path>...");
            return false;
        }

        let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        let previews = self.store.previews().clone();
        let tx = self.agent_tx.clone();
        self.pending_ingests += 1;

        std::thread::spawn(move || {
            let event = match ingest_batch(&paths, &previews) {
                Ok(files) => AgentEvent::FilesIngested { case_id, files },
                Err(error) => AgentEvent::IngestFailed { case_id, error },
            };
            let _ = tx.send(event);
        });
        true
    }

    /// Removes a file from the active case. Returns false if nothing matched.
    pub fn detach_file(&mut self, name: &str) -> bool {
        let Some(case_id) = self.store.active_id().cloned() else {
            self.show_status_toast("NO ACTIVE CASE");
            return false;
        };
        if name.is_empty() {
            self.show_status_toast("USAGE: :detach <name>");
            return false;
        }
        let present = self
            .store
            .get(&case_id)
            .is_some_and(|case| case.files().iter().any(|file| file.name == name));
        if !present {
            self.show_status_toast(format!("NO FILE NAMED {name}"));
            return false;
        }
        self.store.remove_file(&case_id, name);
        self.show_status_toast("FILE REMOVED");
        true
    }

    pub(crate) fn finish_ingest(&mut self) {
        self.pending_ingests = self.pending_ingests.saturating_sub(1);
    }

    pub(crate) fn report_ingest_failure(&mut self, case_id: &CaseId, message: &str) {
        warn!(case_id = %case_id, error = message, "file batch dropped");
        self.show_status_toast("COULD NOT READ FILES");
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::testing::ScriptedBackend;
    use crate::app::test_support::{app_with, pump_until};
    use std::io::Write;

    #[test]
    fn test_select_from_sidebar() {
        let mut app = app_with(ScriptedBackend::default());
        app.create_case();
        app.create_case();
        let older = app.store.cases()[1].id().clone();

        app.sidebar_index = 1;
        app.select_highlighted_case();
        assert_eq!(app.store.active_id(), Some(&older));
    }

    #[test]
    fn test_delete_highlighted_clamps_index() {
        let mut app = app_with(ScriptedBackend::default());
        app.create_case();
        app.create_case();
        app.sidebar_index = 1;
        app.delete_highlighted_case();
        assert_eq!(app.store.cases().len(), 1);
        assert_eq!(app.sidebar_index, 0);
        assert!(app.store.active_id().is_some());
    }

    #[test]
    fn test_attach_and_detach() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.7")
            .unwrap();

        let mut app = app_with(ScriptedBackend::default());
        app.create_case();
        assert!(app.attach_files(&[path.display().to_string()]));
        pump_until(&mut app, |app| app.pending_ingests == 0);

        let case = app.store.active_case().unwrap();
        assert_eq!(case.files().len(), 1);
        assert_eq!(case.files()[0].name, "notes.pdf");

        assert!(app.detach_file("notes.pdf"));
        assert!(app.store.active_case().unwrap().files().is_empty());
        assert_eq!(app.store.previews().live_count(), 0);
    }

    #[test]
    fn test_failed_batch_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.png");
        std::fs::write(&good, b"png").unwrap();
        let missing = dir.path().join("missing.pdf");

        let mut app = app_with(ScriptedBackend::default());
        app.create_case();
        app.attach_files(&[good.display().to_string(), missing.display().to_string()]);
        pump_until(&mut app, |app| app.pending_ingests == 0);

        assert!(app.store.active_case().unwrap().files().is_empty());
        assert_eq!(app.store.previews().live_count(), 0);
        assert_eq!(app.status_toast_message(), Some("COULD NOT READ FILES"));
    }

    #[test]
    fn test_attach_without_case() {
        let mut app = app_with(ScriptedBackend::default());
        assert!(!app.attach_files(&["a.pdf".to_string()]));
        assert_eq!(app.pending_ingests, 0);
        assert_eq!(app.status_toast_message(), Some("NO ACTIVE CASE"));
    }
}
