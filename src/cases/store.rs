use crate::cases::{Case, CaseFile, CaseId, ChatMessage, MessageRole, PreviewRegistry};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory collection of cases, newest first, plus the active reference.
///
/// Every mutation swaps in a new file or message sequence for the touched
/// case; snapshots taken earlier keep their contents.
#[derive(Debug, Default)]
pub struct CaseStore {
    cases: Vec<Case>,
    active: Option<CaseId>,
    previews: PreviewRegistry,
    last_id_millis: i64,
    same_millis_count: u32,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    #[must_use]
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&CaseId> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn active_case(&self) -> Option<&Case> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn get(&self, id: &CaseId) -> Option<&Case> {
        self.cases.iter().find(|case| &case.id == id)
    }

    fn get_mut(&mut self, id: &CaseId) -> Option<&mut Case> {
        self.cases.iter_mut().find(|case| &case.id == id)
    }

    fn next_id(&mut self) -> CaseId {
        let millis = Local::now().timestamp_millis();
        if millis == self.last_id_millis {
            self.same_millis_count += 1;
            CaseId::new(format!("case-{}-{}", millis, self.same_millis_count))
        } else {
            self.last_id_millis = millis;
            self.same_millis_count = 0;
            CaseId::new(format!("case-{}", millis))
        }
    }

    /// Creates an empty case at the front of the list and makes it active
    pub fn create(&mut self) -> CaseId {
        let id = self.next_id();
        let case = Case {
            id: id.clone(),
            name: format!("Case #{}", self.cases.len() + 1),
            files: Arc::new(Vec::new()),
            messages: Arc::new(Vec::new()),
            created_at: Local::now(),
        };
        info!(case_id = %id, name = %case.name, "case created");
        self.cases.insert(0, case);
        self.active = Some(id.clone());
        id
    }

    /// Makes `id` the active case. An id that names no case leaves no case active.
    pub fn select(&mut self, id: &CaseId) {
        if self.get(id).is_some() {
            self.active = Some(id.clone());
        } else {
            debug!(case_id = %id, "selected unknown case");
            self.active = None;
        }
    }

    /// Removes a case and releases its previews. Returns false if absent.
    pub fn delete(&mut self, id: &CaseId) -> bool {
        let Some(position) = self.cases.iter().position(|case| &case.id == id) else {
            return false;
        };
        let case = self.cases.remove(position);
        for file in case.files.iter() {
            self.previews.release(&file.preview);
        }
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        info!(case_id = %id, "case deleted");
        true
    }

    /// Appends files to a case. A file whose name is already present replaces
    /// that entry in place.
    pub fn add_files(&mut self, id: &CaseId, incoming: Vec<CaseFile>) {
        let previews = self.previews.clone();
        let Some(case) = self.get_mut(id) else {
            for file in &incoming {
                previews.release(&file.preview);
            }
            return;
        };

        let mut files = case.files.as_ref().clone();
        for file in incoming {
            if let Some(existing) = files.iter_mut().find(|existing| existing.name == file.name) {
                previews.release(&existing.preview);
                *existing = file;
            } else {
                files.push(file);
            }
        }
        case.files = Arc::new(files);
    }

    /// Removes every file named `name` from a case
    pub fn remove_file(&mut self, id: &CaseId, name: &str) {
        let previews = self.previews.clone();
        let Some(case) = self.get_mut(id) else {
            return;
        };
        if !case.files.iter().any(|file| file.name == name) {
            return;
        }

        let (removed, kept): (Vec<CaseFile>, Vec<CaseFile>) = case
            .files
            .iter()
            .cloned()
            .partition(|file| file.name == name);
        for file in &removed {
            previews.release(&file.preview);
        }
        case.files = Arc::new(kept);
    }

    pub fn append_message(&mut self, id: &CaseId, message: ChatMessage) {
        if let Some(case) = self.get_mut(id) {
            Arc::make_mut(&mut case.messages).push(message);
        }
    }

    /// Concatenates `text` onto the last message if it is a model message.
    /// Anything else is silently ignored. Returns whether text was appended.
    pub fn append_to_last_model_message(&mut self, id: &CaseId, text: &str) -> bool {
        let Some(case) = self.get_mut(id) else {
            return false;
        };
        let is_model = case
            .messages
            .last()
            .is_some_and(|message| message.role == MessageRole::Model);
        if !is_model {
            return false;
        }
        match Arc::make_mut(&mut case.messages).last_mut() {
            Some(last) => {
                last.content.push_str(text);
                true
            }
            None => false,
        }
    }
}
