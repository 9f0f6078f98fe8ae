use crate::cases::CaseFile;

/// Instruction sent alongside a voice recording
pub const TRANSCRIBE_INSTRUCTION: &str = "Transcribe the following audio recording.";

/// Lists each attachment as `- name (category)`, one per line
#[must_use]
pub fn file_context(files: &[CaseFile]) -> String {
    if files.is_empty() {
        return "No files provided.".to_string();
    }
    files
        .iter()
        .map(|file| format!("- {} ({})", file.name, file.category))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the text block that follows the inline attachments
#[must_use]
pub fn build_analysis_prompt(user_prompt: &str, files: &[CaseFile]) -> String {
    format!(
        "You are a highly intelligent analysis assistant. Analyze the following documents \
         and the user's query to provide a comprehensive and accurate response. \
         The user has provided the following files for context:\n\
         \n\
         {file_context}\n\
         \n\
         User query: \"{user_prompt}\"\n\
         \n\
         Based on the provided files and the query, please formulate your response.",
        file_context = file_context(files),
    )
}
