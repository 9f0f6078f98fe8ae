use crate::agents::prompt::{TRANSCRIBE_INSTRUCTION, build_analysis_prompt};
use crate::agents::{AnalysisBackend, AnalysisOptions, FragmentStream};
use crate::cases::CaseFile;
use crate::config::{GeminiConfig, ModelsConfig};
use crate::error::AnalysisError;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client for the Gemini `generateContent` endpoints
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    models: ModelsConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateResponse {
    /// Visible text of the first candidate (thought summaries skipped)
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl RequestPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline(file: &CaseFile) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: file.mime_type.clone(),
                data: file.encoded_content.clone(),
            }),
        }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        gemini: &GeminiConfig,
        models: &ModelsConfig,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(gemini.timeout_secs))
            .build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: gemini.base_url.trim_end_matches('/').to_string(),
            models: models.clone(),
            client,
        })
    }

    fn analysis_request(
        &self,
        prompt: &str,
        files: &[CaseFile],
        options: AnalysisOptions,
    ) -> GenerateRequest {
        let mut parts: Vec<RequestPart> = files.iter().map(RequestPart::inline).collect();
        parts.push(RequestPart::text(build_analysis_prompt(prompt, files)));

        let generation_config = options.extended_reasoning.then(|| GenerationConfig {
            thinking_config: ThinkingConfig {
                thinking_budget: self.models.thinking_budget,
            },
        });

        GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts,
            }],
            generation_config,
        }
    }

    fn transcription_request(audio: &CaseFile) -> GenerateRequest {
        GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::inline(audio),
                    RequestPart::text(TRANSCRIBE_INSTRUCTION),
                ],
            }],
            generation_config: None,
        }
    }

    fn post(&self, url: &str, request: &GenerateRequest) -> Result<Response, AnalysisError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl AnalysisBackend for GeminiClient {
    fn stream_analysis(
        &self,
        prompt: &str,
        files: &[CaseFile],
        options: AnalysisOptions,
    ) -> Result<FragmentStream, AnalysisError> {
        let model = self.model_name(options);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        );
        info!(model, files = files.len(), "starting analysis stream");

        let request = self.analysis_request(prompt, files, options);
        let response = self.post(&url, &request)?;
        Ok(Box::new(SseFragments::new(BufReader::new(response))))
    }

    fn transcribe(&self, audio: &CaseFile) -> Result<String, AnalysisError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.models.transcription
        );
        info!(model = %self.models.transcription, size = audio.size_bytes, "transcribing audio");

        let response = self.post(&url, &Self::transcription_request(audio))?;
        let payload: GenerateResponse = response.json()?;
        if let Some(error) = payload.error {
            return Err(AnalysisError::Remote(error.message));
        }
        let text = payload.text().trim().to_string();
        if text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(text)
    }

    fn model_name(&self, options: AnalysisOptions) -> &str {
        if options.extended_reasoning {
            &self.models.reasoning
        } else {
            &self.models.fast
        }
    }
}

/// Decodes a Server-Sent Events body into text fragments.
///
/// Yields one fragment per `data:` event that carries text. The first error
/// ends the sequence.
pub struct SseFragments<R> {
    reader: R,
    line: String,
    done: bool,
}

impl<R: BufRead> SseFragments<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for SseFragments<R> {
    type Item = Result<String, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    debug!("analysis stream finished");
                }
                Ok(_) => {
                    let Some(payload) = self.line.trim().strip_prefix("data:") else {
                        continue;
                    };
                    let payload = payload.trim();
                    if payload.is_empty() || payload == "[DONE]" {
                        continue;
                    }
                    match decode_event(payload) {
                        Ok(Some(text)) => return Some(Ok(text)),
                        Ok(None) => {}
                        Err(error) => {
                            self.done = true;
                            return Some(Err(error));
                        }
                    }
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error.into()));
                }
            }
        }
        None
    }
}

fn decode_event(payload: &str) -> Result<Option<String>, AnalysisError> {
    let event: GenerateResponse = serde_json::from_str(payload)?;
    if let Some(error) = event.error {
        return Err(AnalysisError::Remote(error.message));
    }
    let text = event.text();
    Ok((!text.is_empty()).then_some(text))
}
