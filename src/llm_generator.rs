use crate::error::{Error, Result};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::prompt::{self, PromptRequest};
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Generates a raw ffmpeg command string from a validated prompt request.
///
/// Implementations may suspend for network latency. The returned text is
/// opaque to the caller; no semantic validation happens before tokenization.
#[async_trait]
pub trait CommandGenerator: Send + Sync {
    async fn generate(&self, api_key: &str, request: &PromptRequest) -> Result<String>;
}

/// Production generator backed by the OpenAI chat completions endpoint.
pub struct OpenAiGenerator {
    http: Box<dyn HttpClient>,
}

impl OpenAiGenerator {
    pub fn new() -> Self {
        Self::with_http_client(Box::new(ReqwestHttpClient::new()))
    }

    /// Builds a generator with an injected HTTP client (for testing).
    pub fn with_http_client(http: Box<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn build_request_body(request: &PromptRequest) -> serde_json::Value {
        json!({
            "model": prompt::MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": prompt::SYSTEM_INSTRUCTION
                },
                {
                    "role": "user",
                    "content": request.render()
                }
            ],
            "temperature": prompt::TEMPERATURE,
            "max_tokens": prompt::MAX_TOKENS
        })
    }

    fn extract_command_text(body: &str) -> Result<String> {
        let parsed: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            warn!("Failed to parse backend response as JSON: {}", e);
            Error::Transport(format!("unparseable backend response: {}", e))
        })?;

        let content = parsed
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            warn!("Backend response carried no command text");
            return Err(Error::EmptyResponse);
        }

        Ok(content.to_string())
    }
}

impl Default for OpenAiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandGenerator for OpenAiGenerator {
    async fn generate(&self, api_key: &str, request: &PromptRequest) -> Result<String> {
        if api_key.trim().is_empty() {
            return Err(Error::Auth("no API key provided".to_string()));
        }

        info!(
            "Requesting command generation for {} file(s)",
            request.file_paths().len()
        );

        let body = Self::build_request_body(request);
        let auth_header = format!("Bearer {}", api_key);
        let headers = [
            ("Authorization", auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self.http.post_json(COMPLETIONS_URL, &headers, &body).await?;

        match response.status {
            401 | 403 => {
                return Err(Error::Auth(
                    "the generation backend rejected the API key".to_string(),
                ));
            }
            status if !response.is_success() => {
                warn!("Backend returned HTTP {}", status);
                return Err(Error::Transport(format!(
                    "backend returned HTTP {}",
                    status
                )));
            }
            _ => {}
        }

        Self::extract_command_text(&response.body)
    }
}

/// Deterministic offline generator keyed off instruction keywords.
///
/// Enabled via `NETA_USE_MOCK`; also drives the integration tests. Every
/// command it produces follows the same conventions the real backend is
/// instructed to follow, so its output is always tokenizable.
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Derives an output path with the `_neta` suffix and the given extension.
    fn output_path(input: &str, extension: &str) -> String {
        let normalized = crate::paths::normalize_separators(input);
        match normalized.rfind('.') {
            Some(dot) if dot > normalized.rfind('/').map_or(0, |s| s + 1) => {
                format!("{}_neta.{}", &normalized[..dot], extension)
            }
            _ => format!("{}_neta.{}", normalized, extension),
        }
    }

    fn mock_command(instruction: &str, input: &str) -> String {
        let lower = instruction.to_lowercase();
        let input = crate::paths::normalize_separators(input);

        if lower.contains("audio") || lower.contains("mp3") {
            format!(
                "ffmpeg -i \"{}\" -vn -acodec libmp3lame \"{}\"",
                input,
                Self::output_path(&input, "mp3")
            )
        } else if lower.contains("gif") {
            format!(
                "ffmpeg -i \"{}\" -vf \"fps=10,scale=480:-1\" \"{}\"",
                input,
                Self::output_path(&input, "gif")
            )
        } else if lower.contains("720") || lower.contains("compress") {
            format!(
                "ffmpeg -i \"{}\" -vf scale=-2:720 -c:v libx264 -crf 23 -preset veryfast \"{}\"",
                input,
                Self::output_path(&input, "mp4")
            )
        } else {
            // Container conversions with no re-encode requested get a
            // lossless stream copy, matching the real backend's instructions.
            format!(
                "ffmpeg -i \"{}\" -c copy \"{}\"",
                input,
                Self::output_path(&input, "mp4")
            )
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandGenerator for MockGenerator {
    async fn generate(&self, _api_key: &str, request: &PromptRequest) -> Result<String> {
        info!("Using mock generator (NETA_USE_MOCK)");
        let first_input = &request.file_paths()[0];
        Ok(Self::mock_command(request.instruction(), first_input))
    }
}
