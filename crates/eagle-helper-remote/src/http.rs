use crate::{Translate, TranslateError, TranslatorConfig};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;

/// Reasoning models close their chain of thought with this tag; the
/// translation is whatever follows it.
pub const THINK_END_MARKER: &str = "</think>";

const SYSTEM_PROMPT: &str = "\
You are a professional language translator.
You are given a text and you need to translate it to the target language.
The first line of the request names the source and target language codes.
Translate the text accurately and literally.
Do not add any other text or comments.
Do not repeat the original text.
Only return the translated text, without the language codes.";

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP client for an OpenAI-compatible chat-completion server.
///
/// Expects:
/// - `GET  /v1/models`           : any 200 means the server is up
/// - `POST /v1/chat/completions` : non-streaming chat completion
pub struct HttpTranslator {
    config: TranslatorConfig,
    probe_agent: ureq::Agent,
    agent: ureq::Agent,
}

impl HttpTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        let probe_agent = agent_with_timeout(Duration::from_millis(config.probe_timeout_ms));
        let agent = agent_with_timeout(Duration::from_secs(config.request_timeout_secs));
        Self {
            config,
            probe_agent,
            agent,
        }
    }

    /// Capability probe. True only when `GET /v1/models` answers 200 within
    /// the probe timeout; every other outcome is false.
    pub fn able_to_translate(&self) -> bool {
        let url = self.config.models_url();
        tracing::debug!("GET {url}");
        match self.probe_agent.get(&url).call() {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(e) => {
                tracing::debug!("translation probe failed: {e}");
                false
            }
        }
    }

    /// Ask the server for a literal translation of `text`.
    pub fn help_me_translate(
        &self,
        text: &str,
        target_language: &str,
        src_language: &str,
    ) -> Result<String, TranslateError> {
        let url = self.config.completions_url();
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_owned(),
                    content: SYSTEM_PROMPT.to_owned(),
                },
                ChatMessage {
                    role: "user".to_owned(),
                    content: user_prompt(text, target_language, src_language),
                },
            ],
            temperature: 0.7,
            max_tokens: 5000,
            stream: false,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;

        tracing::debug!("POST {url} ({src_language} -> {target_language})");
        let resp = match self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(&body[..])
        {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(code)) => return Err(TranslateError::Status(code)),
            Err(e) => return Err(TranslateError::Unreachable(e.to_string())),
        };

        let code = resp.status().as_u16();
        if code != 200 {
            return Err(TranslateError::Status(code));
        }

        let mut raw = Vec::new();
        resp.into_body()
            .into_reader()
            .read_to_end(&mut raw)
            .map_err(|e| TranslateError::Unreachable(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_slice(&raw)
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TranslateError::MalformedResponse("no choices".to_owned()))?;
        extract_translation(&content)
    }
}

impl Translate for HttpTranslator {
    fn translate(
        &self,
        text: &str,
        target_language: &str,
        src_language: &str,
    ) -> Result<String, TranslateError> {
        self.help_me_translate(text, target_language, src_language)
    }
}

fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

fn user_prompt(text: &str, target_language: &str, src_language: &str) -> String {
    format!(
        "Translate the following text from {src_language} to {target_language} accurately\n{text}"
    )
}

/// Take the model output after the reasoning marker, trimmed.
pub fn extract_translation(content: &str) -> Result<String, TranslateError> {
    content
        .split_once(THINK_END_MARKER)
        .map(|(_, answer)| answer.trim().to_owned())
        .ok_or(TranslateError::MissingMarker {
            marker: THINK_END_MARKER,
        })
}
