use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RewriteError;
use crate::flow::flow_model::Flow;

/// An optional collaborator that may rewrite the generated replay script.
///
/// `Ok(None)` means the collaborator declined (e.g. no credentials); the
/// baseline script stands on its own either way.
pub trait ScriptRewriter {
    fn rewrite(&self, flow: &Flow, script: &str) -> Result<Option<String>, RewriteError>;
}

/// Never rewrites.
pub struct NoRewriter;

impl ScriptRewriter for NoRewriter {
    fn rewrite(&self, _flow: &Flow, _script: &str) -> Result<Option<String>, RewriteError> {
        Ok(None)
    }
}

/// Build the rewrite prompt from the flow JSON and the baseline script.
pub fn build_prompt(flow: &Flow, script: &str) -> Result<String, RewriteError> {
    let flow_json = serde_json::to_string_pretty(flow)?;
    Ok([
        "You are improving a Playwright script generated from recorded browser events.",
        "Goals:",
        "- Keep behavior equivalent to the flow.",
        "- Collapse redundant steps (e.g., focus before click).",
        "- Prefer robust selectors (data-testid, role/name).",
        "- Use selectOption for <select> inputs.",
        "- Keep the script runnable as-is.",
        "Return only the updated TypeScript code. Do not include markdown fences.",
        "",
        "Flow JSON:",
        &flow_json,
        "",
        "Base script:",
        script,
    ]
    .join("\n"))
}

/// Remove a surrounding markdown code fence, if the model added one.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

// ============================================================================
// OpenAI chat completions
// ============================================================================

pub struct OpenAiRewriter {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAiRewriter {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ScriptRewriter for OpenAiRewriter {
    fn rewrite(&self, flow: &Flow, script: &str) -> Result<Option<String>, RewriteError> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                debug!("OPENAI_API_KEY not set; skipping script rewrite");
                return Ok(None);
            }
        };

        let prompt = build_prompt(flow, script)?;
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.2,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a senior QA engineer who writes stable Playwright scripts.",
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        info!(model = %self.model, "requesting script rewrite");
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RewriteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json()?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(RewriteError::MissingContent)?;

        Ok(Some(strip_code_fences(&content)))
    }
}

// ============================================================================
// Ollama (local)
// ============================================================================

pub struct OllamaRewriter {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaRewriter {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl ScriptRewriter for OllamaRewriter {
    fn rewrite(&self, flow: &Flow, script: &str) -> Result<Option<String>, RewriteError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt: build_prompt(flow, script)?,
            stream: false,
        };

        info!(model = %self.model, endpoint = %self.endpoint, "requesting script rewrite");
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.post(&self.endpoint).json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RewriteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaResponse = response.json()?;
        if parsed.response.trim().is_empty() {
            return Err(RewriteError::MissingContent);
        }
        Ok(Some(strip_code_fences(&parsed.response)))
    }
}
