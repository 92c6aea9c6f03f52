//! Blocking chat-completion client for the classification and enhancement
//! collaborator.
//!
//! Speaks the OpenAI-compatible `/chat/completions` API. The LLM is used
//! **only** for:
//! - Mapping free-form user text onto a declared concept
//! - Rewriting a templated explanation as patient-friendly prose
//! - A fallback reply when the user's concept is not in the ontology
//!
//! Graph queries, ranking, and templated explanations never touch the LLM.

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the chat-completion subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("no API key configured")]
    #[diagnostic(
        code(panakeia::llm::missing_api_key),
        help(
            "Set the OPENAI_API_KEY environment variable, or put api_key in \
             the [llm] table of a config file passed with --config."
        )
    )]
    MissingApiKey,

    #[error("chat request failed: {message}")]
    #[diagnostic(
        code(panakeia::llm::request_failed),
        help("Check that the base URL is reachable and the network is up.")
    )]
    RequestFailed { message: String },

    #[error("chat API returned HTTP {status}")]
    #[diagnostic(
        code(panakeia::llm::http),
        help(
            "401 means a bad API key, 404 a wrong base URL or model name, \
             429 a rate limit. Check the configuration."
        )
    )]
    Http { status: u16 },

    #[error("failed to parse chat response: {message}")]
    #[diagnostic(
        code(panakeia::llm::parse_error),
        help("The service returned an unexpected response shape.")
    )]
    ParseError { message: String },

    #[error("failed to load config file {path}: {message}")]
    #[diagnostic(
        code(panakeia::llm::config),
        help("Pass a TOML file with an [llm] table.")
    )]
    Config { path: String, message: String },
}

/// Maps free-form user text onto one of the declared concept labels.
pub trait ConceptClassifier {
    /// `Ok(None)` means the collaborator answered that no label applies.
    fn classify(&self, text: &str, labels: &[String]) -> Result<Option<String>, LlmError>;
}

/// Rewrites a templated explanation as richer prose.
pub trait ExplanationEnhancer {
    fn enhance(&self, concept: &str, related: &str, basic: &str) -> Result<String, LlmError>;
}

/// Configuration for the chat-completion client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Bearer token; required before a client can be built.
    pub api_key: Option<String>,
    /// Model for concept classification.
    pub classify_model: String,
    /// Model for explanation enhancement and fallback replies.
    pub explain_model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            classify_model: "gpt-4o".into(),
            explain_model: "gpt-3.5-turbo".into(),
            timeout_secs: 60,
        }
    }
}

/// `[llm]` table of an optional TOML config file. Every field is optional;
/// present fields override the running config.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    llm: LlmFileTable,
}

#[derive(Debug, Default, Deserialize)]
struct LlmFileTable {
    base_url: Option<String>,
    api_key: Option<String>,
    classify_model: Option<String>,
    explain_model: Option<String>,
    timeout_secs: Option<u64>,
}

impl LlmConfig {
    /// Defaults plus the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            ..Self::default()
        }
    }

    /// Overlay values from a TOML config file. Fields absent from the file
    /// keep their current values.
    pub fn merge_file(&mut self, path: &std::path::Path) -> Result<(), LlmError> {
        let text = std::fs::read_to_string(path).map_err(|e| LlmError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed: ConfigFile = toml::from_str(&text).map_err(|e| LlmError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let table = parsed.llm;
        if let Some(base_url) = table.base_url {
            self.base_url = base_url;
        }
        if let Some(api_key) = table.api_key {
            self.api_key = Some(api_key);
        }
        if let Some(classify_model) = table.classify_model {
            self.classify_model = classify_model;
        }
        if let Some(explain_model) = table.explain_model {
            self.explain_model = explain_model;
        }
        if let Some(timeout_secs) = table.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        Ok(())
    }
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

fn classify_prompt(text: &str, labels: &[String]) -> String {
    format!(
        "You are a medical terminology expert. Given the following user input, \
         identify the most relevant medical concept from this list of concepts:\n\
         {}.\n\
         If none of the concepts are relevant, respond with 'None'.\n\n\
         User Input: {text}\n\
         Relevant Concept:",
        labels.join(", ")
    )
}

fn enhance_prompt(concept: &str, related: &str, basic: &str) -> String {
    format!(
        "You are a medical expert explaining the relationship between medical concepts.\n\
         Given the following information:\n\n\
         Concept: {concept}\n\
         Related Concept: {related}\n\
         Basic Relationship: {basic}\n\n\
         Provide a clear and concise explanation of the relationship between these concepts,\n\
         suitable for a patient with limited medical knowledge. Keep it brief (under 50 words)."
    )
}

fn unknown_prompt(text: &str) -> String {
    format!(
        "You are a helpful medical assistant. A user has asked about the following:\n\n\
         User Input: {text}\n\n\
         This concept is not in your current knowledge base. Provide a brief, general response,\n\
         and suggest that the user consult a medical professional for more specific information."
    )
}

/// A reply of `none` (any case) means the classifier matched nothing.
fn normalize_classification(reply: String) -> Option<String> {
    if reply.to_lowercase() == "none" {
        None
    } else {
        Some(reply)
    }
}

/// Extract the assistant's reply from a chat-completions response body.
fn extract_reply(response: &str) -> Result<String, LlmError> {
    let json: serde_json::Value =
        serde_json::from_str(response).map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::ParseError {
            message: "no message content in response".into(),
        })?;
    Ok(content.trim().to_string())
}

/// Client for an OpenAI-compatible chat-completions API.
pub struct LlmClient {
    config: LlmConfig,
    api_key: String,
}

impl LlmClient {
    /// Build a client; fails up front if no API key is configured.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        Ok(Self { config, api_key })
    }

    /// One blocking chat-completion round trip.
    fn chat(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        tracing::debug!(model, url = %url, "chat request");

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_string(&body_str)
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => LlmError::Http { status },
                other => LlmError::RequestFailed {
                    message: other.to_string(),
                },
            })?;

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        extract_reply(&resp_str)
    }

    /// Map free text onto one of the declared concept labels.
    ///
    /// Deterministic sampling, short reply. `Ok(None)` when the model
    /// answers `None`.
    pub fn classify_concept(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Option<String>, LlmError> {
        let prompt = classify_prompt(text, labels);
        let reply = self.chat(&self.config.classify_model, &prompt, 0.0, 50)?;
        Ok(normalize_classification(reply))
    }

    /// Rewrite a templated explanation as patient-friendly prose.
    pub fn enhance_explanation(
        &self,
        concept: &str,
        related: &str,
        basic: &str,
    ) -> Result<String, LlmError> {
        let prompt = enhance_prompt(concept, related, basic);
        self.chat(&self.config.explain_model, &prompt, 0.7, 100)
    }

    /// General-purpose reply for a concept outside the ontology.
    pub fn unknown_concept_reply(&self, text: &str) -> Result<String, LlmError> {
        let prompt = unknown_prompt(text);
        self.chat(&self.config.explain_model, &prompt, 0.7, 150)
    }
}

impl ConceptClassifier for LlmClient {
    fn classify(&self, text: &str, labels: &[String]) -> Result<Option<String>, LlmError> {
        self.classify_concept(text, labels)
    }
}

impl ExplanationEnhancer for LlmClient {
    fn enhance(&self, concept: &str, related: &str, basic: &str) -> Result<String, LlmError> {
        self.enhance_explanation(concept, related, basic)
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.config.base_url)
            .field("classify_model", &self.config.classify_model)
            .field("explain_model", &self.config.explain_model)
            .finish()
    }
}
