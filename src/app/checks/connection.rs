use crate::app::checks::RULE;
use crate::config::toml_config::ModelConfig;
use crate::config::EnvFile;
use crate::utils::error::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BODY_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl ModelEndpoint {
    /// `.env` values win over the launcher configuration.
    pub fn resolve(config: &ModelConfig, env: Option<&EnvFile>) -> Self {
        let api_url = env
            .and_then(EnvFile::model_api_url)
            .unwrap_or(config.api_url.as_str())
            .to_string();
        let model = env
            .and_then(EnvFile::model_name)
            .unwrap_or(config.name.as_str())
            .to_string();

        Self {
            api_url,
            model,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatRequest {
    pub fn probe(model: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a helpful assistant.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "Hi! Just say 'Connection successful' if you receive this.".to_string(),
                },
            ],
            max_tokens: 50,
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Success {
        status: u16,
        reply: Option<String>,
        usage: Option<Usage>,
    },
    HttpError {
        status: u16,
        body: String,
    },
    Timeout,
    Unreachable {
        message: String,
    },
    Failed {
        message: String,
    },
}

impl ConnectionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConnectionOutcome::Success { .. })
    }
}

pub struct ConnectionTester {
    client: Client,
    endpoint: ModelEndpoint,
}

impl ConnectionTester {
    pub fn new(endpoint: ModelEndpoint) -> Result<Self> {
        let client = Client::builder().timeout(endpoint.timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &ModelEndpoint {
        &self.endpoint
    }

    pub async fn run(&self) -> ConnectionOutcome {
        let payload = ChatRequest::probe(&self.endpoint.model);
        tracing::debug!("Sending test prompt to {}", self.endpoint.api_url);

        let response = match self.client.post(&self.endpoint.api_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(e),
        };

        let status = response.status();
        tracing::debug!("Model endpoint answered with {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ConnectionOutcome::HttpError {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            };
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => ConnectionOutcome::Success {
                status: status.as_u16(),
                reply: parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message)
                    .and_then(|message| message.content),
                usage: parsed.usage,
            },
            Err(e) if e.is_timeout() => ConnectionOutcome::Timeout,
            Err(e) => ConnectionOutcome::Failed {
                message: format!("could not decode response: {}", e),
            },
        }
    }
}

fn classify_transport_error(e: reqwest::Error) -> ConnectionOutcome {
    if e.is_timeout() {
        ConnectionOutcome::Timeout
    } else if e.is_connect() {
        ConnectionOutcome::Unreachable {
            message: e.to_string(),
        }
    } else {
        ConnectionOutcome::Failed {
            message: e.to_string(),
        }
    }
}

pub fn render_header(endpoint: &ModelEndpoint) -> Vec<String> {
    vec![
        RULE.to_string(),
        "MODEL CONNECTION TEST".to_string(),
        RULE.to_string(),
        String::new(),
        format!("URL:   {}", endpoint.api_url),
        format!("Model: {}", endpoint.model),
        String::new(),
        "Sending test message...".to_string(),
    ]
}

pub fn render_outcome(outcome: &ConnectionOutcome, endpoint: &ModelEndpoint) -> Vec<String> {
    let banner = |title: &str| vec![String::new(), RULE.to_string(), title.to_string(), RULE.to_string()];
    let fmt_tokens = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string());

    match outcome {
        ConnectionOutcome::Success { status, reply, usage } => {
            let mut lines = vec![format!("Status code: {}", status)];
            lines.extend(banner("✅ CONNECTION SUCCESSFUL"));
            if let Some(reply) = reply {
                lines.push(String::new());
                lines.push("Model reply:".to_string());
                lines.push(reply.clone());
            }
            if let Some(usage) = usage {
                lines.push(String::new());
                lines.push("Tokens used:".to_string());
                lines.push(format!("  - Prompt: {}", fmt_tokens(usage.prompt_tokens)));
                lines.push(format!("  - Completion: {}", fmt_tokens(usage.completion_tokens)));
                lines.push(format!("  - Total: {}", fmt_tokens(usage.total_tokens)));
            }
            lines.push(String::new());
            lines.push("✅ The model server is working correctly!".to_string());
            lines
        }
        ConnectionOutcome::HttpError { status, body } => {
            let mut lines = vec![format!("Status code: {}", status)];
            lines.extend(banner("❌ ERROR RESPONSE"));
            lines.push(String::new());
            lines.push(format!("Status: {}", status));
            lines.push(format!("Response: {}", body));
            lines
        }
        ConnectionOutcome::Timeout => {
            let mut lines = banner("❌ TIMEOUT");
            lines.push(String::new());
            lines.push(format!(
                "The connection took too long (>{}s).",
                endpoint.timeout.as_secs()
            ));
            lines.push("The server may be overloaded or not responding.".to_string());
            lines
        }
        ConnectionOutcome::Unreachable { message } => {
            let mut lines = banner("❌ CONNECTION ERROR");
            lines.push(String::new());
            lines.push(format!("Could not connect to the server ({}).", message));
            lines.push("Check that:".to_string());
            lines.push("  1. The IP and port are correct".to_string());
            lines.push("  2. The server is running".to_string());
            lines.push("  3. No firewall is blocking the connection".to_string());
            lines.push("  4. You have network connectivity".to_string());
            lines
        }
        ConnectionOutcome::Failed { message } => {
            let mut lines = banner("❌ UNEXPECTED ERROR");
            lines.push(String::new());
            lines.push(format!("Error: {}", message));
            lines
        }
    }
}
