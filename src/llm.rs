use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, instrument};
use crate::enrichment::EnrichmentResult;
use crate::error::{AppError, Result, Upstream};

pub const TOOL_NAME: &str = "enrich_company";

/// How many discovered links are listed in the prompt.
pub const LINK_INVENTORY_LIMIT: usize = 30;

const SYSTEM_PROMPT: &str = "You are an expert VC analyst. Analyze the provided website content and extract structured intelligence about the company. Be concise and insightful. Focus on what matters for venture capital due diligence.";

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    tools: Vec<Value>,
    tool_choice: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// Function declaration whose parameters mirror [`EnrichmentResult`].
pub fn enrich_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "Return structured company intelligence extracted from website content.",
            "parameters": {
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "2-3 sentence summary of what the company does, their value proposition, and target market."
                    },
                    "what_they_do": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "3-6 bullet points describing key products, services, or capabilities."
                    },
                    "keywords": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "5-10 relevant keywords/tags for this company (industry, tech, market)."
                    },
                    "signals": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "signal": { "type": "string", "description": "Signal name (e.g. 'Blog exists', 'Careers page', 'Pricing page')" },
                                "detected": { "type": "boolean" },
                                "details": { "type": "string", "description": "Brief detail about this signal" }
                            },
                            "required": ["signal", "detected"]
                        },
                        "description": "Signals detected: blog, careers page, pricing page, documentation, social media links, customer logos, testimonials, press mentions, API docs, open source presence."
                    },
                    "sources": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Key URLs found on the site (blog, careers, pricing, docs, etc.)"
                    }
                },
                "required": ["summary", "what_they_do", "keywords", "signals", "sources"],
                "additionalProperties": false
            }
        }
    })
}

pub fn build_prompt(source_url: &str, corpus: &str, links: &[String]) -> String {
    let inventory = links
        .iter()
        .take(LINK_INVENTORY_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this company website content (main page + key subpages) and extract structured data.\n\nWebsite: {}\n\nContent:\n{}\n\nLinks found on the site:\n{}",
        source_url, corpus, inventory
    )
}

/// Maps a non-success status from the model service onto the error taxonomy.
pub fn classify_status(status: StatusCode) -> AppError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => AppError::QuotaExhausted,
        other => AppError::ExtractionFailed {
            status: other.as_u16(),
        },
    }
}

fn parse_tool_arguments(body: &str) -> Result<EnrichmentResult> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AppError::SchemaViolation(format!("Unreadable response: {}", e)))?;

    let call = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.tool_calls.into_iter().next())
        .ok_or_else(|| AppError::SchemaViolation("No tool call in response".to_string()))?;

    if let Some(name) = call.function.name.as_deref() {
        if name != TOOL_NAME {
            return Err(AppError::SchemaViolation(format!("Unexpected tool call: {}", name)));
        }
    }

    let arguments = call
        .function
        .arguments
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AppError::SchemaViolation("Tool call has no arguments".to_string()))?;

    serde_json::from_str(&arguments)
        .map_err(|e| AppError::SchemaViolation(format!("Invalid tool arguments: {}", e)))
}

/// Client for the generative model gateway, forced into a single
/// structured function call.
#[derive(Clone)]
pub struct ExtractionClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ExtractionClient {
    pub fn new(http: Client, base_url: &str, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    #[instrument(skip(self, corpus, links), fields(model = %self.model, corpus_chars = corpus.chars().count()))]
    pub async fn extract(&self, corpus: &str, links: &[String], source_url: &str) -> Result<EnrichmentResult> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                Message {
                    role: "user".into(),
                    content: build_prompt(source_url, corpus, links),
                },
            ],
            tools: vec![enrich_tool()],
            tool_choice: json!({ "type": "function", "function": { "name": TOOL_NAME } }),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::transport(Upstream::Model, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %detail, "AI gateway error");
            return Err(classify_status(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::transport(Upstream::Model, e))?;

        match parse_tool_arguments(&text) {
            Ok(result) => {
                debug!(signals = result.signals.len(), "Structured result received");
                Ok(result)
            }
            Err(e) => {
                error!(error = ?e, body = %text, "No structured data in AI response");
                Err(e)
            }
        }
    }
}
