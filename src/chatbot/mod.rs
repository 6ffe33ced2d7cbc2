//! Donation assistant backed by a hosted LLM.

pub mod gemini;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use gemini::GeminiChat;

const ACKNOWLEDGEMENT: &str =
    "I understand my role as a Food Donation Assistant. How can I help with food donations today?";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: ChatContext,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

/// Dashboard figures the client passes along so answers can reference them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatContext {
    pub user_donation_count: u64,
    pub total_community_donations: u64,
    pub pending_requests: u64,
    pub user_has_donated: bool,
    pub recent_donation_date: Option<String>,
    pub top_categories: Vec<String>,
    pub is_logged_in: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    fn model(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("No response received from the model")]
    EmptyReply,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the next model turn for a conversation ending in a user turn.
    async fn generate(&self, turns: &[Turn]) -> Result<String, ChatError>;
}

pub fn system_prompt(ctx: &ChatContext) -> String {
    let mut facts = vec![
        format!("- User has made {} donations.", ctx.user_donation_count),
        format!(
            "- The community has made {} donations total.",
            ctx.total_community_donations
        ),
        format!(
            "- There are {} pending food requests awaiting fulfillment.",
            ctx.pending_requests
        ),
        format!(
            "- User {}.",
            if ctx.user_has_donated {
                "has donated before"
            } else {
                "has not donated yet"
            }
        ),
    ];
    if let Some(date) = ctx.recent_donation_date.as_deref().filter(|d| !d.is_empty()) {
        facts.push(format!("- User's most recent donation was on {}.", date));
    }
    facts.push(format!(
        "- Top donation categories: {}.",
        ctx.top_categories.join(", ")
    ));
    facts.push(format!(
        "- User is {}.",
        if ctx.is_logged_in {
            "logged in"
        } else {
            "not logged in"
        }
    ));

    format!(
        "You are a helpful Food Donation Assistant chatbot for a food donation platform.\n\n\
         Current context:\n{}\n\n\
         Your role:\n\
         1. Help users understand their donation impact and community contribution\n\
         2. Provide information about needed food items and areas that need support\n\
         3. Guide users on how to make monetary or food donations\n\
         4. Answer questions about the platform's features\n\
         5. Be encouraging and positive about donation efforts\n\n\
         Be concise, helpful, and friendly. If you don't know something specific, \
         suggest where they might find that information on the dashboard.",
        facts.join("\n")
    )
}

/// Prompt, acknowledgement, prior history (minus the client's greeting), then
/// the new message.
pub fn build_conversation(req: &ChatRequest) -> Vec<Turn> {
    let mut turns = vec![Turn::user(system_prompt(&req.context)), Turn::model(ACKNOWLEDGEMENT)];

    turns.extend(req.history.iter().skip(1).map(|msg| Turn {
        speaker: match msg.role.as_str() {
            "assistant" | "model" => Speaker::Model,
            _ => Speaker::User,
        },
        text: msg.content.clone(),
    }));

    turns.push(Turn::user(req.message.clone()));
    turns
}

pub async fn reply(model: Option<&dyn ChatModel>, req: ChatRequest) -> (StatusCode, Value) {
    let Some(model) = model else {
        tracing::error!("Chat API key is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "API key not configured" }),
        );
    };

    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Message is required" }),
        );
    }

    tracing::debug!("Sending chat message: {}", req.message);
    let turns = build_conversation(&req);

    match model.generate(&turns).await {
        Ok(text) if !text.trim().is_empty() => (StatusCode::OK, json!({ "response": text })),
        Ok(_) => failure(ChatError::EmptyReply),
        Err(e) => failure(e),
    }
}

fn failure(e: ChatError) -> (StatusCode, Value) {
    tracing::error!("Chatbot error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Failed to process request", "details": e.to_string() }),
    )
}
