use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatError, ChatModel, Speaker, Turn};

/// Google Generative Language `generateContent` endpoint
pub struct GeminiChat {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiChat {
    pub fn new(client: Client, api_base: String, api_key: String, model: String) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: Speaker,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn generate(&self, turns: &[Turn]) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(turns))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(text);
            return Err(ChatError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        first_candidate_text(parsed).ok_or(ChatError::EmptyReply)
    }
}

fn request_body(turns: &[Turn]) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: turns
            .iter()
            .map(|t| Content {
                role: t.speaker,
                parts: [Part { text: &t.text }],
            })
            .collect(),
    }
}

fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect();
    Some(text).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_provider_role_names() {
        let turns = vec![
            Turn {
                speaker: Speaker::User,
                text: "hi".into(),
            },
            Turn {
                speaker: Speaker::Model,
                text: "hello".into(),
            },
        ];
        let json = serde_json::to_value(request_body(&turns)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "hello");
    }

    #[test]
    fn reply_text_joins_candidate_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Fresh "},{"text":"fruit."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_candidate_text(response).as_deref(), Some("Fresh fruit."));
    }

    #[test]
    fn no_candidates_is_none() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(first_candidate_text(response).is_none());
    }

    #[test]
    fn endpoint_includes_model() {
        let chat = GeminiChat::new(
            Client::new(),
            "https://example.test/v1beta/".into(),
            "k".into(),
            "gemini-2.0-flash".into(),
        );
        assert_eq!(
            chat.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
