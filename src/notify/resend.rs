use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmailError, EmailSender, OutgoingEmail, SentEmail};

/// Resend transactional email API
pub struct ResendSender {
    client: Client,
    api_base: String,
    api_key: String,
}

impl ResendSender {
    pub fn new(client: Client, api_base: String, api_key: String) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Serialize)]
struct SendBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorResponse {
    name: String,
    message: String,
}

#[async_trait]
impl EmailSender for ResendSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, EmailError> {
        let body = SendBody {
            from: &email.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            reply_to: email.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(provider_error(status.as_u16(), &text));
        }

        let sent: SendResponse = response.json().await?;
        Ok(SentEmail { id: sent.id })
    }
}

fn provider_error(status: u16, body: &str) -> EmailError {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
    EmailError::Provider {
        status,
        name: parsed.name,
        message: if parsed.message.is_empty() {
            body.to_string()
        } else {
            parsed.message
        },
    }
}
