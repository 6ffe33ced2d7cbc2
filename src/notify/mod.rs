//! Post-donation "thank you" email.
//!
//! Delivery is best effort and depends on three switches: development mode,
//! the production flag, and a per-request `sendActualEmail` override. Outside
//! production, real sends are redirected to the one verified address the
//! provider accepts for an unverified sending domain.

pub mod resend;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::EmailConfig;

pub use resend::ResendSender;

pub const SIMULATED_ID: &str = "dev-mode-simulated-id";
const SUBJECT: &str = "Thank You for Your Food Donation!";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouRequest {
    pub email: Option<String>,
    pub food_name: Option<String>,
    pub name: Option<String>,
    pub send_actual_email: Option<bool>,
    pub user_data: Option<UserData>,
}

/// Signed-in donor details forwarded by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserData {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderInfo {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_recipient: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_info: Option<SenderInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("{name}: {message}")]
    Provider {
        status: u16,
        name: String,
        message: String,
    },

    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl EmailError {
    /// The provider refuses recipients other than the account owner until a
    /// sending domain is verified.
    pub fn is_testing_restriction(&self) -> bool {
        matches!(
            self,
            EmailError::Provider { name, message, .. }
                if name == "validation_error" && message.contains("can only send testing emails")
        )
    }

    fn detail(&self) -> String {
        match self {
            EmailError::Provider { message, .. } if !message.is_empty() => message.clone(),
            EmailError::Provider { .. } => "Unknown error from email provider".to_string(),
            EmailError::Http(e) => e.to_string(),
        }
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, EmailError>;
}

/// What to do with a validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Log the would-be message and report a simulated success
    Simulate,
    /// Hand the message to the provider, addressed to `to`
    Send { to: String },
}

pub fn decide(config: &EmailConfig, recipient: &str, send_actual: bool) -> Delivery {
    let verified = !config.verified_address.is_empty() && recipient == config.verified_address;

    if config.development && !send_actual && !config.production && !verified {
        return Delivery::Simulate;
    }

    let to = if send_actual || config.production || config.verified_address.is_empty() {
        recipient.to_string()
    } else {
        config.verified_address.clone()
    };
    Delivery::Send { to }
}

/// Run the full thank-you flow and produce the status and body to return.
pub async fn send_thank_you(
    config: &EmailConfig,
    sender: Option<&dyn EmailSender>,
    req: ThankYouRequest,
) -> (StatusCode, ThankYouResponse) {
    let Some(sender) = sender else {
        tracing::error!("Email API key is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            ThankYouResponse {
                success: false,
                message: "Email service configuration error".into(),
                details: Some("Missing API key".into()),
                ..Default::default()
            },
        );
    };

    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let food_name = req.food_name.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() || food_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            ThankYouResponse {
                success: false,
                message: "Validation error".into(),
                details: Some("Email and food name are required".into()),
                ..Default::default()
            },
        );
    }

    let send_actual = req.send_actual_email.unwrap_or(false);
    let user_data = req.user_data.as_ref();
    let user_name = user_data.and_then(|u| non_empty(u.name.as_deref()));
    let recipient_name = user_name
        .or_else(|| non_empty(req.name.as_deref()))
        .unwrap_or("Donor");
    let sender_name = user_name.unwrap_or("Food Share Team");
    let sender_email = user_data.and_then(|u| non_empty(u.email.as_deref()));

    let to = match decide(config, email, send_actual) {
        Delivery::Simulate => {
            tracing::info!(
                "Development mode: thank-you for {} not sent to {}",
                food_name,
                email
            );
            return (
                StatusCode::OK,
                ThankYouResponse {
                    success: true,
                    email_sent: Some(false),
                    simulated: Some(true),
                    id: Some(SIMULATED_ID.into()),
                    actual_recipient: Some(email.to_string()),
                    message: format!("DEVELOPMENT MODE: No actual email was sent to {}.", email),
                    details: Some(
                        "In development, emails are NOT delivered by default. \
                         Set sendActualEmail=true to send actual emails."
                            .into(),
                    ),
                    ..Default::default()
                },
            );
        }
        Delivery::Send { to } => to,
    };

    let redirected_from = (to != email).then_some(email);
    let outgoing = OutgoingEmail {
        from: config.from.clone(),
        to: to.clone(),
        subject: SUBJECT.to_string(),
        html: render_body(
            recipient_name,
            food_name,
            sender_name,
            sender_email,
            redirected_from,
        ),
        reply_to: sender_email.map(String::from),
    };

    tracing::info!("Sending thank-you email from {} to {}", outgoing.from, to);

    match sender.send(&outgoing).await {
        Ok(sent) => {
            tracing::info!("Email sent with id {}", sent.id);
            (
                StatusCode::OK,
                ThankYouResponse {
                    success: true,
                    email_sent: Some(true),
                    id: Some(sent.id.clone()),
                    actual_recipient: Some(to.clone()),
                    message: format!("Email successfully sent to {} with ID: {}", to, sent.id),
                    details: Some("This was a real email delivery, not a simulation.".into()),
                    sender_info: user_data.map(|_| SenderInfo {
                        name: sender_name.to_string(),
                        email: sender_email.map(String::from),
                    }),
                    ..Default::default()
                },
            )
        }
        Err(e) if e.is_testing_restriction() => {
            tracing::warn!("Email provider limited to testing recipients: {}", e);
            (
                StatusCode::OK,
                ThankYouResponse {
                    success: false,
                    email_sent: Some(false),
                    dev_mode: Some(true),
                    message: "Development mode email limitation".into(),
                    details: Some(
                        "In development, emails can only be sent to verified addresses. \
                         Your donation was recorded successfully."
                            .into(),
                    ),
                    ..Default::default()
                },
            )
        }
        Err(e) => {
            tracing::error!("Email provider error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ThankYouResponse {
                    success: false,
                    email_sent: Some(false),
                    message: "Email service error".into(),
                    details: Some(e.detail()),
                    ..Default::default()
                },
            )
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn render_body(
    recipient_name: &str,
    food_name: &str,
    sender_name: &str,
    sender_email: Option<&str>,
    redirected_from: Option<&str>,
) -> String {
    use html_escape::encode_text;

    let signature = match sender_email {
        Some(email) => format!(
            "<strong>{}</strong> ({})",
            encode_text(sender_name),
            encode_text(email)
        ),
        None => format!("<strong>{}</strong>", encode_text(sender_name)),
    };
    let test_note = redirected_from
        .map(|intended| {
            format!(
                r#"<p style="font-size: 12px; color: #888;">Note: This is a test email. In production, this would be sent to {}.</p>"#,
                encode_text(intended)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #4CAF50; text-align: center;">Thank You for Your Donation!</h2>
  <p>Dear {recipient},</p>
  <p>We sincerely thank you for your generous donation of <strong>{food}</strong>. Your contribution will help someone in need and make a meaningful difference in their life.</p>
  <p>Your kindness helps us fight food waste and hunger in our community.</p>
  <p style="color: #4CAF50; font-size: 18px; font-weight: bold; text-align: center;">Together, we can make a difference!</p>
  <p>Warm regards,</p>
  <p>{signature}</p>
  {test_note}
</div>"#,
        recipient = encode_text(recipient_name),
        food = encode_text(food_name),
        signature = signature,
        test_note = test_note,
    )
}
