use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Profile returned by the OAuth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub picture: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("access token rejected by identity provider")]
    InvalidToken,

    #[error("identity provider returned no email")]
    MissingEmail,

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider error {status}: {body}")]
    Provider { status: u16, body: String },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a client-obtained access token for the user's profile.
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

/// Google OAuth2 userinfo endpoint
pub struct GoogleIdentity {
    client: Client,
    userinfo_url: String,
}

impl GoogleIdentity {
    pub fn new(client: Client, userinfo_url: String) -> Self {
        Self {
            client,
            userinfo_url,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(IdentityError::InvalidToken)
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                return Err(IdentityError::Provider {
                    status: s.as_u16(),
                    body,
                });
            }
        }

        let info: UserInfo = response.json().await?;
        into_identity(info)
    }
}

fn into_identity(info: UserInfo) -> Result<Identity, IdentityError> {
    let email = info
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or(IdentityError::MissingEmail)?;

    Ok(Identity {
        name: info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone()),
        email,
        picture: info.picture.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn userinfo_without_email_is_rejected() {
        let info: UserInfo = serde_json::from_str(r#"{"name":"No Mail"}"#).unwrap();
        assert!(matches!(into_identity(info), Err(IdentityError::MissingEmail)));
    }

    #[test]
    fn missing_name_falls_back_to_email() {
        let info: UserInfo =
            serde_json::from_str(r#"{"email":"x@example.org","sub":"123"}"#).unwrap();
        let identity = into_identity(info).unwrap();
        assert_eq!(identity.name, "x@example.org");
        assert_eq!(identity.picture, "");
    }
}
