use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ImageData, MediaError, MediaStore};

/// Signed uploads to a Cloudinary cloud
pub struct CloudinaryStore {
    client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

impl CloudinaryStore {
    pub fn new(
        client: Client,
        api_base: String,
        cloud_name: String,
        api_key: String,
        api_secret: String,
        folder: String,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
            folder,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/image/upload", self.api_base, self.cloud_name)
    }
}

/// SHA-256 over the alphabetically sorted `key=value` pairs joined with `&`,
/// followed directly by the API secret.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(hmac_sha256::Hash::hash(
        format!("{}{}", joined, api_secret).as_bytes(),
    ))
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
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
impl MediaStore for CloudinaryStore {
    async fn upload(&self, image: &ImageData<'_>) -> Result<String, MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let form = [
            ("file", image.data_uri),
            ("folder", self.folder.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self.client.post(self.endpoint()).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(text);
            return Err(MediaError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        Ok(uploaded.secure_url)
    }
}
