//! Image upload proxy.

pub mod cloudinary;

use async_trait::async_trait;
use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

pub use cloudinary::CloudinaryStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub data: String,
}

/// A validated `data:image/...;base64,...` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData<'a> {
    pub mime: &'a str,
    pub data_uri: &'a str,
    pub size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Image must be a base64 data:image URI")]
    InvalidDataUri,

    #[error("Image data is not valid base64")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media provider error {status}: {message}")]
    Provider { status: u16, message: String },
}

impl MediaError {
    fn is_client_error(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidDataUri | MediaError::InvalidBase64(_) | MediaError::TooLarge { .. }
        )
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the image and return its public HTTPS URL.
    async fn upload(&self, image: &ImageData<'_>) -> Result<String, MediaError>;
}

pub fn parse_data_uri(data_uri: &str, max_bytes: usize) -> Result<ImageData<'_>, MediaError> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or(MediaError::InvalidDataUri)?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or(MediaError::InvalidDataUri)?;
    if !mime.starts_with("image/") || mime.len() == "image/".len() || payload.is_empty() {
        return Err(MediaError::InvalidDataUri);
    }

    // Decoded size is known from the encoded length; reject before allocating.
    let estimated = payload.len() / 4 * 3;
    if estimated > max_bytes + 2 {
        return Err(MediaError::TooLarge {
            size: estimated,
            max: max_bytes,
        });
    }

    let size = STANDARD.decode(payload)?.len();
    if size > max_bytes {
        return Err(MediaError::TooLarge {
            size,
            max: max_bytes,
        });
    }

    Ok(ImageData {
        mime,
        data_uri,
        size,
    })
}

pub async fn upload(
    store: Option<&dyn MediaStore>,
    max_bytes: usize,
    req: UploadRequest,
) -> (StatusCode, Value) {
    let Some(store) = store else {
        tracing::error!("Media storage is not configured");
        return upload_failed();
    };

    let image = match parse_data_uri(req.data.trim(), max_bytes) {
        Ok(image) => image,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }));
        }
    };

    match store.upload(&image).await {
        Ok(url) => {
            tracing::info!("Uploaded {} image ({} bytes)", image.mime, image.size);
            (StatusCode::OK, json!({ "imageUrl": url }))
        }
        Err(e) if e.is_client_error() => {
            (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
        }
        Err(e) => {
            tracing::error!("Image upload failed: {}", e);
            upload_failed()
        }
    }
}

fn upload_failed() -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Error uploading image" }),
    )
}
