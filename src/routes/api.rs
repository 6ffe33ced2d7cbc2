use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::json;

use crate::chatbot::{self, ChatRequest};
use crate::config::MediaConfig;
use crate::media::{self, UploadRequest};
use crate::notify::{self, ThankYouRequest, ThankYouResponse};
use crate::state::AppState;

/// Room for the `data:` prefix and the JSON envelope around the base64 payload
const UPLOAD_ENVELOPE_BYTES: usize = 64 * 1024;

/// Largest request body `/api/upload` buffers: a `max_upload_bytes` image
/// after base64 expansion, plus the envelope.
pub fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.div_ceil(3) * 4 + UPLOAD_ENVELOPE_BYTES
}

fn rejected(rejection: JsonRejection) -> (StatusCode, String) {
    let detail = rejection.body_text();
    tracing::warn!("Rejected request body: {}", detail);
    (rejection.status(), detail)
}

async fn chat(
    State(state): State<AppState>,
    req: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match req {
        Ok(Json(req)) => chatbot::reply(state.chat.as_deref(), req).await,
        Err(rejection) => {
            let (status, detail) = rejected(rejection);
            (
                status,
                json!({ "error": "Invalid request body", "details": detail }),
            )
        }
    };
    (status, Json(body))
}

async fn send_thank_you(
    State(state): State<AppState>,
    req: Result<Json<ThankYouRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match req {
        Ok(Json(req)) => {
            notify::send_thank_you(&state.config.email, state.mailer.as_deref(), req).await
        }
        Err(rejection) => {
            let (status, detail) = rejected(rejection);
            (
                status,
                ThankYouResponse {
                    success: false,
                    message: "Validation error".into(),
                    details: Some(detail),
                    ..Default::default()
                },
            )
        }
    };
    (status, Json(body))
}

async fn upload(
    State(state): State<AppState>,
    req: Result<Json<UploadRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match req {
        Ok(Json(req)) => {
            media::upload(
                state.media.as_deref(),
                state.config.media.max_upload_bytes,
                req,
            )
            .await
        }
        Err(rejection) => {
            let (status, detail) = rejected(rejection);
            (status, json!({ "error": detail }))
        }
    };
    (status, Json(body))
}

/// Settings the browser needs to initialise its SDKs. Nothing secret.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub google_client_id: Option<String>,
    pub paypal_client_id: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub chatbot_enabled: bool,
    pub email_enabled: bool,
}

async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        google_client_id: state.config.auth.google_client_id.clone(),
        paypal_client_id: state.config.payments.client_id.clone(),
        cloudinary_cloud_name: state.config.media.cloud_name.clone(),
        chatbot_enabled: state.chat.is_some(),
        email_enabled: state.mailer.is_some(),
    })
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

pub fn router(media: &MediaConfig) -> Router<AppState> {
    Router::new()
        .route("/api/chatbot", post(chat))
        .route("/api/send-thank-you", post(send_thank_you))
        .route(
            "/api/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_body_limit(
                media.max_upload_bytes,
            ))),
        )
        .route("/api/config", get(client_config))
        .route("/health", get(health))
}
