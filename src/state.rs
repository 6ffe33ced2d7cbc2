use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::{GoogleIdentity, IdentityProvider};
use crate::chatbot::{ChatModel, GeminiChat};
use crate::config::Config;
use crate::graphql::{build_schema, FoodShareSchema};
use crate::media::{CloudinaryStore, MediaStore};
use crate::notify::{EmailSender, ResendSender};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub graphql_schema: FoodShareSchema,
    pub identity: Arc<dyn IdentityProvider>,
    /// Unset when no email API key is configured
    pub mailer: Option<Arc<dyn EmailSender>>,
    pub chat: Option<Arc<dyn ChatModel>>,
    pub media: Option<Arc<dyn MediaStore>>,
}

impl AppState {
    /// Wire the real providers. Integrations without credentials stay disabled.
    pub fn from_config(config: Config, db: DbPool) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.provider_timeout_secs))
            .build()?;

        let identity: Arc<dyn IdentityProvider> = Arc::new(GoogleIdentity::new(
            client.clone(),
            config.auth.userinfo_url.clone(),
        ));

        let mailer = config.email.api_key.clone().map(|key| {
            Arc::new(ResendSender::new(
                client.clone(),
                config.email.api_base.clone(),
                key,
            )) as Arc<dyn EmailSender>
        });

        let chat = config.chatbot.api_key.clone().map(|key| {
            Arc::new(GeminiChat::new(
                client.clone(),
                config.chatbot.api_base.clone(),
                key,
                config.chatbot.model.clone(),
            )) as Arc<dyn ChatModel>
        });

        let media = match (
            &config.media.cloud_name,
            &config.media.api_key,
            &config.media.api_secret,
        ) {
            (Some(cloud), Some(key), Some(secret)) => Some(Arc::new(CloudinaryStore::new(
                client.clone(),
                config.media.api_base.clone(),
                cloud.clone(),
                key.clone(),
                secret.clone(),
                config.media.folder.clone(),
            )) as Arc<dyn MediaStore>),
            _ => None,
        };

        for (name, enabled) in [
            ("email", mailer.is_some()),
            ("chatbot", chat.is_some()),
            ("media upload", media.is_some()),
        ] {
            if !enabled {
                tracing::warn!("No credentials for {}; endpoint will report an error", name);
            }
        }

        Ok(Self {
            db,
            config,
            graphql_schema: build_schema(),
            identity,
            mailer,
            chat,
            media,
        })
    }
}
