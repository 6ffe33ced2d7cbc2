use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foodshare", about = "Food and money donation coordination server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub chatbot: ChatbotConfig,
    pub media: MediaConfig,
    pub payments: PaymentsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated list of allowed CORS origins, or "*"
    pub allowed_origins: String,
    /// Timeout for outbound provider requests
    pub provider_timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
    /// Emails allowed to hold the admin role
    pub admin_emails: Vec<String>,
    pub google_client_id: Option<String>,
    pub userinfo_url: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub from: String,
    /// Send to every recipient instead of redirecting to the verified address
    pub production: bool,
    /// Simulate sends for unverified recipients
    pub development: bool,
    pub verified_address: String,
    pub api_base: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ChatbotConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MediaConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub folder: String,
    pub max_upload_bytes: usize,
    pub api_base: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PaymentsConfig {
    pub client_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: String::new(),
            provider_timeout_secs: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "foodshare_session".to_string(),
            session_hours: 720,
            admin_emails: Vec::new(),
            google_client_id: None,
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: "Food Share <onboarding@resend.dev>".to_string(),
            production: false,
            development: false,
            verified_address: String::new(),
            api_base: "https://api.resend.com".to_string(),
        }
    }
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            folder: "food_donations".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(email.trim()))
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("foodshare.db"));
        }

        Ok(config)
    }

    /// Overlay provider credentials and mode flags from the environment.
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        };

        if let Some(v) = get(&["GEMINI_API_KEY"]) {
            self.chatbot.api_key = Some(v);
        }
        if let Some(v) = get(&["RESEND_API_KEY"]) {
            self.email.api_key = Some(v);
        }
        if let Some(v) = get(&["EMAIL_FROM"]) {
            self.email.from = v;
        }
        if let Some(v) = get(&["EMAIL_PRODUCTION"]) {
            self.email.production = v.trim() == "true";
        }
        if let Some(v) = get(&["EMAIL_VERIFIED_ADDRESS"]) {
            self.email.verified_address = v;
        }
        if let Some(v) = get(&["FOODSHARE_ENV"]) {
            self.email.development = v.trim() == "development";
        }
        if let Some(v) = get(&["CLOUDINARY_CLOUD_NAME", "NEXT_PUBLIC_CLOUDINARY_CLOUD_NAME"]) {
            self.media.cloud_name = Some(v);
        }
        if let Some(v) = get(&["CLOUDINARY_API_KEY", "NEXT_PUBLIC_CLOUDINARY_API_KEY"]) {
            self.media.api_key = Some(v);
        }
        if let Some(v) = get(&["CLOUDINARY_API_SECRET"]) {
            self.media.api_secret = Some(v);
        }
        if let Some(v) = get(&["GOOGLE_CLIENT_ID", "NEXT_PUBLIC_GOOGLE_CLIENT_ID"]) {
            self.auth.google_client_id = Some(v);
        }
        if let Some(v) = get(&["PAYPAL_CLIENT_ID", "NEXT_PUBLIC_CLIENT_ID"]) {
            self.payments.client_id = Some(v);
        }
        if let Some(v) = get(&["ADMIN_EMAILS"]) {
            self.auth.admin_emails = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".foodshare")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("foodshare.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cli_with(data_dir: Option<PathBuf>) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.cookie_name, "foodshare_session");
        assert_eq!(config.auth.session_hours, 720);
        assert_eq!(config.email.from, "Food Share <onboarding@resend.dev>");
        assert_eq!(config.media.folder, "food_donations");
        assert!(!config.email.production);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_with(Some(PathBuf::from("/tmp/test-foodshare")));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-foodshare"));
    }

    #[test]
    fn data_dir_defaults_to_dot_foodshare() {
        let dir = Config::data_dir(&cli_with(None));
        assert!(dir.ends_with(".foodshare"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_with(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.db_path(), tmp.path().join("foodshare.db"));
    }

    #[test]
    fn load_reads_toml_file_and_cli_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[auth]
admin_emails = ["boss@example.org"]

[email]
verified_address = "me@example.org"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: None,
            port: Some(4000),
            data_dir: Some(tmp.path().to_path_buf()),
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 4000);
        assert!(config.auth.is_admin_email("Boss@Example.org"));
        assert_eq!(config.email.verified_address, "me@example.org");
    }

    #[test]
    fn env_overlay_sets_provider_keys_and_flags() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "g-key"),
            ("RESEND_API_KEY", "r-key"),
            ("EMAIL_PRODUCTION", "true"),
            ("FOODSHARE_ENV", "development"),
            ("NEXT_PUBLIC_CLOUDINARY_CLOUD_NAME", "demo"),
            ("NEXT_PUBLIC_CLIENT_ID", "paypal-id"),
            ("ADMIN_EMAILS", "a@x.org, b@x.org,"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.chatbot.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.email.api_key.as_deref(), Some("r-key"));
        assert!(config.email.production);
        assert!(config.email.development);
        assert_eq!(config.media.cloud_name.as_deref(), Some("demo"));
        assert_eq!(config.payments.client_id.as_deref(), Some("paypal-id"));
        assert_eq!(config.auth.admin_emails, vec!["a@x.org", "b@x.org"]);
    }

    #[test]
    fn env_overlay_ignores_blank_values() {
        let mut config = Config::default();
        config.apply_env(|k| (k == "RESEND_API_KEY").then(|| "  ".to_string()));
        assert!(config.email.api_key.is_none());
    }
}
