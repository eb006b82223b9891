use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::media::CloudinarySettings;
use crate::narrative::NarratorSettings;
use crate::notify::EmailSettings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Require JWT authentication
    #[arg(long, env = "JWT_REQUIRED")]
    pub jwt_required: Option<bool>,

    /// Enable rate limiting
    #[arg(long, env = "RATE_LIMIT_ENABLED")]
    pub rate_limit_enabled: Option<bool>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub resilience: ResilienceConfig,
    pub persistence: PersistenceConfig,
    pub recall: RecallConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// External base URL, used when building deep links for notifications.
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Whether requests without a bearer token are rejected outright.
    pub jwt_required: bool,
    /// HS256 secret shared with the identity provider.
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub timeout_disabled: bool,
    pub requests_per_second: f32,
    pub burst_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    /// `surrealdb` or `memory`.
    pub provider: String,
    /// Connection string for the document database, e.g.
    /// `surrealkv://data/keepsake` or `ws://localhost:8000`.
    pub database_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecallConfig {
    /// Map clustering radius when the request does not override it.
    pub cluster_radius_km: f64,
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file,
    /// `KEEPSAKE_`-prefixed environment variables, and CLI flags, in
    /// ascending precedence.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.public_url", "http://localhost:3000")?
            .set_default("security.jwt_required", true)?
            .set_default("security.jwt_secret", "keepsake-dev-secret")?
            .set_default("resilience.rate_limit_enabled", true)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.requests_per_second", 5.0)?
            .set_default("resilience.burst_size", 10)?
            .set_default("persistence.provider", "memory")?
            .set_default("persistence.database_url", "surrealkv://data/keepsake")?
            .set_default("recall.cluster_radius_km", 1.0)?;

        // Explicit --config / CONFIG_FILE first, ./config.* as a quiet
        // fallback.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // Environment variables, e.g. KEEPSAKE_SERVER__PORT=8000.
        builder = builder.add_source(
            Environment::with_prefix("KEEPSAKE")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags override everything else.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(jwt_required) = cli.jwt_required {
            builder = builder.set_override("security.jwt_required", jwt_required)?;
        }
        if let Some(rate_limit_enabled) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rate_limit_enabled)?;
        }
        if let Some(timeout_disabled) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", timeout_disabled)?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Gemini narrator settings from the environment.
///
/// Everything has a default except the API key; without `GEMINI_API_KEY`
/// the narrator runs in fallback-only mode.
#[must_use]
pub fn load_narrator_settings() -> NarratorSettings {
    NarratorSettings {
        base_url: non_empty_env("GEMINI_BASE_URL")
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
        api_key: non_empty_env("GEMINI_API_KEY"),
        model: non_empty_env("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
    }
}

/// Cloudinary settings from the environment. Without a cloud name the
/// upload endpoint answers 503.
#[must_use]
pub fn load_cloudinary_settings() -> CloudinarySettings {
    CloudinarySettings {
        cloud_name: non_empty_env("CLOUDINARY_CLOUD_NAME"),
        upload_preset: non_empty_env("CLOUDINARY_UPLOAD_PRESET")
            .unwrap_or_else(|| "ml_default".to_string()),
    }
}

/// EmailJS settings from the environment; `None` disables partner mail.
#[must_use]
pub fn load_email_settings() -> Option<EmailSettings> {
    Some(EmailSettings {
        service_id: non_empty_env("EMAILJS_SERVICE_ID")?,
        template_id: non_empty_env("EMAILJS_TEMPLATE_ID")?,
        public_key: non_empty_env("EMAILJS_PUBLIC_KEY")?,
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
