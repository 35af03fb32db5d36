/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default)]
    pub mail: MailSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Brochure served to signed-in users at `GET /api/brochure`
    #[serde(default)]
    pub brochure_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    pub jwt_secret: String,

    /// Unset means issued tokens never expire
    #[serde(default)]
    pub token_expiration_hours: Option<u64>,
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTls {
    /// Plain connection (local relays and tests only)
    None,
    /// Upgrade with STARTTLS
    Starttls,
    /// TLS from the first byte (usually port 465)
    Implicit,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailSettings {
    /// SMTP host; notifications are disabled when unset
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_mail_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Defaults to implicit TLS on port 465 and STARTTLS elsewhere
    #[serde(default)]
    pub tls: Option<MailTls>,

    /// Recipient of new-lead notifications
    #[serde(default)]
    pub notify_email: Option<String>,

    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

impl MailSettings {
    pub fn tls_mode(&self) -> MailTls {
        match self.tls {
            Some(mode) => mode,
            None if self.port == 465 => MailTls::Implicit,
            None => MailTls::Starttls,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, then environment.
    ///
    /// Environment variables use the `HEIGHTS_` prefix and `__` between
    /// nested keys, e.g. `HEIGHTS_MAIL__NOTIFY_EMAIL`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                // Load from config file if it exists
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("HEIGHTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set HEIGHTS_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.mail.host.is_some() && self.mail.username.is_none() {
            return Err(ServerError::Config(
                "mail.username is required when mail.host is set".to_string(),
            ));
        }

        if let Some(path) = &self.storage.brochure_path {
            if !path.is_file() {
                return Err(ServerError::Config(format!(
                    "Brochure not found at {:?}",
                    path
                )));
            }
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        brochure_path: None,
    }
}

fn default_database_url() -> String {
    "sqlite://./data/heights.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        token_expiration_hours: None,
    }
}

fn default_mail_port() -> u16 {
    587
}

fn default_sender_name() -> String {
    "Centrum Heights".to_string()
}

fn default_mail_timeout_secs() -> u64 {
    10
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_mail_port(),
            username: None,
            password: None,
            sender_name: default_sender_name(),
            tls: None,
            notify_email: None,
            timeout_secs: default_mail_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            mail: MailSettings::default(),
        }
    }
}
