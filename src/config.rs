//! Service configuration loaded from YAML.
//!
//! The file location comes from `CHAT_APP_CONFIG` (default `config.yaml`).
//! A missing file is not an error: every key has a default, so the service
//! starts with built-in settings. `PORT` overrides the port of `server.bind`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "CHAT_APP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Shown in card headers.
    pub app_name: String,
    /// Post replies through the messenger instead of the HTTP response.
    pub async_replies: bool,
    pub max_diagnostic_chars: usize,
    pub outbound_queue_capacity: usize,
    /// Slash command id (as configured in the chat console) to command name.
    pub slash_commands: HashMap<String, String>,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub authorization_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Expected `aud` of the bearer token on incoming requests. Requests are
    /// not verified when unset.
    pub audience: Option<String>,
    /// JWK set used to check bearer token signatures.
    pub verification_keys_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            app_name: "Chat App".to_string(),
            async_replies: false,
            max_diagnostic_chars: 200,
            outbound_queue_capacity: 128,
            slash_commands: HashMap::new(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            client_id: String::new(),
            redirect_uri: "http://localhost:8080/auth/callback".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/userinfo.profile".to_string()],
            audience: None,
            verification_keys_url:
                "https://www.googleapis.com/service_accounts/v1/jwk/chat@system.gserviceaccount.com"
                    .to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the config from `CHAT_APP_CONFIG` and applies the `PORT` override.
    pub fn from_env() -> anyhow::Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(Path::new(&path))?;
        if let Ok(port) = std::env::var("PORT") {
            config.apply_port(&port)?;
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        info!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config at {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;
        if self.outbound_queue_capacity == 0 {
            anyhow::bail!("outbound_queue_capacity must be greater than zero");
        }
        if self.auth.audience.as_deref() == Some("") {
            anyhow::bail!("auth.audience must not be empty when set");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("server.bind '{}' is not a socket address", self.server.bind))
    }

    fn apply_port(&mut self, port: &str) -> anyhow::Result<()> {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("PORT '{port}' is not a valid port"))?;
        let mut addr = self.bind_addr()?;
        addr.set_port(port);
        self.server.bind = addr.to_string();
        Ok(())
    }
}
