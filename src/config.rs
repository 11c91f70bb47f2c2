use axum_extra::extract::cookie::Key;
use base64::Engine;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the CloudKit JS API token.
pub const CLOUDKIT_TOKEN_ENV: &str = "CLOUDKIT_API_TOKEN";

/// Environment variable pointing at an alternative `config.toml`.
pub const CONFIG_PATH_ENV: &str = "TXIRIMIRI_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub cloudkit: CloudKitConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    pub static_dir: Option<PathBuf>,
    /// Drop the `Secure` attribute from the session cookie (plain-HTTP dev setups).
    pub insecure_cookie: bool,
    /// Base64 encoded master key for the private session cookie, at least 64 bytes.
    pub cookie_secret: Option<String>,
    pub body_limit_mb: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:txirimiri.sqlite".to_string(),
            loglevel: "info".to_string(),
            static_dir: Some(PathBuf::from("static")),
            insecure_cookie: false,
            cookie_secret: None,
            body_limit_mb: 64,
        }
    }
}

impl BasicConfig {
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.max(1) * 1024 * 1024
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudKitConfig {
    pub api_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub ttl_secs: u64,
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Sqlite,
            // two weeks, the usual browser session cookie age
            ttl_secs: 60 * 60 * 24 * 14,
            purge_interval_secs: 60 * 60,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from `$TXIRIMIRI_CONFIG` (or `config.toml`) and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(path)
    }

    /// Layering: defaults < toml file < `TXIRIMIRI_*` < `CLOUDKIT_API_TOKEN`.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.into()))
            .merge(Env::prefixed("TXIRIMIRI_").split("__"))
            .merge(
                Env::raw()
                    .only(&[CLOUDKIT_TOKEN_ENV])
                    .map(|_| "cloudkit.api_token".into()),
            )
            .extract()
    }

    /// Cookie encryption key: the configured secret, or a random per-process key.
    pub fn cookie_key(&self) -> Key {
        let Some(secret) = self.basic.cookie_secret.as_deref() else {
            warn!("no cookie_secret configured; sessions will not survive a restart");
            return Key::generate();
        };
        let decoded = match base64::engine::general_purpose::STANDARD.decode(secret.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "cookie_secret is not valid base64; using a random key");
                return Key::generate();
            }
        };
        match Key::try_from(decoded.as_slice()) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "cookie_secret too short (need 64 bytes); using a random key");
                Key::generate()
            }
        }
    }
}
