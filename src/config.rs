use std::path::PathBuf;

use axum_extra::extract::cookie::Key;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Runtime configuration, overridable through `SNOWGATE_*` environment
/// variables (e.g. `SNOWGATE_DEVICE_API_KEY`, `SNOWGATE_DATABASE_URL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub upload_dir: PathBuf,
    /// Shared secret for device uploads, checked on every `/api/upload` call.
    pub device_api_key: String,
    /// Keying material for the private session cookie.
    pub secret_key: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5001".to_string(),
            database_url: "sqlite:server.db".to_string(),
            upload_dir: PathBuf::from("uploads"),
            device_api_key: "super-secret-device-key".to_string(),
            secret_key: "a-very-secret-server-key".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("SNOWGATE_"))
            .extract()
    }

    /// Derive the cookie encryption key from the configured secret.
    /// `Key::derive_from` wants at least 64 bytes of material, so the secret
    /// is cycled up to that length first. An empty secret yields a random
    /// key, which invalidates all sessions on restart.
    pub fn cookie_key(&self) -> Key {
        if self.secret_key.is_empty() {
            return Key::generate();
        }
        let mut material = Vec::with_capacity(64);
        while material.len() < 64 {
            material.extend_from_slice(self.secret_key.as_bytes());
        }
        Key::derive_from(&material)
    }
}
