//! Shared configuration for the mediactl CLI.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to `mediactl_core::ServerConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mediactl_core::{ServerConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no token configured for profile '{profile}'")]
    NoToken { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://192.168.1.5:9002").
    pub server: String,

    /// Bearer token (plaintext — prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "mediactl", "mediactl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mediactl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("MEDIACTL_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the bearer token for a profile.
///
/// Chain: profile's `token_env` env var → system keyring → plaintext
/// `token` in the config file.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new("mediactl", &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoToken {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for a profile.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("mediactl", &format!("{profile_name}/token"))?;
    entry.set_password(token)?;
    Ok(())
}

// ── Translation to runtime config ───────────────────────────────────

/// Build a `ServerConfig` from a profile — no CLI flag overrides.
pub fn profile_to_server_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ServerConfig, ConfigError> {
    let url: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;

    let token = resolve_token(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ServerConfig::new(url, token);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(default_timeout()));
    Ok(config)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn default_config_has_a_default_profile_name() {
        let cfg = Config::default();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.output, "table");
    }

    #[test]
    fn plaintext_token_is_the_last_resort() {
        let profile = Profile {
            server: "http://localhost:9002".into(),
            token: Some("plain".into()),
            ..Profile::default()
        };

        let token = resolve_token(&profile, "unit-test-no-keyring").expect("token resolves");
        assert_eq!(token.expose_secret(), "plain");
    }

    #[test]
    fn missing_token_is_an_error() {
        let profile = Profile {
            server: "http://localhost:9002".into(),
            ..Profile::default()
        };

        assert!(matches!(
            resolve_token(&profile, "unit-test-empty"),
            Err(ConfigError::NoToken { .. })
        ));
    }

    #[test]
    fn profile_translates_to_server_config() {
        let profile = Profile {
            server: "https://media.local:9002".into(),
            token: Some("abc".into()),
            insecure: Some(true),
            timeout: Some(5),
            ..Profile::default()
        };

        let config = profile_to_server_config(&profile, "p").expect("valid profile");
        assert_eq!(config.url.as_str(), "https://media.local:9002/");
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let profile = Profile {
            server: "not a url".into(),
            token: Some("abc".into()),
            ..Profile::default()
        };

        assert!(matches!(
            profile_to_server_config(&profile, "p"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                server: "http://192.168.1.5:9002".into(),
                token_env: Some("MEDIA_TOKEN".into()),
                ..Profile::default()
            },
        );

        let serialized = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&serialized).expect("parses");

        assert_eq!(parsed.profiles["home"].server, "http://192.168.1.5:9002");
        assert_eq!(
            parsed.profiles["home"].token_env.as_deref(),
            Some("MEDIA_TOKEN")
        );
    }
}
