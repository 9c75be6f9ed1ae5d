//! Profile resolution glue: config file + environment + CLI flags.
//!
//! Delegates storage and credential chains to `mediactl-config`; this
//! module only decides which profile wins and applies flag overrides.

use secrecy::SecretString;

use mediactl_config::{Config, Profile};
use mediactl_core::{ServerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use mediactl_config::{config_path, load_config_or_default, save_config, store_token};

/// The profile name in effect: flag → config default → "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ServerConfig` from the config file, profile, and CLI overrides.
pub fn build_server_config(global: &GlobalOpts) -> Result<ServerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides.
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global);
    }

    // An explicitly named profile that doesn't exist is a user error.
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound { name: profile_name });
    }

    // No profile -- build from CLI flags / env vars alone.
    let Some(url_str) = global.server.as_deref() else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let Some(ref token) = global.token else {
        return Err(CliError::NoToken {
            profile: profile_name,
        });
    };

    let mut config = ServerConfig::new(url, SecretString::from(token.clone()));
    apply_flag_overrides(&mut config, global);
    Ok(config)
}

/// Resolve a profile into a `ServerConfig`, then let flags override.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ServerConfig, CliError> {
    // A token flag spares us the credential chain (which errors when
    // nothing is configured).
    let mut config = if global.token.is_some() {
        let url: url::Url = profile.server.parse().map_err(|_| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;
        ServerConfig::new(url, SecretString::from(String::new()))
    } else {
        mediactl_config::profile_to_server_config(profile, profile_name)?
    };

    if let Some(ref url_str) = global.server {
        config.url = url_str.parse().map_err(|_| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
    }
    if let Some(ref token) = global.token {
        config.token = SecretString::from(token.clone());
    }
    apply_flag_overrides(&mut config, global);
    Ok(config)
}

fn apply_flag_overrides(config: &mut ServerConfig, global: &GlobalOpts) {
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    config.timeout = std::time::Duration::from_secs(global.timeout);
}
