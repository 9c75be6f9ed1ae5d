//! Config subcommand handlers.

use mediactl_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, active_profile_name};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Init {
            server,
            token,
            token_env,
        } => init(global, server, token, token_env),
        ConfigCommand::SetToken { token } => set_token(global, &token),
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    output::print_output(&format_config_redacted(&cfg), global.quiet);
    Ok(())
}

fn init(
    global: &GlobalOpts,
    server: String,
    token: Option<String>,
    token_env: Option<String>,
) -> Result<(), CliError> {
    // Validate before writing anything.
    let _: url::Url = server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })?;

    let mut cfg = config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = cfg.profiles.entry(profile_name.clone()).or_insert_with(Profile::default);
    profile.server = server;
    if token.is_some() {
        profile.token = token;
    }
    if token_env.is_some() {
        profile.token_env = token_env;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }

    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }

    config::save_config(&cfg)?;
    output::print_output(
        &format!("profile '{profile_name}' written to {}", config::config_path().display()),
        global.quiet,
    );
    Ok(())
}

fn set_token(global: &GlobalOpts, token: &str) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    config::store_token(&profile_name, token)?;
    output::print_output(
        &format!("token stored in the system keyring for profile '{profile_name}'"),
        global.quiet,
    );
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}
