//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders settings maps in the format selected by `--output`. Table uses
//! `tabled`, structured formats use serde, plain emits `key=value` lines.

use std::io::{self, IsTerminal, Write};

use tabled::{Table, Tabled, settings::Style};

use mediactl_core::{SettingsMap, settings};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Settings rendering ───────────────────────────────────────────────

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Render a settings map in the chosen format.
pub fn render_settings(format: &OutputFormat, map: &SettingsMap) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<SettingRow> = map
                .iter()
                .map(|(key, value)| SettingRow {
                    key: key.clone(),
                    value: value.display(),
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(&settings::to_json_map(map), false),
        OutputFormat::JsonCompact => render_json(&settings::to_json_map(map), true),
        OutputFormat::Yaml => render_yaml(&settings::to_json_map(map)),
        OutputFormat::Plain => map
            .iter()
            .map(|(key, value)| format!("{key}={}", value.display()))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("serialization failed: {e}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("serialization failed: {e}"))
}
