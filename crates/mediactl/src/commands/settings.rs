//! Settings command handlers: show and set.

use std::sync::Arc;

use mediactl_core::{
    ConfigReconciler, SaveOutcome, SettingValue, SettingsMap, config::settings_client,
    defaults::default_template, settings,
};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::CliError;
use crate::notifier::TermNotifier;
use crate::output;

pub async fn handle(args: SettingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let server_config = crate::config::build_server_config(global)?;
    let client = settings_client(&server_config)?;
    let notifier = Arc::new(TermNotifier::new(
        output::should_color(&global.color),
        global.quiet,
    ));
    let mut reconciler = ConfigReconciler::new(client, default_template(), notifier);

    match args.command {
        SettingsCommand::Show { key } => {
            reconciler.load().await;
            show(&reconciler, key.as_deref(), global)
        }
        SettingsCommand::Set { assignments } => {
            reconciler.load().await;
            set(&mut reconciler, &assignments).await
        }
    }
}

fn show(
    reconciler: &ConfigReconciler,
    key: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let configuration = reconciler.configuration();

    let Some(key) = key else {
        output::print_output(
            &output::render_settings(&global.output, configuration),
            global.quiet,
        );
        return Ok(());
    };

    let Some(value) = configuration.get(key) else {
        return Err(CliError::UnknownSetting { key: key.into() });
    };
    let mut single = SettingsMap::new();
    single.insert(key.to_string(), value.clone());
    output::print_output(&output::render_settings(&global.output, &single), global.quiet);
    Ok(())
}

async fn set(reconciler: &mut ConfigReconciler, assignments: &[String]) -> Result<(), CliError> {
    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        reconciler.set(&key, value)?;
    }

    match reconciler.save().await {
        SaveOutcome::Saved | SaveOutcome::NoChanges => Ok(()),
        SaveOutcome::Failed => Err(CliError::SaveFailed),
    }
}

/// Split `KEY=VALUE`, parsing the value as JSON first so booleans, numbers
/// and arrays come through typed; anything unparseable is a string.
fn parse_assignment(assignment: &str) -> Result<(String, SettingValue), CliError> {
    let Some((key, raw)) = assignment.split_once('=') else {
        return Err(CliError::Validation {
            field: "assignment".into(),
            reason: format!("expected KEY=VALUE, got '{assignment}'"),
        });
    };
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "assignment".into(),
            reason: "setting key may not be empty".into(),
        });
    }

    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| SettingValue::Text(raw.to_string()), |v| settings::from_json(&v));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_values_parse_as_json_first() {
        let (_, v) = parse_assignment("auto_update=false").expect("parses");
        assert_eq!(v, SettingValue::Bool(false));

        let (_, v) = parse_assignment("maximum_bitrate=110").expect("parses");
        assert_eq!(v, SettingValue::Int(110));

        let (_, v) = parse_assignment(r#"selected_renderers=["PS4"]"#).expect("parses");
        assert_eq!(v, SettingValue::from(vec!["PS4"]));
    }

    #[test]
    fn unparseable_values_fall_back_to_strings() {
        let (key, v) = parse_assignment("server_name=Living Room").expect("parses");
        assert_eq!(key, "server_name");
        assert_eq!(v, SettingValue::Text("Living Room".into()));
    }

    #[test]
    fn missing_equals_is_rejected() {
        assert!(parse_assignment("no_equals_here").is_err());
        assert!(parse_assignment("=value").is_err());
    }
}
