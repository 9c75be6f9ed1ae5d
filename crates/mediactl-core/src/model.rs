// ── Settings domain types ──
//
// A configuration is a flat map from setting key to value. Values are
// JSON-shaped but carried as a domain enum so equality is always deep:
// two lists compare elementwise, two maps per key. That property is what
// keeps the change-set computation honest for array-valued settings like
// the selected-renderers list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use mediactl_api::{SelectOption, SettingsResponse};

/// An ordered settings map. Insertion order is preserved so rendered
/// output stays stable across load/save cycles.
pub type SettingsMap = IndexMap<String, SettingValue>;

/// The minimal key/value delta between a confirmed configuration and a
/// draft. Values are always the full new value, never a nested diff.
pub type ChangeSet = SettingsMap;

/// One setting value.
///
/// `PartialEq` is derived, so comparison is structural all the way down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<SettingValue>),
    Map(SettingsMap),
}

impl SettingValue {
    /// Render a short human-readable form for tables and logs.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(Self::display).collect();
                parts.join(", ")
            }
            Self::Map(map) => serde_json::to_string(&crate::settings::to_json_map(map))
                .unwrap_or_else(|_| "{..}".into()),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SettingValue>> From<Vec<T>> for SettingValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

// ── Selection lists ──────────────────────────────────────────────────

/// Dropdown reference data from the settings read endpoint.
///
/// Pure presentation input -- the reconciler only carries it through.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionLists {
    pub server_engines: Vec<SelectOption>,
    pub sort_methods: Vec<SelectOption>,
    pub all_renderer_names: Vec<SelectOption>,
    pub enabled_renderer_names: Vec<SelectOption>,
    pub network_interfaces: Vec<SelectOption>,
    pub fully_played_actions: Vec<SelectOption>,
}

impl From<&SettingsResponse> for SelectionLists {
    fn from(response: &SettingsResponse) -> Self {
        Self {
            server_engines: response.server_engines.clone(),
            sort_methods: response.sort_methods.clone(),
            all_renderer_names: response.all_renderer_names.clone(),
            enabled_renderer_names: response.enabled_renderer_names.clone(),
            network_interfaces: response.network_interfaces.clone(),
            fully_played_actions: response.fully_played_actions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural_for_lists() {
        let a = SettingValue::from(vec!["FFmpeg", "MEncoder"]);
        let b = SettingValue::from(vec!["FFmpeg", "MEncoder"]);
        let c = SettingValue::from(vec!["MEncoder", "FFmpeg"]);

        assert_eq!(a, b);
        assert_ne!(a, c, "element order must matter");
    }

    #[test]
    fn display_joins_lists() {
        let v = SettingValue::from(vec!["a", "b"]);
        assert_eq!(v.display(), "a, b");
    }
}
