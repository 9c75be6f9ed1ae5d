// ── Merge / diff primitives ──
//
// The load path merges a (possibly partial) server payload over the
// default template; the save path diffs the draft against the confirmed
// configuration. Two different composition rules apply:
//
// - `merge_settings` recurses into `Map` values (a partial server payload
//   may carry a partial nested object);
// - `apply_change_set` replaces wholesale, because a change-set entry is
//   always the full new value. That distinction keeps the invariant
//   `apply(configuration, change_set(configuration, draft)) == draft`.

use crate::model::{ChangeSet, SettingValue, SettingsMap};

/// Deep-merge `overlay` over `base`.
///
/// Every key of `base` survives; keys present in `overlay` override, with
/// `Map` values merged recursively. Keys only in `overlay` are retained.
pub fn merge_settings(base: &SettingsMap, overlay: &SettingsMap) -> SettingsMap {
    let mut merged = base.clone();
    for (key, value) in overlay {
        match (merged.get_mut(key), value) {
            (Some(SettingValue::Map(existing)), SettingValue::Map(incoming)) => {
                let combined = merge_settings(existing, incoming);
                *existing = combined;
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

/// Collect every key whose draft value is not deep-equal to the confirmed
/// value. Reference-style shortcuts don't exist here: equality on
/// [`SettingValue`] is structural, so a re-built list with identical
/// contents never shows up as a change.
pub fn compute_change_set(confirmed: &SettingsMap, draft: &SettingsMap) -> ChangeSet {
    draft
        .iter()
        .filter(|(key, value)| confirmed.get(*key) != Some(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Apply a change-set on top of a configuration, replacing each changed
/// key wholesale.
pub fn apply_change_set(configuration: &SettingsMap, changes: &ChangeSet) -> SettingsMap {
    let mut applied = configuration.clone();
    for (key, value) in changes {
        applied.insert(key.clone(), value.clone());
    }
    applied
}

// ── JSON boundary conversions ────────────────────────────────────────

/// Convert a raw JSON value from the wire into a domain value.
pub fn from_json(value: &serde_json::Value) -> SettingValue {
    match value {
        serde_json::Value::Null => SettingValue::Null,
        serde_json::Value::Bool(b) => SettingValue::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map_or_else(|| SettingValue::Float(n.as_f64().unwrap_or(0.0)), SettingValue::Int),
        serde_json::Value::String(s) => SettingValue::Text(s.clone()),
        serde_json::Value::Array(items) => {
            SettingValue::List(items.iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => SettingValue::Map(from_json_map(map)),
    }
}

/// Convert a domain value back into wire JSON.
pub fn to_json(value: &SettingValue) -> serde_json::Value {
    match value {
        SettingValue::Null => serde_json::Value::Null,
        SettingValue::Bool(b) => serde_json::Value::Bool(*b),
        SettingValue::Int(n) => serde_json::Value::from(*n),
        SettingValue::Float(n) => {
            serde_json::Number::from_f64(*n).map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
        SettingValue::Text(s) => serde_json::Value::String(s.clone()),
        SettingValue::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        SettingValue::Map(map) => serde_json::Value::Object(to_json_map(map)),
    }
}

pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> SettingsMap {
    map.iter()
        .map(|(key, value)| (key.clone(), from_json(value)))
        .collect()
}

pub fn to_json_map(map: &SettingsMap) -> serde_json::Map<String, serde_json::Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), to_json(value)))
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────
