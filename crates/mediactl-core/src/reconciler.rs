// ── Configuration reconciler ──
//
// Owns the last-known-server configuration and the editable draft, and
// submits minimal deltas. Network failures never cross this boundary: they
// become notices and degraded-but-usable state, because load and save are
// explicit user actions the user can simply re-trigger.

use std::sync::Arc;

use tracing::{debug, warn};

use mediactl_api::SettingsClient;

use crate::error::CoreError;
use crate::model::{ChangeSet, SelectionLists, SettingValue, SettingsMap};
use crate::notify::{Notice, Notifier};
use crate::settings::{compute_change_set, from_json_map, merge_settings, to_json_map};

/// Where a bug report lands when a load/save notice is clicked through.
const REPORT_BUG_URL: &str = "https://github.com/mediactl/mediactl/issues/new";

/// Result of a [`ConfigReconciler::save`] call.
///
/// Failures are reported here and through the notifier, never as an `Err` --
/// the host stays interactive either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Draft equals the configuration; no network call was made.
    NoChanges,
    /// The change-set was accepted; the configuration advanced to the draft.
    Saved,
    /// The server rejected or never received the change-set; configuration
    /// and draft are both unchanged.
    Failed,
}

/// Reconciles a confirmed server configuration with an editable draft.
pub struct ConfigReconciler {
    client: SettingsClient,
    notifier: Arc<dyn Notifier>,
    defaults: SettingsMap,
    configuration: SettingsMap,
    draft: SettingsMap,
    selections: SelectionLists,
}

impl ConfigReconciler {
    /// Create a reconciler seeded with the default template.
    ///
    /// Both configuration and draft start as the template; call
    /// [`load`](Self::load) to pull the server's state.
    pub fn new(
        client: SettingsClient,
        defaults: SettingsMap,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let configuration = defaults.clone();
        let draft = defaults.clone();
        Self {
            client,
            notifier,
            defaults,
            configuration,
            draft,
            selections: SelectionLists::default(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The last configuration confirmed by the server (or the defaults if
    /// no load has succeeded).
    pub fn configuration(&self) -> &SettingsMap {
        &self.configuration
    }

    /// The working copy including unsaved edits.
    pub fn draft(&self) -> &SettingsMap {
        &self.draft
    }

    /// Dropdown reference data from the last successful load.
    pub fn selections(&self) -> &SelectionLists {
        &self.selections
    }

    /// Keys whose draft value differs from the confirmed value.
    pub fn change_set(&self) -> ChangeSet {
        compute_change_set(&self.configuration, &self.draft)
    }

    /// Whether there is anything to save.
    pub fn is_dirty(&self) -> bool {
        !self.change_set().is_empty()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the remote configuration and rebuild the merged view.
    ///
    /// The server payload may be partial -- every key it omits is filled
    /// from the default template, and a `userSettingsDefaults` object in
    /// the response refreshes the template first. On failure the
    /// configuration falls back to the unmodified defaults so the host
    /// remains usable, and an error notice is raised.
    pub async fn load(&mut self) -> &SettingsMap {
        match self.client.get_settings().await {
            Ok(response) => {
                let server_defaults = from_json_map(&response.user_settings_defaults);
                let template = if server_defaults.is_empty() {
                    self.defaults.clone()
                } else {
                    merge_settings(&self.defaults, &server_defaults)
                };

                let merged = merge_settings(&template, &from_json_map(&response.user_settings));
                debug!(keys = merged.len(), "configuration loaded");

                self.selections = SelectionLists::from(&response);
                self.configuration = merged.clone();
                self.draft = merged;
            }
            Err(e) => {
                warn!(error = %e, "configuration load failed");
                self.notifier.notify(
                    Notice::error(
                        "Error",
                        "The configuration could not be received from the server.",
                    )
                    .with_help_url(REPORT_BUG_URL),
                );
                self.configuration = self.defaults.clone();
                self.draft = self.defaults.clone();
            }
        }
        &self.configuration
    }

    /// Edit one draft value.
    ///
    /// Only keys already present in the configuration are editable, which
    /// keeps the draft and the configuration on the same key set.
    pub fn set(&mut self, key: &str, value: impl Into<SettingValue>) -> Result<(), CoreError> {
        if !self.configuration.contains_key(key) {
            return Err(CoreError::UnknownSetting { key: key.into() });
        }
        self.draft.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Discard unsaved edits.
    pub fn revert(&mut self) {
        self.draft = self.configuration.clone();
    }

    /// Submit pending changes.
    ///
    /// An empty change-set short-circuits without touching the network.
    /// On success the confirmed configuration advances to the full draft;
    /// on failure both stay as they were so no edits are lost.
    pub async fn save(&mut self) -> SaveOutcome {
        let changes = self.change_set();

        if changes.is_empty() {
            self.notifier
                .notify(Notice::info("Saved", "The configuration has no changes."));
            return SaveOutcome::NoChanges;
        }

        match self.client.save_settings(&to_json_map(&changes)).await {
            Ok(()) => {
                debug!(keys = changes.len(), "configuration saved");
                self.configuration = self.draft.clone();
                self.notifier
                    .notify(Notice::success("Saved", "Your configuration has been saved."));
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!(error = %e, "configuration save failed");
                self.notifier.notify(
                    Notice::error("Error", "The configuration could not be saved.")
                        .with_help_url(REPORT_BUG_URL),
                );
                SaveOutcome::Failed
            }
        }
    }

    /// Fold a partial configuration pushed by the server (another session
    /// changed a setting) into the merged view.
    ///
    /// Last-write-wins: the pushed values land in both the configuration
    /// and the draft, mirroring how the settings form re-binds after a
    /// remote change.
    pub fn apply_server_update(&mut self, update: &SettingsMap) {
        if update.is_empty() {
            return;
        }
        debug!(keys = update.len(), "applying pushed configuration update");
        self.configuration = merge_settings(&self.configuration, update);
        self.draft = self.configuration.clone();
    }
}
