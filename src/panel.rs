//! The configuration surface: a thin controller the host UI drives.
//!
//! Each handler mirrors one control — the enable toggle, the creation-mode
//! radio, the per-row text inputs, and the add/remove/refresh buttons — and
//! persists settings after every mutation. Rendering belongs to the host;
//! this module only owns the state transitions.

use serde_json::Value;
use tracing::{debug, error};

use crate::events::ContextEvent;
use crate::host::SettingsStore;
use crate::settings::{CreationMode, MappingField, Settings, sanitize_macro_name};
use crate::sync::{RefreshKind, SyncEngine};

pub struct SettingsPanel {
    settings: Settings,
    store: Box<dyn SettingsStore>,
    engine: SyncEngine,
}

impl SettingsPanel {
    pub fn new(settings: Settings, store: Box<dyn SettingsStore>, engine: SyncEngine) -> Self {
        Self { settings, store, engine }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Enable toggle. Enabling runs an immediate silent pass; disabling
    /// retires every named binding and confirms the cleanup.
    pub fn set_enabled(&mut self, enabled: bool, ctx: &Value) {
        self.settings.is_enabled = enabled;
        self.persist();
        if enabled {
            self.engine.refresh(&self.settings, ctx, RefreshKind::Automatic);
        } else {
            self.engine.cleanup(&self.settings);
            self.engine
                .notifier()
                .info("Context binding disabled; all created macros and variables were cleared.");
        }
    }

    /// Creation-mode radio. Cleanup of the previous mode's bindings runs
    /// first; the forced re-synchronization follows the flush settle delay.
    pub async fn set_creation_mode(&mut self, mode: CreationMode, ctx: &Value) {
        self.settings.creation_mode = mode;
        self.persist();
        self.engine.change_mode(&self.settings, ctx).await;
    }

    /// Free-text input on one row. Returns the stored text when it differs
    /// from what was typed (binding names are sanitized on every edit), so
    /// the UI can echo the canonical value back into the field.
    pub fn edit_mapping(&mut self, index: usize, field: MappingField, value: &str) -> Option<String> {
        if !self.settings.mappings.edit(index, field, value) {
            return None;
        }
        self.persist();
        if field == MappingField::MacroName {
            let stored = sanitize_macro_name(value);
            if stored != value {
                return Some(stored);
            }
        }
        None
    }

    pub fn add_mapping(&mut self) {
        self.settings.mappings.add();
        self.persist();
        self.engine.notifier().info("New mapping row added.");
    }

    pub fn remove_mapping(&mut self, index: usize) -> bool {
        if self.settings.mappings.remove(index) {
            self.persist();
            self.engine.notifier().info("Mapping row removed.");
            true
        } else {
            false
        }
    }

    /// The explicit refresh action: always runs and always reports a
    /// summary, even when the engine is disabled or nothing publishes.
    pub fn manual_refresh(&mut self, ctx: &Value) -> usize {
        self.engine.refresh(&self.settings, ctx, RefreshKind::Manual)
    }

    /// Automatic trigger from the host event stream; silent.
    pub fn handle_event(&mut self, event: ContextEvent, ctx: &Value) {
        debug!(%event, "context event");
        self.engine.refresh(&self.settings, ctx, RefreshKind::Automatic);
    }

    fn persist(&self) {
        // Persistence failures never interrupt the user action.
        if let Err(e) = self.store.persist(&self.settings) {
            error!("failed to persist settings: {e}");
        }
    }
}
