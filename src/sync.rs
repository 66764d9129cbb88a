//! The synchronization engine: resolves every configured mapping against the
//! current context and publishes the stringified results to the
//! mode-selected binding sink.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::host::{MacroRegistry, Notifier, VariableStore};
use crate::path;
use crate::settings::{CreationMode, Settings};

/// Delay between mode-change cleanup and the forced re-synchronization, long
/// enough for the fire-and-forget flush directives to settle.
pub const FLUSH_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Whether a pass was requested by the user or fired by a host event. Manual
/// passes report a summary notice; automatic passes stay silent even when
/// nothing publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    Manual,
    Automatic,
}

/// Re-evaluates mappings on demand. Enable state and creation mode live in
/// [`Settings`]; the engine reads them and never mutates them.
pub struct SyncEngine {
    macros: Arc<dyn MacroRegistry>,
    variables: Arc<dyn VariableStore>,
    notifier: Arc<dyn Notifier>,
}

impl SyncEngine {
    pub fn new(
        macros: Arc<dyn MacroRegistry>,
        variables: Arc<dyn VariableStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { macros, variables, notifier }
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Run one synchronization pass. Returns how many mappings published a
    /// value.
    ///
    /// Rows missing a path or a binding name are skipped silently; rows
    /// whose path resolves to nothing are logged and skipped, leaving any
    /// previously published value untouched; sink rejections are logged and
    /// the pass continues.
    pub fn refresh(&self, settings: &Settings, ctx: &Value, kind: RefreshKind) -> usize {
        if !settings.is_enabled {
            if kind == RefreshKind::Manual {
                self.notifier.warning("Context binding is disabled.");
            }
            return 0;
        }

        let mut published = 0usize;
        for mapping in settings.mappings.iter() {
            if !mapping.is_configured() {
                continue;
            }
            let Some(value) = path::resolve(ctx, &mapping.context_path) else {
                warn!(path = %mapping.context_path, "no value found for mapping");
                continue;
            };
            let rendered = render_value(value);
            let result = match settings.creation_mode {
                CreationMode::Variable => self.variables.set(&mapping.macro_name, &rendered),
                CreationMode::Macro => {
                    let description = if mapping.description.is_empty() {
                        default_description(&mapping.context_path)
                    } else {
                        mapping.description.clone()
                    };
                    self.macros.register(&mapping.macro_name, &rendered, &description)
                }
            };
            match result {
                Ok(()) => published += 1,
                Err(e) => error!(name = %mapping.macro_name, "binding sink rejected write: {e}"),
            }
        }

        if kind == RefreshKind::Manual {
            if published > 0 {
                let mode = settings.creation_mode;
                self.notifier.success(&format!("Refreshed {published} {mode}(s)."));
            } else {
                self.notifier.info("No valid mappings to refresh, or no values found.");
            }
        }
        published
    }

    /// Retire every named binding: unregister the macro and flush the
    /// variable for each, regardless of the current creation mode, so no
    /// stale binding survives a mode that was active earlier in the session.
    /// Returns how many names were retired.
    pub fn cleanup(&self, settings: &Settings) -> usize {
        let mut retired = 0usize;
        for mapping in settings.mappings.iter() {
            if mapping.macro_name.is_empty() {
                continue;
            }
            if let Err(e) = self.macros.unregister(&mapping.macro_name) {
                error!(name = %mapping.macro_name, "macro unregister failed: {e}");
            }
            if let Err(e) = self.variables.flush(&mapping.macro_name) {
                error!(name = %mapping.macro_name, "variable flush failed: {e}");
            }
            retired += 1;
        }
        debug!(retired, "retired bindings");
        retired
    }

    /// Mode change while enabled: retire everything created under the
    /// previous mode, let the flush directives settle, then force a full
    /// pass under the new mode (already recorded in `settings`).
    pub async fn change_mode(&self, settings: &Settings, ctx: &Value) {
        self.cleanup(settings);
        tokio::time::sleep(FLUSH_SETTLE_DELAY).await;
        self.refresh(settings, ctx, RefreshKind::Automatic);
        let mode = settings.creation_mode;
        self.notifier.info(&format!("Switched to {mode} mode and refreshed."));
    }
}

/// Stringify a resolved value for publication: strings publish their raw
/// contents, anything else its compact JSON rendering.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn default_description(path: &str) -> String {
    format!("Value from '{path}' (via ctxbind)")
}
