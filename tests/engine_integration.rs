//! Integration tests driving the engine and the configuration surface
//! end-to-end through the public API.

use std::sync::{Arc, Mutex};

use ctxbind::host::{
    JsonFileStore, MacroRegistry, MemoryMacroRegistry, MemoryVariableStore, Notifier,
    SettingsStore, SinkError, VariableStore,
};
use ctxbind::{
    ContextEvent, CreationMode, MappingField, RefreshKind, Settings, SettingsPanel, SyncEngine,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Records every sink call in order; doubles as both sinks so relative
/// ordering across the two is observable.
#[derive(Default)]
struct RecordingSink {
    ops: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn push(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

impl MacroRegistry for RecordingSink {
    fn register(&self, name: &str, value: &str, _description: &str) -> Result<(), SinkError> {
        self.push(format!("register {name}={value}"));
        Ok(())
    }

    fn unregister(&self, name: &str) -> Result<(), SinkError> {
        self.push(format!("unregister {name}"));
        Ok(())
    }
}

impl VariableStore for RecordingSink {
    fn set(&self, name: &str, value: &str) -> Result<(), SinkError> {
        self.push(format!("set {name}={value}"));
        Ok(())
    }

    fn flush(&self, name: &str) -> Result<(), SinkError> {
        self.push(format!("flush {name}"));
        Ok(())
    }
}

struct QuietNotifier;

impl Notifier for QuietNotifier {
    fn info(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
}

fn sample_context() -> Value {
    json!({
        "name": "Seraphina",
        "chat": [
            { "mes": "hello", "is_user": true },
            { "mes": "goodbye", "is_user": false },
        ],
        "stats": { "turns": 2 },
    })
}

fn recording_panel(store: Box<dyn SettingsStore>) -> (SettingsPanel, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let engine = SyncEngine::new(sink.clone(), sink.clone(), Arc::new(QuietNotifier));
    (SettingsPanel::new(Settings::default(), store, engine), sink)
}

struct NullStore;

impl SettingsStore for NullStore {
    fn persist(&self, _settings: &Settings) -> color_eyre::Result<()> {
        Ok(())
    }
}

fn add_row(panel: &mut SettingsPanel, path: &str, name: &str) {
    panel.add_mapping();
    let index = panel.settings().mappings.len() - 1;
    panel.edit_mapping(index, MappingField::ContextPath, path);
    panel.edit_mapping(index, MappingField::MacroName, name);
}

#[test]
fn test_settings_survive_a_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    let store = JsonFileStore::new(&path);

    // First load: nothing on disk yet, defaults apply.
    assert_eq!(store.load().unwrap(), Settings::default());

    let (mut panel, _sink) = recording_panel(Box::new(store));
    add_row(&mut panel, "chat[last].mes", "last mes");
    let expected = panel.settings().clone();

    // The edit handlers persisted after every mutation; a fresh store sees
    // the sanitized row.
    let reloaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(reloaded, expected);
    assert_eq!(reloaded.mappings[0].macro_name, "last_mes");

    // On-disk record keeps the original wire names.
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["mappings"][0]["contextPath"], "chat[last].mes");
    assert_eq!(raw["creationMode"], "macro");
}

#[test]
fn test_refresh_is_idempotent() {
    let macros = Arc::new(MemoryMacroRegistry::default());
    let variables = Arc::new(MemoryVariableStore::default());
    let engine = SyncEngine::new(macros.clone(), variables.clone(), Arc::new(QuietNotifier));
    let mut panel = SettingsPanel::new(Settings::default(), Box::new(NullStore), engine);
    add_row(&mut panel, "chat[last].mes", "last_mes");
    add_row(&mut panel, "stats.turns", "turns");
    let before = panel.settings().clone();
    let ctx = sample_context();

    let first = panel.manual_refresh(&ctx);
    let snapshot = macros.snapshot();
    let second = panel.manual_refresh(&ctx);

    assert_eq!(first, 2);
    assert_eq!(second, first);
    assert_eq!(macros.snapshot(), snapshot);
    assert_eq!(panel.settings(), &before);
}

#[test]
fn test_event_triggers_resync() {
    let macros = Arc::new(MemoryMacroRegistry::default());
    let variables = Arc::new(MemoryVariableStore::default());
    let engine = SyncEngine::new(macros.clone(), variables, Arc::new(QuietNotifier));
    let mut panel = SettingsPanel::new(Settings::default(), Box::new(NullStore), engine);
    add_row(&mut panel, "chat[last].mes", "last_mes");

    let mut ctx = sample_context();
    panel.handle_event(ContextEvent::AppReady, &ctx);
    assert_eq!(macros.snapshot()["last_mes"].value, "goodbye");

    // The host appends a message and fires the render event.
    ctx["chat"].as_array_mut().unwrap().push(json!({ "mes": "again" }));
    panel.handle_event(ContextEvent::MessageRendered, &ctx);
    assert_eq!(macros.snapshot()["last_mes"].value, "again");
}

#[test]
fn test_disable_retires_every_named_binding() {
    let (mut panel, sink) = recording_panel(Box::new(NullStore));
    add_row(&mut panel, "chat[last].mes", "one");
    add_row(&mut panel, "stats.turns", "two");
    // A row without a binding name never reaches the sinks.
    panel.add_mapping();
    let ctx = sample_context();
    panel.manual_refresh(&ctx);

    panel.set_enabled(false, &ctx);

    let ops = sink.ops();
    let unregisters = ops.iter().filter(|op| op.starts_with("unregister ")).count();
    let flushes = ops.iter().filter(|op| op.starts_with("flush ")).count();
    assert_eq!(unregisters, 2);
    assert_eq!(flushes, 2);

    // Disabled: triggers do nothing.
    let before = sink.ops().len();
    panel.handle_event(ContextEvent::ChatChanged, &ctx);
    assert_eq!(sink.ops().len(), before);
}

#[tokio::test]
async fn test_mode_switch_cleans_up_before_publishing() {
    let (mut panel, sink) = recording_panel(Box::new(NullStore));
    add_row(&mut panel, "chat[last].mes", "last_mes");
    let ctx = sample_context();
    panel.manual_refresh(&ctx);
    assert_eq!(sink.ops(), ["register last_mes=goodbye"]);

    panel.set_creation_mode(CreationMode::Variable, &ctx).await;

    // Both cleanup paths run before anything publishes under the new mode.
    assert_eq!(
        sink.ops(),
        [
            "register last_mes=goodbye",
            "unregister last_mes",
            "flush last_mes",
            "set last_mes=goodbye",
        ],
    );
    assert_eq!(panel.settings().creation_mode, CreationMode::Variable);
}

#[tokio::test]
async fn test_mode_switch_back_cleans_both_sinks_again() {
    let (mut panel, sink) = recording_panel(Box::new(NullStore));
    add_row(&mut panel, "stats.turns", "turns");
    let ctx = sample_context();

    panel.set_creation_mode(CreationMode::Variable, &ctx).await;
    panel.set_creation_mode(CreationMode::Macro, &ctx).await;

    let ops = sink.ops();
    // Second switch must retire the variable created under the first.
    assert_eq!(
        ops,
        [
            "unregister turns",
            "flush turns",
            "set turns=2",
            "unregister turns",
            "flush turns",
            "register turns=2",
        ],
    );
}

#[test]
fn test_engine_refresh_direct_with_kind() {
    // The engine alone, without the panel, honors the manual/automatic
    // distinction for the disabled warning.
    let sink = Arc::new(RecordingSink::default());
    let engine = SyncEngine::new(sink.clone(), sink.clone(), Arc::new(QuietNotifier));
    let settings = Settings { is_enabled: false, ..Settings::default() };
    assert_eq!(engine.refresh(&settings, &sample_context(), RefreshKind::Automatic), 0);
    assert_eq!(engine.refresh(&settings, &sample_context(), RefreshKind::Manual), 0);
    assert!(sink.ops().is_empty());
}
