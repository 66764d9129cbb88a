//! Contracts for the pieces the host application owns: the macro and
//! variable registries values are published into, the user-facing notifier,
//! and settings persistence.
//!
//! The in-memory implementations back the demo binary and the integration
//! tests; a real host plugs its own registries in behind the same traits.

use std::fs::{File, create_dir_all};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use color_eyre::Result;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::Settings;

/// A binding-sink write the registry refused. Always non-fatal to the
/// engine: the failure is logged and the pass continues.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("binding '{0}' was rejected by the registry")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The host's macro registry.
pub trait MacroRegistry: Send + Sync {
    /// Register or overwrite a macro.
    fn register(&self, name: &str, value: &str, description: &str) -> Result<(), SinkError>;
    fn unregister(&self, name: &str) -> Result<(), SinkError>;
}

/// The host's variable store.
pub trait VariableStore: Send + Sync {
    fn set(&self, name: &str, value: &str) -> Result<(), SinkError>;
    /// Fire-and-forget flush directive; the engine does not wait on it.
    fn flush(&self, name: &str) -> Result<(), SinkError>;
}

/// Transient user-facing notices (the host's toast sink).
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Settings persistence. Called after every mutating user action.
pub trait SettingsStore: Send + Sync {
    fn persist(&self, settings: &Settings) -> Result<()>;
}

/// A registered macro as the in-memory registry remembers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredMacro {
    pub value: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct MemoryMacroRegistry {
    entries: Mutex<IndexMap<String, RegisteredMacro>>,
}

impl MemoryMacroRegistry {
    pub fn snapshot(&self) -> IndexMap<String, RegisteredMacro> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl MacroRegistry for MemoryMacroRegistry {
    fn register(&self, name: &str, value: &str, description: &str) -> Result<(), SinkError> {
        let entry = RegisteredMacro {
            value: value.to_string(),
            description: description.to_string(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), entry);
        Ok(())
    }

    fn unregister(&self, name: &str) -> Result<(), SinkError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .shift_remove(name);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryVariableStore {
    entries: Mutex<IndexMap<String, String>>,
}

impl MemoryVariableStore {
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl VariableStore for MemoryVariableStore {
    fn set(&self, name: &str, value: &str) -> Result<(), SinkError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn flush(&self, name: &str) -> Result<(), SinkError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .shift_remove(name);
        Ok(())
    }
}

/// Routes notices into the tracing log. Useful when no interactive host is
/// attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn success(&self, message: &str) {
        info!("{message}");
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
    }
}

/// Settings persisted as pretty JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the settings record, falling back to defaults when the file is
    /// absent or empty.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SettingsStore for JsonFileStore {
    fn persist(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, settings)?;
        Ok(())
    }
}

/// Coalesces bursts of persists: the first write in a window goes straight
/// through, later ones within the window are held as pending until `flush`.
/// Callers drive `flush` at tick/shutdown boundaries; there are no ambient
/// timers.
pub struct Debounced<S: SettingsStore> {
    inner: S,
    window: Duration,
    state: Mutex<DebounceState>,
}

#[derive(Debug, Default)]
struct DebounceState {
    last_write: Option<Instant>,
    pending: Option<Settings>,
}

impl<S: SettingsStore> Debounced<S> {
    pub fn new(inner: S, window: Duration) -> Self {
        Self {
            inner,
            window,
            state: Mutex::new(DebounceState::default()),
        }
    }

    /// Write the held settings, if any.
    pub fn flush(&self) -> Result<()> {
        let pending = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.pending.take()
        };
        match pending {
            Some(settings) => self.inner.persist(&settings),
            None => Ok(()),
        }
    }
}

impl<S: SettingsStore> SettingsStore for Debounced<S> {
    fn persist(&self, settings: &Settings) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.last_write {
            Some(at) if at.elapsed() < self.window => {
                state.pending = Some(settings.clone());
                Ok(())
            }
            _ => {
                state.last_write = Some(Instant::now());
                state.pending = None;
                drop(state);
                self.inner.persist(settings)
            }
        }
    }
}
