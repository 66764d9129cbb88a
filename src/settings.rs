//! Persisted extension settings: the enable flag, the publish mode, and the
//! ordered mapping rows.
//!
//! The wire format matches the original settings record
//! (`isEnabled` / `creationMode` / `mappings[].contextPath` ...), so existing
//! settings files load unchanged.

use derive_deref::{Deref, DerefMut};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("static regex");
}

/// Where refreshed values are published: the host's macro registry or its
/// local variable store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CreationMode {
    #[default]
    Macro,
    Variable,
}

/// One user-authored binding row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mapping {
    /// Path into the context, e.g. `chat[last].mes`.
    pub context_path: String,
    /// Name of the macro or variable the value is published under.
    pub macro_name: String,
    pub description: String,
}

impl Mapping {
    /// A row takes part in synchronization only once both the path and the
    /// binding name are filled in.
    pub fn is_configured(&self) -> bool {
        !self.context_path.is_empty() && !self.macro_name.is_empty()
    }
}

/// Which field of a mapping row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingField {
    ContextPath,
    MacroName,
    Description,
}

/// Ordered mapping rows. Display order is creation order and the index is
/// the row identity for edits and removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref, DerefMut)]
#[serde(transparent)]
pub struct MappingList(Vec<Mapping>);

impl MappingList {
    /// Append an empty row.
    pub fn add(&mut self) {
        self.0.push(Mapping::default());
    }

    /// Remove the row at `index`. `false` when no such row exists.
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.0.len() {
            self.0.remove(index);
            true
        } else {
            false
        }
    }

    /// Apply a field edit in place. Binding names are sanitized on every
    /// edit so they stay valid identifiers in the sink namespace. `false`
    /// when no such row exists.
    pub fn edit(&mut self, index: usize, field: MappingField, value: &str) -> bool {
        let Some(mapping) = self.0.get_mut(index) else {
            return false;
        };
        match field {
            MappingField::ContextPath => mapping.context_path = value.to_string(),
            MappingField::Description => mapping.description = value.to_string(),
            MappingField::MacroName => mapping.macro_name = sanitize_macro_name(value),
        }
        true
    }
}

/// Collapse every whitespace run to a single `_`.
pub fn sanitize_macro_name(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name, "_").into_owned()
}

/// Process-wide settings record, loaded once at startup and persisted on
/// every mutating user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub is_enabled: bool,
    pub creation_mode: CreationMode,
    pub mappings: MappingList,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_enabled: true,
            creation_mode: CreationMode::Macro,
            mappings: MappingList::default(),
        }
    }
}
