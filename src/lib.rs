pub mod events;
pub mod host;
pub mod logging;
pub mod panel;
pub mod path;
pub mod settings;
pub mod skeleton;
pub mod suggest;
pub mod sync;

// Re-export the types host integrations touch most.
pub use events::{ContextEvent, EventBus, EventPublisher, EventStream};
pub use host::{JsonFileStore, MacroRegistry, Notifier, SettingsStore, SinkError, VariableStore};
pub use panel::SettingsPanel;
pub use path::resolve;
pub use settings::{CreationMode, Mapping, MappingField, MappingList, Settings};
pub use skeleton::{Skeleton, SkeletonNode, ValueKind, build_skeleton};
pub use suggest::suggest;
pub use sync::{FLUSH_SETTLE_DELAY, RefreshKind, SyncEngine};
