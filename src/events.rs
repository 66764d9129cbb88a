//! Host lifecycle events that trigger a synchronization pass.

use strum::Display;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The six host events the engine reacts to. Delivery is in source order and
/// never coalesced; a burst of triggers yields back-to-back passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContextEvent {
    AppReady,
    ChatChanged,
    MessageSwiped,
    MessageEdited,
    MessageDeleted,
    MessageRendered,
}

/// Channel pair connecting the host's event source to the engine. The
/// publisher is the handle the host retains after setup; closing or dropping
/// the stream is the symmetric teardown.
pub struct EventBus;

impl EventBus {
    pub fn channel() -> (EventPublisher, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventPublisher { tx }, EventStream { rx })
    }
}

#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: UnboundedSender<ContextEvent>,
}

impl EventPublisher {
    /// `false` once the stream side has been torn down.
    pub fn publish(&self, event: ContextEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct EventStream {
    rx: UnboundedReceiver<ContextEvent>,
}

impl EventStream {
    /// Next event, or `None` once every publisher is gone.
    pub async fn next(&mut self) -> Option<ContextEvent> {
        self.rx.recv().await
    }

    /// Stop accepting new events; already-queued ones still drain.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
