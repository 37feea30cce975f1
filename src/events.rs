use std::{fmt, sync::Arc, thread};

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ContentEvent {
    ContentCreated,
    ContentUpdated,
    ContentDeleted,
}

impl ContentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEvent::ContentCreated => "ContentCreated",
            ContentEvent::ContentUpdated => "ContentUpdated",
            ContentEvent::ContentDeleted => "ContentDeleted",
        }
    }
}

impl fmt::Display for ContentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives committed content mutations. Implementations must return
/// immediately; delivery happens off the caller's thread.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, event: ContentEvent, payload: Value);
}

/// One consumer of content events (a webhook, an audit log, ...).
pub trait EventSubscriber: Send + Sync {
    fn name(&self) -> &str;
    fn handle(&self, event: ContentEvent, payload: &Value) -> anyhow::Result<()>;
}

/// Fans each event out to every subscriber on its own thread. Failures are
/// logged and never reach the dispatching caller.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl EventDispatcher for EventBus {
    fn dispatch(&self, event: ContentEvent, payload: Value) {
        for subscriber in &self.subscribers {
            let subscriber = Arc::clone(subscriber);
            let payload = payload.clone();
            let spawned = thread::Builder::new()
                .name(format!("event-{}", subscriber.name()))
                .spawn(move || {
                    if let Err(e) = subscriber.handle(event, &payload) {
                        log::warn!(
                            "event {} not delivered to {}: {:#}",
                            event,
                            subscriber.name(),
                            e
                        );
                    }
                });
            if let Err(e) = spawned {
                log::warn!("could not spawn dispatcher for event {}: {}", event, e);
            }
        }
    }
}

/// Writes every event to the log.
pub struct LogSubscriber;

impl EventSubscriber for LogSubscriber {
    fn name(&self) -> &str {
        "log"
    }

    fn handle(&self, event: ContentEvent, payload: &Value) -> anyhow::Result<()> {
        log::info!("📣 {} {}", event, payload);
        Ok(())
    }
}

pub struct NoopDispatcher;

impl EventDispatcher for NoopDispatcher {
    fn dispatch(&self, _event: ContentEvent, _payload: Value) {}
}
