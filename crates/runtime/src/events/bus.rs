//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{CastEvent, EffectEvent, RegistryEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Cast outcomes (success, rejection, fault)
    Cast,
    /// Projectile launches and impacts
    Effect,
    /// Catalog registration and reloads
    Registry,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Cast(CastEvent),
    Effect(EffectEvent),
    Registry(RegistryEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Cast(_) => Topic::Cast,
            Event::Effect(_) => Topic::Effect,
            Event::Registry(_) => Topic::Registry,
        }
    }
}

struct Channels {
    cast: broadcast::Sender<Event>,
    effect: broadcast::Sender<Event>,
    registry: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Cast => &self.cast,
            Topic::Effect => &self.effect,
            Topic::Registry => &self.registry,
        }
    }
}

/// Topic-based event bus
///
/// Every topic owns one broadcast channel, created up front. Clones share the
/// same channels.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                cast: broadcast::channel(capacity).0,
                effect: broadcast::channel(capacity).0,
                registry: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.get(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", %topic, "No subscribers for topic");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels.get(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("cast", &self.subscriber_count(Topic::Cast))
            .field("effect", &self.subscriber_count(Topic::Effect))
            .field("registry", &self.subscriber_count(Topic::Registry))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut registry_rx = bus.subscribe(Topic::Registry);
        let mut cast_rx = bus.subscribe(Topic::Cast);

        bus.publish(Event::Registry(RegistryEvent::Cleared));

        assert_eq!(
            registry_rx.try_recv().ok(),
            Some(Event::Registry(RegistryEvent::Cleared))
        );
        assert!(cast_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.publish(Event::Registry(RegistryEvent::Cleared));
        assert_eq!(bus.subscriber_count(Topic::Registry), 0);
    }
}
