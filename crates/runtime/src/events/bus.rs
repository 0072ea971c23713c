//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{AttackEvent, SessionEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Committed attack resolutions
    Attack,
    /// Session lifecycle (start, game over, reset, close)
    Session,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Attack(AttackEvent),
    Session(SessionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Attack(_) => Topic::Attack,
            Event::Session(_) => Topic::Session,
        }
    }
}

/// Topic-based event bus
///
/// Each topic has its own broadcast channel, so a slow session subscriber
/// never causes the announcement worker to lag.
#[derive(Clone)]
pub struct EventBus {
    attack: broadcast::Sender<Event>,
    session: broadcast::Sender<Event>,
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
            attack: broadcast::channel(capacity).0,
            session: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Attack => &self.attack,
            Topic::Session => &self.session,
        }
    }

    /// Publish an event to its corresponding topic
    ///
    /// Best-effort: with no subscribers the event is dropped.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use game_core::PlayerId;

    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut sessions = bus.subscribe(Topic::Session);
        let mut attacks = bus.subscribe(Topic::Attack);

        bus.publish(Event::Session(SessionEvent::Closed {
            player: PlayerId(1),
        }));

        assert!(matches!(
            sessions.recv().await,
            Ok(Event::Session(SessionEvent::Closed { player: PlayerId(1) }))
        ));
        assert!(matches!(
            attacks.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::new().publish(Event::Session(SessionEvent::Closed {
            player: PlayerId(1),
        }));
    }
}
