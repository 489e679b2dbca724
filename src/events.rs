/// In-process publish/subscribe bus
///
/// Mutations publish change notifications after persistence succeeds
/// and before the response is produced. Delivery is fire-and-forget:
/// publishing with no subscribers is not an error, and a slow
/// subscriber that lags simply misses events.

use serde_json::Value;
use tokio::sync::broadcast;

pub const EXPENSE_CREATED: &str = "expense.created";
pub const EXPENSE_UPDATED: &str = "expense.updated";
pub const EXPENSE_DELETED: &str = "expense.deleted";

#[derive(Debug, Clone)]
pub struct Event {
    pub topic: String,
    pub payload: Value,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a payload under a topic. Never fails; a send error only
    /// means nobody is listening right now.
    pub fn publish(&self, topic: &str, payload: Value) {
        let event = Event {
            topic: topic.to_string(),
            payload,
        };
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(topic = topic, receivers = receivers, "Event published");
            }
            Err(_) => {
                tracing::debug!(topic = topic, "Event published with no subscribers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(EXPENSE_CREATED, json!({"id": "x"}));
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(EXPENSE_UPDATED, json!({"amount": 12.5}));

        let event = rx.recv().await.expect("no event received");
        assert_eq!(event.topic, EXPENSE_UPDATED);
        assert_eq!(event.payload["amount"], 12.5);
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(EXPENSE_DELETED, json!({"id": "y"}));

        assert_eq!(first.recv().await.expect("lost event").topic, EXPENSE_DELETED);
        assert_eq!(second.recv().await.expect("lost event").topic, EXPENSE_DELETED);
    }
}
