//! Topic-based event bus implementation.

use tokio::sync::broadcast;

use super::types::Event;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Notices addressed to players
    Notices,
    /// Dispatched chat commands
    Commands,
    /// Warmup completions and cancellations
    Ticks,
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Notice(_) => Topic::Notices,
            Event::Command(_) => Topic::Commands,
            Event::Tick { .. } => Topic::Ticks,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events sent while
/// nobody listens are dropped.
#[derive(Clone)]
pub struct EventBus {
    notices: broadcast::Sender<Event>,
    commands: broadcast::Sender<Event>,
    ticks: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            notices: broadcast::channel(capacity).0,
            commands: broadcast::channel(capacity).0,
            ticks: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Notices => &self.notices,
            Topic::Commands => &self.commands,
            Topic::Ticks => &self.ticks,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
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
            .field("notice_subscribers", &self.notices.receiver_count())
            .field("command_subscribers", &self.commands.receiver_count())
            .field("tick_subscribers", &self.ticks.receiver_count())
            .finish()
    }
}
