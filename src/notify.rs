use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::Event;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub of change events per house.
pub struct NotifyHub {
    channels: DashMap<String, broadcast::Sender<Event>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events for a house. Creates the channel if needed.
    pub fn subscribe(&self, house_id: &str) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(house_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an event on its house's channel. No-op if nobody is listening.
    pub fn send(&self, event: &Event) {
        if let Some(sender) = self.channels.get(event.house_id()) {
            let _ = sender.send(event.clone());
        }
    }

    /// Drop a house's channel (e.g. when the listing is deleted).
    pub fn remove(&self, house_id: &str) {
        self.channels.remove(house_id);
    }
}
