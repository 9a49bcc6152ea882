//! In-process stand-in for the external pub/sub transport: one broadcast
//! channel per user, addressed as `notification-{userId}`. The durable
//! notification row is the source of truth; pushes are at-most-once
//! cache-invalidation hints and are dropped when nobody is subscribed.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Payload delivered on a user's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPush {
    pub content: String,
    pub sender: String,
    pub title: String,
}

#[derive(Clone)]
pub struct RealtimeBridge {
    capacity: usize,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<NotificationPush>>>>,
}

impl RealtimeBridge {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn channel_name(user_id: &str) -> String {
        format!("notification-{user_id}")
    }

    /// Subscribes the caller to `user_id`'s channel. Only that user's own
    /// sessions call this; fan-out always targets the recipient's channel,
    /// so no cross-user write access exists.
    pub fn subscribe(&self, user_id: &str) -> Result<broadcast::Receiver<NotificationPush>> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| anyhow!("realtime channel registry poisoned"))?;
        let sender = channels
            .entry(Self::channel_name(user_id))
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.subscribe())
    }

    /// Publishes to `user_id`'s channel. Returns the number of live
    /// subscribers the push reached; zero means it was dropped.
    pub fn publish(&self, user_id: &str, push: NotificationPush) -> Result<usize> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| anyhow!("realtime channel registry poisoned"))?;
        let name = Self::channel_name(user_id);
        let Some(sender) = channels.get(&name) else {
            return Ok(0);
        };
        if sender.receiver_count() == 0 {
            // Last subscriber went away; reclaim the channel.
            channels.remove(&name);
            return Ok(0);
        }
        Ok(sender.send(push).unwrap_or(0))
    }
}
