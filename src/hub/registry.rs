//! Channel registry
//!
//! Maps each channel identifier to its live publisher and that publisher's
//! attached subscribers. This map is the only state shared between
//! connection tasks; every mutation goes through one of the four operations
//! below, each performed under a single write lock so they are atomic with
//! respect to one another. No I/O happens while the lock is held.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::debug;

use crate::hub::error::RegistryError;
use crate::hub::subscriber::{Subscriber, SubscriberId};

/// Opaque, case-sensitive name of one logical stream.
pub type ChannelId = String;

#[derive(Debug)]
struct Publisher {
    subscribers: HashMap<SubscriberId, Subscriber>,
    registered_at: Instant,
}

#[derive(Debug, Default)]
pub struct ChannelRegistry {
    publishers: RwLock<HashMap<ChannelId, Publisher>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new publisher to `channel`. Fails if one is already live.
    pub fn register(&self, channel: &str) -> Result<(), RegistryError> {
        let mut publishers = self.publishers.write();
        if publishers.contains_key(channel) {
            return Err(RegistryError::AlreadyInUse(channel.to_string()));
        }
        publishers.insert(
            channel.to_string(),
            Publisher {
                subscribers: HashMap::new(),
                registered_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Remove the publisher for `channel` and hand back its subscribers so the
    /// caller can close them. Unregistering an absent channel returns nothing.
    pub fn unregister(&self, channel: &str) -> Vec<Subscriber> {
        let removed = self.publishers.write().remove(channel);
        match removed {
            Some(publisher) => {
                debug!(
                    channel = %channel,
                    live_for_ms = publisher.registered_at.elapsed().as_millis() as u64,
                    "publisher entry removed"
                );
                publisher.subscribers.into_values().collect()
            }
            None => Vec::new(),
        }
    }

    /// Add `subscriber` to the live publisher of `channel`.
    pub fn attach(&self, channel: &str, subscriber: Subscriber) -> Result<(), RegistryError> {
        let mut publishers = self.publishers.write();
        let publisher = publishers
            .get_mut(channel)
            .ok_or_else(|| RegistryError::PublisherNotFound(channel.to_string()))?;
        publisher.subscribers.insert(subscriber.id(), subscriber);
        Ok(())
    }

    /// Remove a subscriber from `channel`'s publisher. Returns whether it was
    /// still attached; a missing publisher or subscriber is not an error.
    pub fn detach(&self, channel: &str, subscriber: &SubscriberId) -> bool {
        self.publishers
            .write()
            .get_mut(channel)
            .and_then(|publisher| publisher.subscribers.remove(subscriber))
            .is_some()
    }

    /// Point-in-time copy of the subscribers attached to `channel`, or `None`
    /// when no publisher is registered. Takes only the shared lock.
    pub fn subscribers(&self, channel: &str) -> Option<Vec<Subscriber>> {
        self.publishers
            .read()
            .get(channel)
            .map(|publisher| publisher.subscribers.values().cloned().collect())
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.publishers.read().contains_key(channel)
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.publishers
            .read()
            .get(channel)
            .map_or(0, |publisher| publisher.subscribers.len())
    }

    /// Number of channels with a live publisher.
    pub fn len(&self) -> usize {
        self.publishers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
