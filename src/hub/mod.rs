//! The `hub` module is the relay core: it tracks which publisher owns each
//! channel, which subscribers are attached to it, and moves frames from the
//! one to the many.
//!
//! - `registry`: channel → publisher map with atomic register/unregister/attach/detach.
//! - `router`: non-blocking fan-out of one frame to every attached subscriber.
//! - `buffer`: bounded per-subscriber queue that drops its oldest frame when full.
//! - `subscriber`: the handle shared between the registry and a subscriber session.

pub mod buffer;
pub mod error;
pub mod registry;
pub mod router;
pub mod subscriber;

use std::sync::Arc;

pub use buffer::{CloseReason, Frame, FrameBuffer, Push};
pub use error::RegistryError;
pub use registry::{ChannelId, ChannelRegistry};
pub use router::FanoutRouter;
pub use subscriber::{Subscriber, SubscriberId};

use crate::config::RelaySettings;

/// Shared state handed to every connection task.
#[derive(Debug)]
pub struct Hub {
    registry: Arc<ChannelRegistry>,
    router: FanoutRouter,
    buffer_capacity: usize,
}

impl Hub {
    pub fn new(settings: &RelaySettings) -> Self {
        Self::with_capacity(settings.buffer_capacity)
    }

    pub fn with_capacity(buffer_capacity: usize) -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        Self {
            router: FanoutRouter::new(registry.clone()),
            registry,
            buffer_capacity: buffer_capacity.max(1),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn router(&self) -> &FanoutRouter {
        &self.router
    }

    /// A fresh, not yet attached subscriber sized to the configured capacity.
    pub fn new_subscriber(&self, channel: &str) -> Subscriber {
        Subscriber::new(channel, self.buffer_capacity)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(&RelaySettings::default())
    }
}
