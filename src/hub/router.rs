//! Fan-out of publisher frames to subscriber buffers.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::hub::buffer::{Frame, Push};
use crate::hub::registry::ChannelRegistry;

#[derive(Debug, Clone)]
pub struct FanoutRouter {
    registry: Arc<ChannelRegistry>,
}

impl FanoutRouter {
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self { registry }
    }

    /// Offer `frame` to every subscriber currently attached to `channel`.
    ///
    /// The subscriber set is snapshotted under the shared lock, which is
    /// released before any buffer is touched. A full buffer loses its oldest
    /// frame rather than holding up the publisher. A channel without a
    /// publisher is a no-op. Returns how many buffers accepted the frame.
    pub fn broadcast(&self, channel: &str, frame: Frame) -> usize {
        let Some(subscribers) = self.registry.subscribers(channel) else {
            trace!(channel = %channel, "frame for channel without publisher dropped");
            return 0;
        };

        let mut accepted = 0;
        for subscriber in &subscribers {
            match subscriber.deliver(frame.clone()) {
                Push::Queued => accepted += 1,
                Push::DroppedOldest => {
                    accepted += 1;
                    debug!(
                        channel = %channel,
                        subscriber = %subscriber.id(),
                        "subscriber buffer full, oldest frame dropped"
                    );
                }
                Push::Closed => {}
            }
        }
        accepted
    }
}
