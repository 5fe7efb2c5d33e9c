//! Subscriber handle
//!
//! `Subscriber` is the cheap, cloneable handle the registry stores for every
//! attached connection. The registry owns one clone inside the publisher's
//! subscriber set; the subscriber session keeps another to drive delivery.
//! Both point at the same outbound [`FrameBuffer`].

use std::sync::Arc;

use uuid::Uuid;

use crate::hub::buffer::{CloseReason, Frame, FrameBuffer, Push};

pub type SubscriberId = Uuid;

#[derive(Debug, Clone)]
pub struct Subscriber {
    id: SubscriberId,
    /// Channel this subscriber was created for. Lookup only; the publisher's
    /// subscriber set is what keeps the subscriber attached. Clones share it.
    channel: Arc<str>,
    buffer: Arc<FrameBuffer>,
}

impl Subscriber {
    /// Create a detached subscriber for `channel` with a fresh id.
    pub fn new(channel: impl Into<Arc<str>>, capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            buffer: Arc::new(FrameBuffer::new(capacity)),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Offer a frame to this subscriber's buffer. Never waits.
    pub fn deliver(&self, frame: Frame) -> Push {
        self.buffer.push(frame)
    }

    /// Force-close this subscriber because its publisher went away.
    pub fn evict(&self) -> bool {
        self.buffer.close(CloseReason::Evicted)
    }

    /// Stop delivery because the subscriber's own connection ended.
    pub fn detach(&self) -> bool {
        self.buffer.close(CloseReason::Detached)
    }
}
