//! Per-subscriber outbound buffer
//!
//! A small, fixed-capacity queue between the fan-out path and one
//! subscriber's delivery task. Pushing never waits: when the queue is full the
//! oldest frame is dropped so the buffer always holds the most recent frames.
//! Receiving waits until a frame arrives or the buffer is closed.

use std::collections::VecDeque;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// One opaque binary message forwarded verbatim from publisher to subscribers.
pub type Frame = Bytes;

/// Why a buffer stopped accepting frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The subscriber's own connection went away. Buffered frames are discarded.
    Detached,
    /// The publisher left. Buffered frames are still handed out before `recv`
    /// reports the close.
    Evicted,
}

/// Result of offering a frame to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Queued,
    /// Queued after dropping the oldest buffered frame.
    DroppedOldest,
    /// The buffer is closed; the frame was not queued.
    Closed,
}

#[derive(Debug, Default)]
struct BufferState {
    frames: VecDeque<Frame>,
    closed: Option<CloseReason>,
}

#[derive(Debug)]
pub struct FrameBuffer {
    capacity: usize,
    state: Mutex<BufferState>,
    ready: Notify,
    on_close: Notify,
}

impl FrameBuffer {
    /// Create a buffer holding at most `capacity` frames (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(BufferState {
                frames: VecDeque::with_capacity(capacity),
                closed: None,
            }),
            ready: Notify::new(),
            on_close: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue `frame` without waiting, evicting the oldest frame when full.
    pub fn push(&self, frame: Frame) -> Push {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed.is_some() {
                return Push::Closed;
            }
            let outcome = if state.frames.len() >= self.capacity {
                state.frames.pop_front();
                Push::DroppedOldest
            } else {
                Push::Queued
            };
            state.frames.push_back(frame);
            outcome
        };
        self.ready.notify_one();
        outcome
    }

    /// Wait for the next frame. Returns `None` once the buffer is closed and
    /// has nothing left to hand out.
    ///
    /// Intended for a single consumer.
    pub async fn recv(&self) -> Option<Frame> {
        loop {
            {
                let mut state = self.state.lock();
                if let Some(frame) = state.frames.pop_front() {
                    return Some(frame);
                }
                if state.closed.is_some() {
                    return None;
                }
            }
            self.ready.notified().await;
        }
    }

    /// Take the oldest frame without waiting.
    #[cfg(test)]
    pub(crate) fn try_recv(&self) -> Option<Frame> {
        self.state.lock().frames.pop_front()
    }

    /// Close the buffer. Only the first call has any effect; it returns `true`.
    pub fn close(&self, reason: CloseReason) -> bool {
        {
            let mut state = self.state.lock();
            if state.closed.is_some() {
                return false;
            }
            state.closed = Some(reason);
            if reason == CloseReason::Detached {
                state.frames.clear();
            }
        }
        self.ready.notify_one();
        self.on_close.notify_waiters();
        true
    }

    /// Wait until the buffer is closed, whatever is still queued.
    pub async fn closed(&self) {
        loop {
            let notified = self.on_close.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.state.lock().closed
    }

    pub fn is_closed(&self) -> bool {
        self.close_reason().is_some()
    }
}
