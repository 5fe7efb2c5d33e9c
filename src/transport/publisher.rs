//! Publisher session
//!
//! Connecting → Registered → Streaming → Closed. The session owns its
//! connection's read side: every binary message is a frame for the channel.
//! When the connection ends for any reason the channel is unregistered first
//! and every subscriber that was attached is then evicted.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::hub::Hub;
use crate::transport::close::{CLOSE_TIMEOUT, channel_in_use, send_close};

/// Summary of a finished publisher session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherOutcome {
    /// Another publisher owned the channel; nothing was forwarded.
    Rejected,
    Finished { frames: u64, evicted: usize },
}

pub async fn run_publisher<S>(
    mut ws: WebSocketStream<S>,
    channel: String,
    hub: Arc<Hub>,
) -> PublisherOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(e) = hub.registry().register(&channel) {
        warn!(channel = %channel, error = %e, "publisher rejected");
        send_close(&mut ws, channel_in_use()).await;
        return PublisherOutcome::Rejected;
    }
    info!(channel = %channel, "publisher registered");

    let mut frames = 0u64;
    let mut peer_closed = false;
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(WsMessage::Binary(frame)) => {
                hub.router().broadcast(&channel, frame);
                frames += 1;
            }
            Ok(WsMessage::Close(_)) => {
                peer_closed = true;
                break;
            }
            // Text, ping and pong carry no frames.
            Ok(_) => {}
            Err(e) => {
                debug!(channel = %channel, error = %e, "publisher read failed");
                break;
            }
        }
    }

    let evicted = hub.registry().unregister(&channel);
    for subscriber in &evicted {
        subscriber.evict();
    }

    // Flush the queued reply so the publisher sees a completed handshake.
    if peer_closed {
        match tokio::time::timeout(CLOSE_TIMEOUT, SinkExt::close(&mut ws)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(channel = %channel, error = %e, "close reply not delivered"),
            Err(_) => debug!(channel = %channel, "close reply timed out"),
        }
    }

    info!(
        channel = %channel,
        frames,
        evicted = evicted.len(),
        "publisher disconnected"
    );
    PublisherOutcome::Finished {
        frames,
        evicted: evicted.len(),
    }
}
