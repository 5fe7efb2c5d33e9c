//! Subscriber session
//!
//! Connecting → Attached → Draining → Closed. Once attached the connection is
//! split: a spawned delivery task writes buffered frames out, while the
//! session itself reads only to notice the peer going away. Whichever side
//! finishes first ends the session; the buffer is closed exactly once either
//! way. Once the buffer closes, delivery has [`CLOSE_TIMEOUT`] to finish
//! before the connection is dropped, so a peer that stopped reading cannot
//! hold the session open.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info};
use tungstenite::protocol::Message as WsMessage;

use crate::hub::{CloseReason, Hub, Subscriber};
use crate::transport::close::{
    CLOSE_TIMEOUT, publisher_disconnected, publisher_not_found, send_close,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberOutcome {
    /// No publisher for the channel; never attached.
    Rejected,
    /// The subscriber's connection closed or failed.
    Detached,
    /// The publisher left and the subscriber was closed with it.
    Evicted,
}

pub async fn run_subscriber<S>(
    mut ws: WebSocketStream<S>,
    channel: String,
    hub: Arc<Hub>,
) -> SubscriberOutcome
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let subscriber = hub.new_subscriber(&channel);
    if let Err(e) = hub.registry().attach(&channel, subscriber.clone()) {
        info!(channel = %channel, error = %e, "subscriber rejected");
        send_close(&mut ws, publisher_not_found()).await;
        return SubscriberOutcome::Rejected;
    }
    info!(channel = %channel, subscriber = %subscriber.id(), "subscriber attached");

    let (sink, mut stream) = ws.split();
    let mut delivery = tokio::spawn(deliver(sink, subscriber.clone()));

    let delivered = tokio::select! {
        _ = watch_liveness(&mut stream) => false,
        _ = &mut delivery => true,
        // Eviction: whatever is left to drain shares one close deadline.
        _ = subscriber.buffer().closed() => false,
    };

    hub.registry().detach(&channel, &subscriber.id());
    subscriber.detach();
    if !delivered && tokio::time::timeout(CLOSE_TIMEOUT, &mut delivery).await.is_err() {
        debug!(subscriber = %subscriber.id(), "delivery stalled, dropping connection");
        delivery.abort();
        let _ = delivery.await;
    }

    let outcome = match subscriber.buffer().close_reason() {
        Some(CloseReason::Evicted) => SubscriberOutcome::Evicted,
        _ => SubscriberOutcome::Detached,
    };
    info!(
        channel = %channel,
        subscriber = %subscriber.id(),
        outcome = ?outcome,
        "subscriber closed"
    );
    outcome
}

/// Write buffered frames until the buffer closes or a write fails. An evicted
/// subscriber gets the remaining frames followed by the publisher-disconnected
/// close frame.
async fn deliver<S>(mut sink: SplitSink<WebSocketStream<S>, WsMessage>, subscriber: Subscriber)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let buffer = subscriber.buffer();
    while let Some(frame) = buffer.recv().await {
        if let Err(e) = sink.send(WsMessage::Binary(frame)).await {
            debug!(subscriber = %subscriber.id(), error = %e, "subscriber write failed");
            subscriber.detach();
            return;
        }
    }

    if buffer.close_reason() == Some(CloseReason::Evicted) {
        send_close(&mut sink, publisher_disconnected()).await;
    } else {
        let _ = tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await;
    }
}

/// Read and discard everything the subscriber sends; return once it closes
/// or the connection fails.
async fn watch_liveness<S>(stream: &mut SplitStream<WebSocketStream<S>>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(WsMessage::Close(_)) => return,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "subscriber read failed");
                return;
            }
        }
    }
}
