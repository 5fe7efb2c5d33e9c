//! Close frames the relay sends, and a bounded way of sending them.

use std::time::Duration;

use futures_util::{Sink, SinkExt};
use tracing::debug;
use tungstenite::protocol::frame::Utf8Bytes;
use tungstenite::protocol::CloseFrame;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::Message as WsMessage;

/// Upper bound on sending a close notification to a peer.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

pub const CHANNEL_IN_USE: &str = "ID in use";
pub const PUBLISHER_NOT_FOUND: &str = "Publisher not found";
pub const PUBLISHER_DISCONNECTED: &str = "Publisher disconnected";

/// Sent to a publisher whose channel already has a live publisher.
pub fn channel_in_use() -> CloseFrame {
    CloseFrame {
        code: CloseCode::Again,
        reason: Utf8Bytes::from_static(CHANNEL_IN_USE),
    }
}

/// Sent to a subscriber whose channel has no publisher.
pub fn publisher_not_found() -> CloseFrame {
    CloseFrame {
        code: CloseCode::Again,
        reason: Utf8Bytes::from_static(PUBLISHER_NOT_FOUND),
    }
}

/// Sent to every subscriber of a publisher that went away.
pub fn publisher_disconnected() -> CloseFrame {
    CloseFrame {
        code: CloseCode::Normal,
        reason: Utf8Bytes::from_static(PUBLISHER_DISCONNECTED),
    }
}

/// Send `frame` and close the sink, giving up after [`CLOSE_TIMEOUT`].
/// Failures only mean the peer is already gone.
pub async fn send_close<S>(sink: &mut S, frame: CloseFrame)
where
    S: Sink<WsMessage, Error = tungstenite::Error> + Unpin,
{
    let reason = frame.reason.as_str().to_owned();
    let result = tokio::time::timeout(CLOSE_TIMEOUT, async {
        sink.send(WsMessage::Close(Some(frame))).await?;
        sink.close().await
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(reason = %reason, error = %e, "close notification not delivered"),
        Err(_) => debug!(reason = %reason, "close notification timed out"),
    }
}
