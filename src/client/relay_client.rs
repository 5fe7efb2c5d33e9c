//! Relay client
//!
//! Thin wrappers over `tokio_tungstenite::connect_async` that speak the
//! relay's two endpoints.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;
use url::Url;

use crate::transport::route::{CHANNEL_PARAM, Endpoint};
use crate::utils::RelayError;

/// What a subscriber saw before its connection ended.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubscribeSummary {
    pub frames: u64,
    pub bytes: u64,
    /// Close code and reason sent by the relay, if any.
    pub close: Option<(u16, String)>,
}

/// Build the URL of `endpoint` for `channel` on the relay at `base`
/// (e.g. `ws://127.0.0.1:9000`). Any path or query on `base` is replaced.
pub fn endpoint_url(base: &str, endpoint: Endpoint, channel: &str) -> Result<Url, RelayError> {
    let mut url = Url::parse(base)?;
    url.set_path(endpoint.path());
    url.query_pairs_mut()
        .clear()
        .append_pair(CHANNEL_PARAM, channel);
    Ok(url)
}

/// Attach to `channel` and log every frame until the relay or the network
/// ends the connection.
pub async fn subscribe(base: &str, channel: &str) -> Result<SubscribeSummary, RelayError> {
    let url = endpoint_url(base, Endpoint::Subscribe, channel)?;
    let (mut ws, _response) = connect_async(url.as_str()).await?;
    info!(%url, "connected as subscriber");

    let mut summary = SubscribeSummary::default();
    while let Some(msg) = ws.next().await {
        match msg? {
            WsMessage::Binary(frame) => {
                summary.frames += 1;
                summary.bytes += frame.len() as u64;
                info!(bytes = frame.len(), "received frame");
            }
            WsMessage::Close(frame) => {
                summary.close = frame.map(|f| (u16::from(f.code), f.reason.as_str().to_owned()));
                match &summary.close {
                    Some((code, reason)) => info!(code, reason = %reason, "relay closed connection"),
                    None => info!("relay closed connection"),
                }
                break;
            }
            _ => {}
        }
    }
    Ok(summary)
}

/// Publish the contents of each file as one frame, `interval` apart. With
/// `repeat` the files are sent in a loop until the connection fails.
/// Returns how many frames were sent.
pub async fn publish_files(
    base: &str,
    channel: &str,
    files: &[PathBuf],
    interval: Duration,
    repeat: bool,
) -> Result<u64, RelayError> {
    let mut frames = Vec::with_capacity(files.len());
    for path in files {
        frames.push(Bytes::from(tokio::fs::read(path).await?));
    }
    if frames.is_empty() {
        warn!("no files given, nothing to publish");
    }

    let url = endpoint_url(base, Endpoint::Publish, channel)?;
    let (mut ws, _response) = connect_async(url.as_str()).await?;
    info!(%url, frames = frames.len(), "connected as publisher");

    let mut sent = 0u64;
    loop {
        for frame in &frames {
            ws.send(WsMessage::Binary(frame.clone())).await?;
            sent += 1;
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }
        if !repeat || frames.is_empty() {
            break;
        }
    }

    ws.close(None).await?;
    info!(sent, "publisher finished");
    Ok(sent)
}
