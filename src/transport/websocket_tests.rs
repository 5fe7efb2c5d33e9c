use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;
use tungstenite::protocol::frame::coding::CloseCode;

use super::tests::wait_until;
use super::{bind, serve};
use crate::client::endpoint_url;
use crate::hub::Hub;
use crate::transport::route::Endpoint;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_relay(capacity: usize) -> (String, Arc<Hub>) {
    let listener = bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let hub = Arc::new(Hub::with_capacity(capacity));
    tokio::spawn(serve(listener, hub.clone()));
    (format!("ws://{addr}"), hub)
}

async fn connect(base: &str, endpoint: Endpoint, channel: &str) -> Client {
    let url = endpoint_url(base, endpoint, channel).unwrap();
    let (ws, _) = connect_async(url.as_str())
        .await
        .expect("WebSocket handshake failed");
    ws
}

/// Read until the next binary frame or close frame, skipping anything else.
async fn next_event(ws: &mut Client) -> WsMessage {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("message in time")
            .expect("stream still open")
            .expect("valid message");
        match msg {
            WsMessage::Binary(_) | WsMessage::Close(_) => return msg,
            _ => {}
        }
    }
}

async fn expect_refused(url: String, status: StatusCode) {
    match connect_async(url).await {
        Ok(_) => panic!("upgrade should have been refused"),
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), status),
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[tokio::test]
async fn test_publish_subscribe_scenario() {
    let (base, hub) = start_relay(4).await;

    let mut publisher = connect(&base, Endpoint::Publish, "cam1").await;
    wait_until(|| hub.registry().contains("cam1")).await;

    let mut s1 = connect(&base, Endpoint::Subscribe, "cam1").await;
    wait_until(|| hub.registry().subscriber_count("cam1") == 1).await;

    let mut s2 = connect(&base, Endpoint::Subscribe, "cam2").await;
    match next_event(&mut s2).await {
        WsMessage::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Again);
            assert_eq!(frame.reason.as_str(), "Publisher not found");
        }
        other => panic!("expected not-found close, got {other:?}"),
    }

    for tag in ["A", "B", "C"] {
        publisher.send(WsMessage::Binary(tag.into())).await.unwrap();
    }
    for tag in ["A", "B", "C"] {
        match next_event(&mut s1).await {
            WsMessage::Binary(frame) => assert_eq!(frame, tag),
            other => panic!("expected frame {tag}, got {other:?}"),
        }
    }

    publisher.close(None).await.unwrap();
    match next_event(&mut s1).await {
        WsMessage::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Normal);
            assert_eq!(frame.reason.as_str(), "Publisher disconnected");
        }
        other => panic!("expected publisher-disconnected close, got {other:?}"),
    }

    wait_until(|| !hub.registry().contains("cam1")).await;
    let mut successor = connect(&base, Endpoint::Publish, "cam1").await;
    wait_until(|| hub.registry().contains("cam1")).await;
    // Accepted: no close frame arrives.
    assert!(
        tokio::time::timeout(Duration::from_millis(100), successor.next())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_duplicate_publisher_leaves_live_stream_alone() {
    let (base, hub) = start_relay(4).await;

    let mut publisher = connect(&base, Endpoint::Publish, "cam1").await;
    wait_until(|| hub.registry().contains("cam1")).await;
    let mut subscriber = connect(&base, Endpoint::Subscribe, "cam1").await;
    wait_until(|| hub.registry().subscriber_count("cam1") == 1).await;

    let mut intruder = connect(&base, Endpoint::Publish, "cam1").await;
    match next_event(&mut intruder).await {
        WsMessage::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Again);
            assert_eq!(frame.reason.as_str(), "ID in use");
        }
        other => panic!("expected id-in-use close, got {other:?}"),
    }

    publisher
        .send(WsMessage::Binary("still live".into()))
        .await
        .unwrap();
    match next_event(&mut subscriber).await {
        WsMessage::Binary(frame) => assert_eq!(frame, "still live"),
        other => panic!("expected frame, got {other:?}"),
    }
    assert_eq!(hub.registry().subscriber_count("cam1"), 1);
}

#[tokio::test]
async fn test_missing_channel_is_refused_before_upgrade() {
    let (base, hub) = start_relay(4).await;

    expect_refused(format!("{base}/ws/producer"), StatusCode::BAD_REQUEST).await;
    expect_refused(format!("{base}/ws/consumer?id="), StatusCode::BAD_REQUEST).await;
    expect_refused(format!("{base}/elsewhere?id=cam1"), StatusCode::NOT_FOUND).await;
    assert!(hub.registry().is_empty());
}

#[tokio::test]
async fn test_order_preserved_when_buffer_never_fills() {
    let (base, hub) = start_relay(64).await;

    let mut publisher = connect(&base, Endpoint::Publish, "ordered").await;
    wait_until(|| hub.registry().contains("ordered")).await;
    let mut subscriber = connect(&base, Endpoint::Subscribe, "ordered").await;
    wait_until(|| hub.registry().subscriber_count("ordered") == 1).await;

    let frames: Vec<Vec<u8>> = (0u32..40).map(|i| i.to_be_bytes().to_vec()).collect();
    for frame in &frames {
        publisher
            .send(WsMessage::Binary(frame.clone().into()))
            .await
            .unwrap();
    }

    for expected in &frames {
        match next_event(&mut subscriber).await {
            WsMessage::Binary(frame) => assert_eq!(&frame[..], &expected[..]),
            other => panic!("expected frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_subscriber_disconnect_detaches_only_itself() {
    let (base, hub) = start_relay(4).await;

    let mut publisher = connect(&base, Endpoint::Publish, "cam1").await;
    wait_until(|| hub.registry().contains("cam1")).await;
    let mut leaving = connect(&base, Endpoint::Subscribe, "cam1").await;
    let mut staying = connect(&base, Endpoint::Subscribe, "cam1").await;
    wait_until(|| hub.registry().subscriber_count("cam1") == 2).await;

    leaving.close(None).await.unwrap();
    wait_until(|| hub.registry().subscriber_count("cam1") == 1).await;

    publisher.send(WsMessage::Binary("x".into())).await.unwrap();
    match next_event(&mut staying).await {
        WsMessage::Binary(frame) => assert_eq!(frame, "x"),
        other => panic!("expected frame, got {other:?}"),
    }
    assert!(hub.registry().contains("cam1"));
}

#[tokio::test]
async fn test_publisher_loss_closes_every_subscriber() {
    let (base, hub) = start_relay(4).await;

    let publisher = connect(&base, Endpoint::Publish, "cam1").await;
    wait_until(|| hub.registry().contains("cam1")).await;

    let mut subscribers = Vec::new();
    for _ in 0..3 {
        subscribers.push(connect(&base, Endpoint::Subscribe, "cam1").await);
    }
    wait_until(|| hub.registry().subscriber_count("cam1") == 3).await;

    // Abrupt loss, no close handshake.
    drop(publisher);

    for subscriber in &mut subscribers {
        match next_event(subscriber).await {
            WsMessage::Close(Some(frame)) => {
                assert_eq!(frame.code, CloseCode::Normal);
                assert_eq!(frame.reason.as_str(), "Publisher disconnected");
            }
            other => panic!("expected publisher-disconnected close, got {other:?}"),
        }
    }
    assert!(hub.registry().register("cam1").is_ok());
}
