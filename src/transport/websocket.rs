//! WebSocket listener
//!
//! Accepts TCP connections, resolves the requested endpoint and channel
//! during the HTTP upgrade, then hands the upgraded connection to a publisher
//! or subscriber session. Each connection runs on its own task; a failure in
//! one never reaches the listener or any other connection.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tracing::{Instrument, debug, info, info_span, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};

use crate::hub::Hub;
use crate::transport::publisher::run_publisher;
use crate::transport::route::{Endpoint, Route};
use crate::transport::subscriber::run_subscriber;
use crate::utils::RelayError;

/// Bind the listen address. Failure here is fatal to the process.
pub async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr).await.map_err(|source| RelayError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, hub: Arc<Hub>) {
    if let Ok(addr) = listener.local_addr() {
        info!("WebSocket relay listening on ws://{addr}");
    }

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let hub = hub.clone();
                tokio::spawn(
                    handle_connection(stream, hub).instrument(info_span!("conn", %peer)),
                );
            }
            Err(e) => warn!(error = %e, "accept failed"),
        }
    }
}

async fn handle_connection(stream: TcpStream, hub: Arc<Hub>) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "could not disable Nagle");
    }

    let mut route = None;
    let ws = match accept_hdr_async(stream, |req: &Request, resp: Response| {
        route_request(req, resp, &mut route)
    })
    .await
    {
        Ok(ws) => ws,
        Err(e) => {
            debug!(error = %e, "handshake failed");
            return;
        }
    };
    let Some(Route { endpoint, channel }) = route else {
        return;
    };

    match endpoint {
        Endpoint::Publish => {
            run_publisher(ws, channel, hub).await;
        }
        Endpoint::Subscribe => {
            run_subscriber(ws, channel, hub).await;
        }
    }
}

fn route_request(
    req: &Request,
    resp: Response,
    route: &mut Option<Route>,
) -> Result<Response, ErrorResponse> {
    match Route::from_uri(req.uri()) {
        Ok(resolved) => {
            *route = Some(resolved);
            Ok(resp)
        }
        Err(e) => {
            info!(uri = %req.uri(), status = %e.status(), error = %e, "upgrade refused");
            Err(e.into_response())
        }
    }
}
