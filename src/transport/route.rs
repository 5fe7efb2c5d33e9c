//! Upgrade-request routing
//!
//! Every connection arrives as an HTTP upgrade on one of two paths and must
//! name its channel in the `id` query parameter. The route is resolved while
//! the handshake is still plain HTTP so bad requests are refused with a
//! status code instead of being upgraded.

use std::str::Utf8Error;

use percent_encoding::percent_decode_str;
use thiserror::Error;
use tungstenite::handshake::server::ErrorResponse;
use tungstenite::http::{StatusCode, Uri};

use crate::hub::ChannelId;

pub const PUBLISH_PATH: &str = "/ws/producer";
pub const SUBSCRIBE_PATH: &str = "/ws/consumer";
pub const CHANNEL_PARAM: &str = "id";

/// Role requested by the connecting peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Publish,
    Subscribe,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Publish => PUBLISH_PATH,
            Endpoint::Subscribe => SUBSCRIBE_PATH,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            PUBLISH_PATH => Some(Endpoint::Publish),
            SUBSCRIBE_PATH => Some(Endpoint::Subscribe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub endpoint: Endpoint,
    pub channel: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown endpoint: {0}")]
    UnknownPath(String),
    #[error("missing id")]
    MissingChannel,
    #[error("id is not valid UTF-8")]
    InvalidChannel,
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::UnknownPath(_) => StatusCode::NOT_FOUND,
            RouteError::MissingChannel | RouteError::InvalidChannel => StatusCode::BAD_REQUEST,
        }
    }

    /// HTTP response refusing the upgrade.
    pub fn into_response(self) -> ErrorResponse {
        let status = self.status();
        let mut response = ErrorResponse::new(Some(self.to_string()));
        *response.status_mut() = status;
        response
    }
}

impl Route {
    /// Resolve the endpoint and channel from a request URI. The channel id is
    /// percent-decoded and must not be empty.
    pub fn from_uri(uri: &Uri) -> Result<Self, RouteError> {
        let endpoint = Endpoint::from_path(uri.path())
            .ok_or_else(|| RouteError::UnknownPath(uri.path().to_string()))?;

        let channel = match uri.query() {
            Some(query) => channel_param(query)?,
            None => None,
        };
        let channel = channel
            .filter(|channel| !channel.is_empty())
            .ok_or(RouteError::MissingChannel)?;

        Ok(Route { endpoint, channel })
    }
}

/// First `id` value in a form-encoded query. Ids are compared byte for byte,
/// so one that does not decode to UTF-8 is refused rather than repaired.
fn channel_param(query: &str) -> Result<Option<ChannelId>, RouteError> {
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if !decode_component(key).is_ok_and(|key| key == CHANNEL_PARAM) {
            continue;
        }
        return decode_component(value)
            .map(Some)
            .map_err(|_| RouteError::InvalidChannel);
    }
    Ok(None)
}

fn decode_component(raw: &str) -> Result<String, Utf8Error> {
    let raw = raw.replace('+', " ");
    percent_decode_str(&raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
}
