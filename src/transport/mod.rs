//! The `transport` module is responsible for the network side of the relay:
//! accepting WebSocket connections and running one session per connection.
//!
//! It resolves which endpoint and channel a connection asked for, and runs
//! publisher and subscriber sessions against the shared `Hub`.

pub mod close;
pub mod publisher;
pub mod route;
pub mod subscriber;
pub mod websocket;

pub use publisher::{PublisherOutcome, run_publisher};
pub use route::{Endpoint, Route, RouteError};
pub use subscriber::{SubscriberOutcome, run_subscriber};
pub use websocket::{bind, serve};

#[cfg(test)]
mod websocket_tests;
