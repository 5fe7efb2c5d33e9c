//! The `client` module is a minimal relay client.
//!
//! It is what the `subscribe` and `publish` subcommands use to smoke-test a
//! running relay: attach to a channel and report each frame, or push files
//! as frames.

pub mod relay_client;

pub use relay_client::{SubscribeSummary, endpoint_url, publish_files, subscribe};
