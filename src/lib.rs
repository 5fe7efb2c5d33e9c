//! # FrameRelay
//!
//! `framerelay` is a live binary-stream relay built with Rust. One publisher
//! per named channel pushes opaque binary frames over a WebSocket; every
//! subscriber attached to that channel receives them in order, at best
//! effort. A slow subscriber loses its oldest frames instead of slowing the
//! publisher or anyone else.
//!
//! ## Core Modules
//!
//! - `hub`: channel registry, fan-out router and per-subscriber buffers.
//! - `transport`: the WebSocket listener and the publisher/subscriber sessions.
//! - `client`: a small client for smoke-testing a running relay.
//! - `config`: loading and merging server configuration.
//! - `utils`: shared utilities such as error handling and logging.

pub mod client;
pub mod config;
pub mod hub;
pub mod transport;
pub mod utils;
