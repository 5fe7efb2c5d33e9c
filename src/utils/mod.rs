//! The `utils` module provides the pieces shared across the `framerelay`
//! application: the process-level error type and logging setup.

pub mod error;
pub mod logging;

pub use error::RelayError;
