//! Registry error types

use thiserror::Error;

use crate::hub::registry::ChannelId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A live publisher already owns the channel.
    #[error("channel already has a publisher: {0}")]
    AlreadyInUse(ChannelId),
    /// No live publisher owns the channel.
    #[error("no publisher for channel: {0}")]
    PublisherNotFound(ChannelId),
}
