use thiserror::Error;

use crate::peer::PeerKey;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),
    #[error("peer {0} has never been recorded")]
    UnknownPeer(PeerKey),
    /// The peer is known but none of its samples are inside the retention window,
    /// so its average latency is undefined.
    #[error("peer {0} has no samples inside the retention window")]
    EmptySeries(PeerKey),
}

impl Error {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
