//! Policy error types.

use thiserror::Error;

use crate::Capability;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A principal attempted an operation without the required capability.
    #[error("permission denied: {principal} lacks {capability}")]
    Denied {
        principal: String,
        capability: Capability,
    },

    /// A capability string did not match any known capability.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),
}

pub type Result<T> = std::result::Result<T, Error>;
