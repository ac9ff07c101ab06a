//! Domain Errors for the PTP subsystem
//!
//! Every operation on the caller-facing surface reports failure through
//! [`AdhocError`]. The emulated console ABI expects a stable negative
//! integer per failure kind, exposed via [`AdhocError::code`]; success
//! returns are always non-negative handles.

use thiserror::Error;

use crate::domain::PtpState;

/// Errors produced by PTP socket operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdhocError {
    /// The subsystem has not been initialized (or was shut down).
    #[error("adhoc subsystem not initialized")]
    NotInitialized,

    /// Address missing, malformed, or does not identify the local host.
    #[error("address missing or not local")]
    InvalidAddress,

    /// A numeric parameter violated its positivity constraint.
    #[error("invalid argument: {0} must be strictly positive")]
    InvalidArgument(&'static str),

    /// The resolved virtual port is already bound by another socket.
    #[error("virtual port {0} already in use")]
    PortInUse(u16),

    /// The underlying transport could not be created, bound, or placed
    /// into the requested mode, or the registry is at capacity.
    #[error("underlying transport socket unavailable")]
    SocketUnavailable,

    /// Auto-binding drew the entire port space without finding a free port.
    #[error("virtual port space exhausted")]
    PortSpaceExhausted,

    /// Unknown or stale socket handle.
    #[error("unknown or stale socket handle")]
    NotFound,

    /// The record's current state does not permit the operation
    /// (e.g. Send on a listening socket).
    #[error("operation not permitted in state {0:?}")]
    InvalidState(PtpState),

    /// The transport cannot make progress right now; poll again later.
    #[error("operation would block")]
    WouldBlock,

    /// The peer closed or reset the connection.
    #[error("connection reset by peer")]
    ConnectionReset,
}

impl AdhocError {
    /// Stable negative error code for the emulated caller-facing ABI.
    ///
    /// Values are fixed for the lifetime of the crate; client code written
    /// against the original primitive switches on these.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotInitialized => -1,
            Self::InvalidAddress => -2,
            Self::InvalidArgument(_) => -3,
            Self::PortInUse(_) => -4,
            Self::SocketUnavailable => -5,
            Self::PortSpaceExhausted => -6,
            Self::NotFound => -7,
            Self::InvalidState(_) => -8,
            Self::WouldBlock => -9,
            Self::ConnectionReset => -10,
        }
    }
}
