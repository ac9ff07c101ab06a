//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the PTP subsystem **requires** from its host: hardware
//! address validation, the random port source, the underlying stream
//! transport, and configuration loading. The service treats all of them
//! as fallible external collaborators and maps their failures onto the
//! caller-facing error taxonomy.

use crate::domain::{AdhocConfig, MacAddr, TransportFd};
use thiserror::Error;

/// Confirms whether a hardware address identifies the local host.
///
/// The emulated primitive rejects Listen/Open calls whose source address
/// is not one of ours; what "ours" means (single NIC, virtual adapter,
/// test fixture) is the adapter's business.
pub trait AddressValidator: Send + Sync {
    /// True if `addr` identifies the local host.
    fn is_local_addr(&self, addr: &MacAddr) -> bool;
}

/// Supplies candidate virtual ports for auto-binding.
///
/// Expected to draw uniformly over `1..=65535`; a returned zero is
/// tolerated and skipped by the resolver.
pub trait PortSource: Send + Sync {
    /// Next candidate port.
    fn next_port(&self) -> u16;
}

/// Errors from the stream transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The operation cannot make progress right now; poll again.
    #[error("transport would block")]
    WouldBlock,
    /// The peer refused the connection.
    #[error("connection refused")]
    Refused,
    /// The requested local port is taken at the transport level.
    #[error("address already in use")]
    AddrInUse,
    /// The peer closed or reset the connection.
    #[error("connection reset")]
    Reset,
    /// Anything else the transport reports.
    #[error("transport i/o error: {0}")]
    Io(String),
}

/// Outcome of initiating or polling a non-blocking connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectProgress {
    /// Handshake complete; the link is usable.
    Established,
    /// Still in flight; poll again.
    Pending,
}

/// Abstract connection-oriented transport underneath the PTP emulation.
///
/// Descriptors issued by [`StreamTransport::open`] are owned by exactly one
/// socket record (or by an in-flight operation that must close them on any
/// failure path). Every call is non-blocking: readiness-dependent
/// operations report [`TransportError::WouldBlock`] instead of suspending.
pub trait StreamTransport: Send {
    /// Create a fresh, unbound stream socket.
    fn open(&mut self) -> Result<TransportFd, TransportError>;

    /// Enable address/port reuse on the socket. Best effort; the service
    /// logs and continues when this fails.
    fn set_reuse(&mut self, fd: TransportFd) -> Result<(), TransportError>;

    /// Bind the socket to `port` on the wildcard local address.
    fn bind(&mut self, fd: TransportFd, port: u16) -> Result<(), TransportError>;

    /// Put a bound socket into listening mode with the given backlog.
    fn listen(&mut self, fd: TransportFd, backlog: u32) -> Result<(), TransportError>;

    /// Begin a non-blocking connect towards `peer`:`port`.
    fn connect(
        &mut self,
        fd: TransportFd,
        peer: &MacAddr,
        port: u16,
    ) -> Result<ConnectProgress, TransportError>;

    /// Poll an in-flight connect for completion.
    fn poll_connect(&mut self, fd: TransportFd) -> Result<ConnectProgress, TransportError>;

    /// Poll a listening socket for a completed incoming connection.
    ///
    /// Returns the new connection's descriptor and the peer's endpoint,
    /// or `WouldBlock` when the queue is empty.
    fn accept(&mut self, fd: TransportFd)
        -> Result<(TransportFd, MacAddr, u16), TransportError>;

    /// Write as much of `data` as the transport will take; returns the
    /// number of bytes accepted.
    fn send(&mut self, fd: TransportFd, data: &[u8]) -> Result<usize, TransportError>;

    /// Read available bytes into `buf`; `Ok(0)` signals orderly peer
    /// shutdown on a non-empty buffer.
    fn recv(&mut self, fd: TransportFd, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Release a descriptor. Infallible by contract; adapters swallow
    /// close-time errors.
    fn close(&mut self, fd: TransportFd);
}

/// Abstract interface for configuration loading.
pub trait ConfigProvider: Send + Sync {
    /// Subsystem tunables.
    fn adhoc_config(&self) -> AdhocConfig;
}
