//! # Driving Port (Inbound API)
//!
//! The caller-facing PTP primitive surface. Mirrors the original
//! connection-oriented socket API: one handle space, one error
//! vocabulary, synchronous non-suspending calls.

use crate::domain::{AdhocError, MacAddr, SocketHandle};

/// Primary API of the PTP subsystem.
///
/// All operations are synchronous; readiness-dependent ones (`accept`,
/// `send`, `recv`, `flush`) return [`AdhocError::WouldBlock`] rather than
/// suspending, and callers re-invoke them from their update loop.
pub trait AdhocPtpApi {
    /// Passive open: create a listening PTP socket.
    ///
    /// `local_port == 0` requests auto-binding from the port source. All
    /// of `buffer_size`, `retransmit_interval_micros`, `retransmit_count`,
    /// and `backlog` must be strictly positive. `flags` is accepted for
    /// ABI compatibility and currently ignored.
    #[allow(clippy::too_many_arguments)]
    fn listen(
        &mut self,
        local_addr: &MacAddr,
        local_port: u16,
        buffer_size: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
        backlog: u32,
        flags: u32,
    ) -> Result<SocketHandle, AdhocError>;

    /// Active open: create a PTP socket connecting to `peer_addr`:`peer_port`.
    ///
    /// The returned record is `Connecting` until the transport reports
    /// completion (observed by a later data operation), or `Established`
    /// immediately when the transport connects synchronously.
    #[allow(clippy::too_many_arguments)]
    fn open(
        &mut self,
        local_addr: &MacAddr,
        local_port: u16,
        peer_addr: &MacAddr,
        peer_port: u16,
        buffer_size: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
        flags: u32,
    ) -> Result<SocketHandle, AdhocError>;

    /// Poll a listening socket for a completed incoming connection.
    ///
    /// On success spawns a new `Established` record and returns its handle;
    /// the listener is not mutated.
    fn accept(&mut self, handle: SocketHandle) -> Result<SocketHandle, AdhocError>;

    /// Write data on an established socket; returns bytes accepted
    /// (written or staged for a later flush).
    fn send(&mut self, handle: SocketHandle, data: &[u8]) -> Result<usize, AdhocError>;

    /// Read available data from an established socket.
    fn recv(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Result<usize, AdhocError>;

    /// Push staged output into the transport.
    fn flush(&mut self, handle: SocketHandle) -> Result<(), AdhocError>;

    /// Tear down a socket: drive it through `Closing`, release its
    /// transport descriptor, and remove it from the registry. The handle
    /// is dead afterwards.
    fn close(&mut self, handle: SocketHandle) -> Result<(), AdhocError>;
}
