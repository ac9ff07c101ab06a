//! Socket-State Entity
//!
//! One [`PtpSocketState`] record exists per logical PTP socket. Records are
//! owned by the registry; callers only ever hold opaque handles.

use crate::domain::{AdhocError, MacAddr, PtpState, TransportFd};

/// Per-socket state record.
///
/// Field lifetimes follow the record: the transport descriptor is owned
/// exclusively and must be released by whoever removes the record from the
/// registry (the service's Close and shutdown paths).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtpSocketState {
    /// Exclusively owned underlying transport descriptor.
    pub transport: TransportFd,
    /// Local virtual endpoint identity.
    pub local_addr: MacAddr,
    pub local_port: u16,
    /// Peer endpoint; zero/unset until a connection is established.
    pub peer_addr: MacAddr,
    pub peer_port: u16,
    /// Current position in the PTP state machine.
    pub state: PtpState,
    /// Requested receive buffer capacity in bytes (> 0).
    pub buffer_capacity: u32,
    /// Retry pacing hint for data-transfer operations, in microseconds.
    pub retransmit_interval_micros: u32,
    /// Bound on immediate retry attempts for partial writes.
    pub retransmit_count: u32,
    /// Pending-connection queue depth for listeners (> 0); zero on
    /// active-opened records where it has no meaning.
    pub backlog_capacity: u32,
    /// Bytes accepted by Send but not yet pushed into the transport.
    /// Drained by Send/Flush; capped at `buffer_capacity`.
    pub(crate) staged_out: Vec<u8>,
}

impl PtpSocketState {
    /// Build a passive-opened (listening) record.
    pub fn listener(
        transport: TransportFd,
        local_addr: MacAddr,
        local_port: u16,
        buffer_capacity: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
        backlog_capacity: u32,
    ) -> Self {
        Self {
            transport,
            local_addr,
            local_port,
            peer_addr: MacAddr::zero(),
            peer_port: 0,
            state: PtpState::Listening,
            buffer_capacity,
            retransmit_interval_micros,
            retransmit_count,
            backlog_capacity,
            staged_out: Vec::new(),
        }
    }

    /// Build an active-open record bound to a specific peer.
    ///
    /// Starts in `Connecting`; callers flip it to `Established` via
    /// [`PtpSocketState::transition_to`] once the transport reports
    /// completion.
    pub fn connector(
        transport: TransportFd,
        local_addr: MacAddr,
        local_port: u16,
        peer_addr: MacAddr,
        peer_port: u16,
        buffer_capacity: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
    ) -> Self {
        Self {
            transport,
            local_addr,
            local_port,
            peer_addr,
            peer_port,
            state: PtpState::Connecting,
            buffer_capacity,
            retransmit_interval_micros,
            retransmit_count,
            backlog_capacity: 0,
            staged_out: Vec::new(),
        }
    }

    /// Spawn an established record from this listener for a completed
    /// incoming connection. The listener itself is not mutated; the spawned
    /// record inherits its local identity and link parameters.
    pub fn spawn_established(
        &self,
        transport: TransportFd,
        peer_addr: MacAddr,
        peer_port: u16,
    ) -> Self {
        Self {
            transport,
            local_addr: self.local_addr,
            local_port: self.local_port,
            peer_addr,
            peer_port,
            state: PtpState::Established,
            buffer_capacity: self.buffer_capacity,
            retransmit_interval_micros: self.retransmit_interval_micros,
            retransmit_count: self.retransmit_count,
            backlog_capacity: 0,
            staged_out: Vec::new(),
        }
    }

    /// Move the record along the state graph.
    ///
    /// Rejects transitions outside the monotonic graph with
    /// [`AdhocError::InvalidState`] carrying the current state.
    pub fn transition_to(&mut self, next: PtpState) -> Result<(), AdhocError> {
        if !self.state.can_transition_to(next) {
            return Err(AdhocError::InvalidState(self.state));
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fd(raw: i32) -> TransportFd {
        TransportFd::new(raw).unwrap()
    }

    fn local() -> MacAddr {
        MacAddr::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55])
    }

    #[test]
    fn test_listener_starts_listening_with_unset_peer() {
        let rec = PtpSocketState::listener(fd(7), local(), 30000, 4096, 100_000, 5, 5);
        assert_eq!(rec.state, PtpState::Listening);
        assert!(rec.peer_addr.is_zero());
        assert_eq!(rec.peer_port, 0);
        assert_eq!(rec.backlog_capacity, 5);
    }

    #[test]
    fn test_connector_starts_connecting() {
        let peer = MacAddr::new([0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0xee]);
        let rec = PtpSocketState::connector(fd(8), local(), 40000, peer, 30000, 4096, 100_000, 5);
        assert_eq!(rec.state, PtpState::Connecting);
        assert_eq!(rec.peer_addr, peer);
        assert_eq!(rec.peer_port, 30000);
    }

    #[test]
    fn test_spawn_inherits_listener_parameters() {
        let listener = PtpSocketState::listener(fd(7), local(), 30000, 4096, 100_000, 5, 5);
        let peer = MacAddr::new([0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0xee]);
        let spawned = listener.spawn_established(fd(9), peer, 41000);
        assert_eq!(spawned.state, PtpState::Established);
        assert_eq!(spawned.local_port, 30000);
        assert_eq!(spawned.buffer_capacity, 4096);
        assert_eq!(spawned.retransmit_count, 5);
        assert_eq!(spawned.peer_port, 41000);
        // Listener untouched.
        assert_eq!(listener.state, PtpState::Listening);
    }

    #[test]
    fn test_transition_rejects_illegal_edge() {
        let mut rec = PtpSocketState::listener(fd(7), local(), 30000, 4096, 100_000, 5, 5);
        let err = rec.transition_to(PtpState::Established).unwrap_err();
        assert_eq!(err, AdhocError::InvalidState(PtpState::Listening));
        assert_eq!(rec.state, PtpState::Listening);
    }

    #[test]
    fn test_transition_allows_teardown() {
        let mut rec = PtpSocketState::listener(fd(7), local(), 30000, 4096, 100_000, 5, 5);
        rec.transition_to(PtpState::Closing).unwrap();
        assert_eq!(rec.state, PtpState::Closing);
    }
}
