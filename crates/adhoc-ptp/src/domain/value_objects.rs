//! Value Objects for the PTP subsystem

use std::fmt;

/// Hardware (MAC) address identifying an ad-hoc peer.
///
/// The emulated primitive addresses peers by their wireless MAC; the
/// transport adapter is responsible for mapping these onto real endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create an address from raw octets.
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Raw octets.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// All-zero address (unset peer fields use this).
    pub fn zero() -> Self {
        Self([0; 6])
    }

    /// True if every octet is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    /// True for the broadcast address `ff:ff:ff:ff:ff:ff`.
    ///
    /// Broadcast is never a valid endpoint for a point-to-point socket.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Descriptor for an underlying transport socket.
///
/// Issued by the transport port; opaque to the domain beyond the invariant
/// that a registered record always holds a non-negative descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportFd(i32);

impl TransportFd {
    /// Wrap a raw descriptor. Returns `None` for negative values; a record
    /// is never registered with an invalid descriptor.
    pub fn new(raw: i32) -> Option<Self> {
        (raw >= 0).then_some(Self(raw))
    }

    /// Raw descriptor value.
    pub fn raw(&self) -> i32 {
        self.0
    }
}

/// State of a PTP socket record.
///
/// Transitions are monotonic along
/// `Closed -> {Listening | Connecting} -> Established -> Closing -> removed`;
/// removal never skips `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PtpState {
    /// Created but not yet opened in any direction.
    Closed,
    /// Passive-opened, waiting for incoming connections.
    Listening,
    /// Active open in flight, completion not yet observed.
    Connecting,
    /// Connection established; data transfer permitted.
    Established,
    /// Teardown in progress; the record leaves the registry next.
    Closing,
}

impl PtpState {
    /// Whether the transition `self -> next` is on the allowed graph.
    ///
    /// A listening or connecting socket may be torn down directly
    /// (the caller abandons it before a connection completes).
    pub fn can_transition_to(self, next: PtpState) -> bool {
        matches!(
            (self, next),
            (PtpState::Closed, PtpState::Listening)
                | (PtpState::Closed, PtpState::Connecting)
                | (PtpState::Connecting, PtpState::Established)
                | (PtpState::Listening, PtpState::Closing)
                | (PtpState::Connecting, PtpState::Closing)
                | (PtpState::Established, PtpState::Closing)
        )
    }
}

/// Tunables for the PTP subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdhocConfig {
    /// Maximum number of simultaneously registered socket records.
    /// Exhaustion maps to `SocketUnavailable`, as the original's bounded
    /// socket-ID table did.
    pub max_sockets: usize,
    /// Upper bound on random draws during port auto-binding. Capping the
    /// loop turns the original's liveness-only argument into a hard
    /// guarantee; exhaustion surfaces as `PortSpaceExhausted`.
    pub max_port_attempts: u32,
}

impl Default for AdhocConfig {
    fn default() -> Self {
        Self {
            max_sockets: 256,
            // One draw per non-zero port value.
            max_port_attempts: 65535,
        }
    }
}

impl AdhocConfig {
    /// Config suitable for tests (small limits, fast exhaustion).
    pub fn for_testing() -> Self {
        Self {
            max_sockets: 8,
            max_port_attempts: 16,
        }
    }
}
