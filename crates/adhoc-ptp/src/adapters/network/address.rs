use crate::domain::MacAddr;
use crate::ports::AddressValidator;

// ============================================================================
// NoOpAddressValidator - Accept anything plausible
// ============================================================================

/// Validator that accepts every unicast address.
///
/// Useful for development and single-host testing where any source
/// address should be treated as local. Zero and broadcast are still
/// rejected; neither can identify a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAddressValidator;

impl NoOpAddressValidator {
    /// Create a new permissive validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AddressValidator for NoOpAddressValidator {
    fn is_local_addr(&self, addr: &MacAddr) -> bool {
        !addr.is_zero() && !addr.is_broadcast()
    }
}

// ============================================================================
// LocalMacValidator - Fixed set of local addresses
// ============================================================================

/// Validator backed by the host's known local addresses.
///
/// The embedder enumerates its adapters once and hands the list over;
/// validation is a membership check.
#[derive(Debug, Clone)]
pub struct LocalMacValidator {
    locals: Vec<MacAddr>,
}

impl LocalMacValidator {
    /// Validate against a single local address.
    #[must_use]
    pub fn new(local: MacAddr) -> Self {
        Self {
            locals: vec![local],
        }
    }

    /// Validate against several local addresses (multi-adapter hosts).
    #[must_use]
    pub fn with_addrs(locals: Vec<MacAddr>) -> Self {
        Self { locals }
    }
}

impl AddressValidator for LocalMacValidator {
    fn is_local_addr(&self, addr: &MacAddr) -> bool {
        self.locals.contains(addr)
    }
}
