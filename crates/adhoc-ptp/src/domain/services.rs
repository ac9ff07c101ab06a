//! Domain Services
//!
//! Pure functions shared by the PTP operations.

use crate::domain::AdhocError;

/// Resolve the local virtual port for a new socket.
///
/// An explicit non-zero request is returned unchanged; rejecting an
/// in-use explicit port is the caller's concern so that the failure maps
/// to `PortInUse` rather than an allocator error.
///
/// A zero request draws candidates from `next_candidate` until one not
/// currently in use is found. The original looped without bound, relying
/// on the port space being mostly free; here the loop is capped at
/// `max_attempts` draws and surfaces `PortSpaceExhausted`, so pathological
/// occupancy cannot hang the caller.
pub fn resolve_port(
    requested: u16,
    in_use: impl Fn(u16) -> bool,
    mut next_candidate: impl FnMut() -> u16,
    max_attempts: u32,
) -> Result<u16, AdhocError> {
    if requested != 0 {
        return Ok(requested);
    }
    for _ in 0..max_attempts {
        let candidate = next_candidate();
        if candidate != 0 && !in_use(candidate) {
            return Ok(candidate);
        }
    }
    Err(AdhocError::PortSpaceExhausted)
}
