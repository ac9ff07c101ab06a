//! Teardown (Close).

use tracing::debug;

use crate::domain::{AdhocError, PtpState, SocketHandle};
use crate::service::AdhocPtpService;

impl AdhocPtpService {
    /// Tear down a socket.
    ///
    /// The record is driven through `Closing` (rejecting handles whose
    /// state forbids teardown), its transport descriptor is released, and
    /// it leaves the registry. The handle goes stale; later uses fail
    /// with `NotFound`.
    pub fn close(&mut self, handle: SocketHandle) -> Result<(), AdhocError> {
        self.ensure_initialized()?;

        self.registry
            .get_mut(handle)?
            .transition_to(PtpState::Closing)?;

        let record = self.registry.remove(handle)?;
        self.transport.close(record.transport);
        debug!(
            fd = record.transport.raw(),
            port = record.local_port,
            "ptp socket closed"
        );
        Ok(())
    }
}
