//! Accept: spawning established sockets from a listener.

use tracing::debug;

use crate::domain::{AdhocError, PtpState, SocketHandle};
use crate::ports::TransportError;
use crate::service::AdhocPtpService;

impl AdhocPtpService {
    /// Poll a listening socket for a completed incoming connection.
    ///
    /// `WouldBlock` when the pending-connection queue is empty; the caller
    /// re-invokes from its update loop. On success a new `Established`
    /// record is appended (peer endpoint from the transport, link
    /// parameters inherited from the listener) and the listener itself is
    /// left untouched.
    pub fn accept(&mut self, handle: SocketHandle) -> Result<SocketHandle, AdhocError> {
        self.ensure_initialized()?;

        let listener_fd = {
            let record = self.registry.get(handle)?;
            if record.state != PtpState::Listening {
                return Err(AdhocError::InvalidState(record.state));
            }
            record.transport
        };

        let (conn_fd, peer_addr, peer_port) = match self.transport.accept(listener_fd) {
            Ok(accepted) => accepted,
            Err(TransportError::WouldBlock) => return Err(AdhocError::WouldBlock),
            Err(TransportError::Reset) => return Err(AdhocError::ConnectionReset),
            Err(_) => return Err(AdhocError::SocketUnavailable),
        };

        // The listener cannot have vanished: `&mut self` has been held
        // since the lookup above.
        let spawned = self
            .registry
            .get(handle)?
            .spawn_established(conn_fd, peer_addr, peer_port);

        match self.registry.append(spawned) {
            Ok(conn_handle) => {
                debug!(
                    listener_fd = listener_fd.raw(),
                    conn_fd = conn_fd.raw(),
                    %peer_addr,
                    peer_port,
                    "ptp connection accepted"
                );
                Ok(conn_handle)
            }
            Err(err) => {
                self.transport.close(conn_fd);
                Err(err)
            }
        }
    }
}
