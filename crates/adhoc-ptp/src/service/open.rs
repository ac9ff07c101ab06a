//! Active open (Connect).

use tracing::{debug, warn};

use crate::domain::{resolve_port, AdhocError, MacAddr, PtpSocketState, PtpState, SocketHandle};
use crate::ports::{ConnectProgress, TransportError};
use crate::service::listen::validate_positive;
use crate::service::AdhocPtpService;

impl AdhocPtpService {
    /// Create a PTP socket connecting to a specific peer.
    ///
    /// Follows the same check order and descriptor-cleanup discipline as
    /// [`AdhocPtpService::listen`]. The record enters `Connecting` when
    /// the transport reports the handshake still in flight; a later data
    /// operation observes completion and upgrades it to `Established`.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        local_addr: &MacAddr,
        local_port: u16,
        peer_addr: &MacAddr,
        peer_port: u16,
        buffer_size: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
        _flags: u32,
    ) -> Result<SocketHandle, AdhocError> {
        self.ensure_initialized()?;

        if !self.address_validator.is_local_addr(local_addr) {
            return Err(AdhocError::InvalidAddress);
        }
        // A point-to-point link needs a concrete peer.
        if peer_addr.is_zero() || peer_addr.is_broadcast() || peer_port == 0 {
            return Err(AdhocError::InvalidAddress);
        }

        let port = resolve_port(
            local_port,
            |p| self.registry.is_port_in_use(p),
            || self.port_source.next_port(),
            self.config.max_port_attempts,
        )?;

        if self.registry.is_port_in_use(port) {
            return Err(AdhocError::PortInUse(port));
        }

        validate_positive(buffer_size, "buffer_size")?;
        validate_positive(retransmit_interval_micros, "retransmit_interval_micros")?;
        validate_positive(retransmit_count, "retransmit_count")?;

        let fd = self
            .transport
            .open()
            .map_err(|_| AdhocError::SocketUnavailable)?;

        if let Err(err) = self.transport.set_reuse(fd) {
            warn!(fd = fd.raw(), %err, "address reuse configuration failed");
        }
        if self.transport.bind(fd, port).is_err() {
            self.transport.close(fd);
            return Err(AdhocError::SocketUnavailable);
        }

        let progress = match self.transport.connect(fd, peer_addr, peer_port) {
            Ok(progress) => progress,
            Err(TransportError::Refused) => {
                self.transport.close(fd);
                return Err(AdhocError::ConnectionReset);
            }
            Err(_) => {
                self.transport.close(fd);
                return Err(AdhocError::SocketUnavailable);
            }
        };

        let mut record = PtpSocketState::connector(
            fd,
            *local_addr,
            port,
            *peer_addr,
            peer_port,
            buffer_size,
            retransmit_interval_micros,
            retransmit_count,
        );
        if progress == ConnectProgress::Established {
            // Transport connected synchronously.
            if let Err(err) = record.transition_to(PtpState::Established) {
                self.transport.close(fd);
                return Err(err);
            }
        }
        let state = record.state;

        match self.registry.append(record) {
            Ok(handle) => {
                debug!(
                    %local_addr,
                    port,
                    %peer_addr,
                    peer_port,
                    ?state,
                    fd = fd.raw(),
                    "ptp socket opened"
                );
                Ok(handle)
            }
            Err(err) => {
                self.transport.close(fd);
                Err(err)
            }
        }
    }
}
