//! Passive open (Listen).

use tracing::{debug, warn};

use crate::domain::{resolve_port, AdhocError, MacAddr, PtpSocketState, SocketHandle, TransportFd};
use crate::service::AdhocPtpService;

impl AdhocPtpService {
    /// Create a listening PTP socket.
    ///
    /// Precondition checks run in a fixed order and the first failure
    /// wins: initialization, source address, port resolution, port
    /// availability, argument positivity, then transport setup. Any
    /// transport descriptor opened by a failing attempt is closed before
    /// the error returns; no descriptor leaks on any branch.
    #[allow(clippy::too_many_arguments)]
    pub fn listen(
        &mut self,
        local_addr: &MacAddr,
        local_port: u16,
        buffer_size: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
        backlog: u32,
        _flags: u32,
    ) -> Result<SocketHandle, AdhocError> {
        self.ensure_initialized()?;

        if !self.address_validator.is_local_addr(local_addr) {
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
        validate_positive(backlog, "backlog")?;

        let fd = self
            .transport
            .open()
            .map_err(|_| AdhocError::SocketUnavailable)?;

        if let Err(err) = self.bind_listening(fd, port, backlog) {
            self.transport.close(fd);
            return Err(err);
        }

        let record = PtpSocketState::listener(
            fd,
            *local_addr,
            port,
            buffer_size,
            retransmit_interval_micros,
            retransmit_count,
            backlog,
        );
        match self.registry.append(record) {
            Ok(handle) => {
                debug!(%local_addr, port, backlog, fd = fd.raw(), "ptp socket listening");
                Ok(handle)
            }
            Err(err) => {
                self.transport.close(fd);
                Err(err)
            }
        }
    }

    /// Reuse-configure, bind, and switch the socket into listening mode.
    /// The caller owns `fd` and closes it when this fails.
    fn bind_listening(
        &mut self,
        fd: TransportFd,
        port: u16,
        backlog: u32,
    ) -> Result<(), AdhocError> {
        if let Err(err) = self.transport.set_reuse(fd) {
            // Best effort only.
            warn!(fd = fd.raw(), %err, "address reuse configuration failed");
        }
        self.transport
            .bind(fd, port)
            .map_err(|_| AdhocError::SocketUnavailable)?;
        self.transport
            .listen(fd, backlog)
            .map_err(|_| AdhocError::SocketUnavailable)?;
        Ok(())
    }
}

pub(crate) fn validate_positive(value: u32, name: &'static str) -> Result<(), AdhocError> {
    if value == 0 {
        return Err(AdhocError::InvalidArgument(name));
    }
    Ok(())
}
