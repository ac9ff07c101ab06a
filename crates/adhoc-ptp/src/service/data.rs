//! Data transfer: Send, Recv, Flush.
//!
//! All three are non-suspending. Partial writes are retried at most
//! `retransmit_count` times back to back (the single-threaded model
//! forbids sleeping between attempts; `retransmit_interval_micros` is the
//! caller's pacing hint for re-polling). Whatever the transport will not
//! take is staged on the record, bounded by its buffer capacity, and
//! pushed by later Send/Flush calls.

use tracing::{debug, trace};

use crate::domain::{AdhocError, PtpState, SocketHandle, TransportFd};
use crate::ports::{ConnectProgress, TransportError};
use crate::service::AdhocPtpService;

impl AdhocPtpService {
    /// Write `data` on an established socket.
    ///
    /// Returns the number of bytes accepted: written to the transport or
    /// staged behind previously staged output. Zero acceptance on a
    /// saturated link reports `WouldBlock`.
    pub fn send(&mut self, handle: SocketHandle, data: &[u8]) -> Result<usize, AdhocError> {
        self.ensure_initialized()?;
        let (fd, retries) = self.established_fd(handle)?;
        if data.is_empty() {
            return Ok(0);
        }

        self.drain_staged(handle, fd, retries)?;

        // While output is still staged the transport is saturated; new
        // bytes queue behind it so the stream never reorders.
        let backlog_clear = self.registry.get(handle)?.staged_out.is_empty();
        let mut written = 0usize;
        if backlog_clear {
            for _ in 0..=retries {
                match self.transport.send(fd, &data[written..]) {
                    Ok(n) => {
                        written += n;
                        if written == data.len() {
                            break;
                        }
                    }
                    Err(TransportError::WouldBlock) => break,
                    Err(TransportError::Reset) => return Err(AdhocError::ConnectionReset),
                    Err(_) => return Err(AdhocError::SocketUnavailable),
                }
            }
        }

        let record = self.registry.get_mut(handle)?;
        let room = (record.buffer_capacity as usize).saturating_sub(record.staged_out.len());
        let staged = (data.len() - written).min(room);
        record
            .staged_out
            .extend_from_slice(&data[written..written + staged]);

        let accepted = written + staged;
        if accepted == 0 {
            return Err(AdhocError::WouldBlock);
        }
        trace!(fd = fd.raw(), written, staged, "ptp send");
        Ok(accepted)
    }

    /// Read available data from an established socket.
    ///
    /// `Ok(0)` from the transport on a non-empty buffer means the peer
    /// shut the connection down; that surfaces as `ConnectionReset` and
    /// the record stays registered for the caller to close.
    pub fn recv(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Result<usize, AdhocError> {
        self.ensure_initialized()?;
        let (fd, _) = self.established_fd(handle)?;
        if buf.is_empty() {
            return Ok(0);
        }
        match self.transport.recv(fd, buf) {
            Ok(0) => Err(AdhocError::ConnectionReset),
            Ok(n) => {
                trace!(fd = fd.raw(), bytes = n, "ptp recv");
                Ok(n)
            }
            Err(TransportError::WouldBlock) => Err(AdhocError::WouldBlock),
            Err(TransportError::Reset) => Err(AdhocError::ConnectionReset),
            Err(_) => Err(AdhocError::SocketUnavailable),
        }
    }

    /// Push staged output into the transport.
    ///
    /// No-op when nothing is staged; `WouldBlock` when the bounded retry
    /// budget ran out with bytes still staged.
    pub fn flush(&mut self, handle: SocketHandle) -> Result<(), AdhocError> {
        self.ensure_initialized()?;
        let (fd, retries) = self.established_fd(handle)?;
        self.drain_staged(handle, fd, retries)?;
        if self.registry.get(handle)?.staged_out.is_empty() {
            Ok(())
        } else {
            Err(AdhocError::WouldBlock)
        }
    }

    /// Resolve `handle` to an established socket's descriptor and retry
    /// budget. A `Connecting` record gets its handshake polled here and is
    /// upgraded on completion, keeping the active-open path free of any
    /// blocking wait.
    fn established_fd(
        &mut self,
        handle: SocketHandle,
    ) -> Result<(TransportFd, u32), AdhocError> {
        let (fd, state) = {
            let record = self.registry.get(handle)?;
            (record.transport, record.state)
        };
        match state {
            PtpState::Established => {}
            PtpState::Connecting => match self.transport.poll_connect(fd) {
                Ok(ConnectProgress::Established) => {
                    self.registry
                        .get_mut(handle)?
                        .transition_to(PtpState::Established)?;
                    debug!(fd = fd.raw(), "ptp connect completed");
                }
                Ok(ConnectProgress::Pending) => return Err(AdhocError::WouldBlock),
                Err(TransportError::Refused | TransportError::Reset) => {
                    return Err(AdhocError::ConnectionReset)
                }
                Err(_) => return Err(AdhocError::SocketUnavailable),
            },
            other => return Err(AdhocError::InvalidState(other)),
        }
        let record = self.registry.get(handle)?;
        Ok((record.transport, record.retransmit_count))
    }

    /// Write previously staged bytes, leaving whatever the retry budget
    /// could not place still staged.
    fn drain_staged(
        &mut self,
        handle: SocketHandle,
        fd: TransportFd,
        retries: u32,
    ) -> Result<(), AdhocError> {
        let mut staged = std::mem::take(&mut self.registry.get_mut(handle)?.staged_out);
        if staged.is_empty() {
            return Ok(());
        }
        let mut offset = 0usize;
        let mut result = Ok(());
        for _ in 0..=retries {
            match self.transport.send(fd, &staged[offset..]) {
                Ok(n) => {
                    offset += n;
                    if offset == staged.len() {
                        break;
                    }
                }
                Err(TransportError::WouldBlock) => break,
                Err(TransportError::Reset) => {
                    result = Err(AdhocError::ConnectionReset);
                    break;
                }
                Err(_) => {
                    result = Err(AdhocError::SocketUnavailable);
                    break;
                }
            }
        }
        staged.drain(..offset);
        self.registry.get_mut(handle)?.staged_out = staged;
        result
    }
}
