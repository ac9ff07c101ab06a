use crate::domain::{AdhocError, MacAddr, SocketHandle};
use crate::ports::AdhocPtpApi;
use crate::service::AdhocPtpService;

impl AdhocPtpApi for AdhocPtpService {
    fn listen(
        &mut self,
        local_addr: &MacAddr,
        local_port: u16,
        buffer_size: u32,
        retransmit_interval_micros: u32,
        retransmit_count: u32,
        backlog: u32,
        flags: u32,
    ) -> Result<SocketHandle, AdhocError> {
        AdhocPtpService::listen(
            self,
            local_addr,
            local_port,
            buffer_size,
            retransmit_interval_micros,
            retransmit_count,
            backlog,
            flags,
        )
    }

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
    ) -> Result<SocketHandle, AdhocError> {
        AdhocPtpService::open(
            self,
            local_addr,
            local_port,
            peer_addr,
            peer_port,
            buffer_size,
            retransmit_interval_micros,
            retransmit_count,
            flags,
        )
    }

    fn accept(&mut self, handle: SocketHandle) -> Result<SocketHandle, AdhocError> {
        AdhocPtpService::accept(self, handle)
    }

    fn send(&mut self, handle: SocketHandle, data: &[u8]) -> Result<usize, AdhocError> {
        AdhocPtpService::send(self, handle, data)
    }

    fn recv(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Result<usize, AdhocError> {
        AdhocPtpService::recv(self, handle, buf)
    }

    fn flush(&mut self, handle: SocketHandle) -> Result<(), AdhocError> {
        AdhocPtpService::flush(self, handle)
    }

    fn close(&mut self, handle: SocketHandle) -> Result<(), AdhocError> {
        AdhocPtpService::close(self, handle)
    }
}
