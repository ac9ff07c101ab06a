use crate::domain::{MacAddr, TransportFd};
use crate::ports::{ConnectProgress, StreamTransport, TransportError};

// ============================================================================
// NoOpTransport - Stub for testing without network
// ============================================================================

/// No-operation transport.
///
/// Setup operations succeed and hand out sequential descriptors; nothing
/// is ever ready (`accept`/`recv` report `WouldBlock`) and `send` accepts
/// everything. Use it for exercising socket lifecycle logic without a
/// network.
#[derive(Debug, Default)]
pub struct NoOpTransport {
    next_fd: i32,
}

impl NoOpTransport {
    /// Create a new no-op transport.
    #[must_use]
    pub fn new() -> Self {
        Self { next_fd: 0 }
    }
}

impl StreamTransport for NoOpTransport {
    fn open(&mut self) -> Result<TransportFd, TransportError> {
        let fd = TransportFd::new(self.next_fd).ok_or_else(|| {
            TransportError::Io("descriptor space exhausted".to_string())
        })?;
        self.next_fd += 1;
        Ok(fd)
    }

    fn set_reuse(&mut self, _fd: TransportFd) -> Result<(), TransportError> {
        Ok(())
    }

    fn bind(&mut self, _fd: TransportFd, _port: u16) -> Result<(), TransportError> {
        Ok(())
    }

    fn listen(&mut self, _fd: TransportFd, _backlog: u32) -> Result<(), TransportError> {
        Ok(())
    }

    fn connect(
        &mut self,
        _fd: TransportFd,
        _peer: &MacAddr,
        _port: u16,
    ) -> Result<ConnectProgress, TransportError> {
        Ok(ConnectProgress::Established)
    }

    fn poll_connect(&mut self, _fd: TransportFd) -> Result<ConnectProgress, TransportError> {
        Ok(ConnectProgress::Established)
    }

    fn accept(
        &mut self,
        _fd: TransportFd,
    ) -> Result<(TransportFd, MacAddr, u16), TransportError> {
        Err(TransportError::WouldBlock)
    }

    fn send(&mut self, _fd: TransportFd, data: &[u8]) -> Result<usize, TransportError> {
        Ok(data.len())
    }

    fn recv(&mut self, _fd: TransportFd, _buf: &mut [u8]) -> Result<usize, TransportError> {
        Err(TransportError::WouldBlock)
    }

    fn close(&mut self, _fd: TransportFd) {}
}

// ============================================================================
// TcpStreamTransport - Production TCP transport (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod tcp_transport {
    use super::*;
    use std::collections::HashMap;
    use std::io::{ErrorKind, Read, Write};
    use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
    use std::time::Duration;

    use tracing::debug;

    /// How long a single connect attempt may take before it is reported
    /// as still pending and retried on the next poll.
    const CONNECT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(250);

    #[derive(Debug)]
    enum TcpSlot {
        /// Opened, not yet bound or connected.
        Fresh { port: Option<u16> },
        /// Active open that has not completed yet; retried by `poll_connect`.
        Connecting { addr: SocketAddr },
        Listener(TcpListener),
        Stream(TcpStream),
    }

    /// `StreamTransport` over the host's TCP stack.
    ///
    /// Virtual ports map straight onto real TCP ports on the wildcard
    /// address; peer MACs map onto socket addresses through a peer table
    /// the embedder fills in (the emulated ad-hoc network's member list).
    /// Inbound connections from unknown addresses get a synthesized
    /// locally-administered MAC derived from their IPv4 address.
    ///
    /// The std TCP API neither exposes the listen backlog nor source-port
    /// binding for outgoing connections, so the backlog is a hint consumed
    /// at the registry level only, and an active open's virtual local port
    /// exists only as registry identity.
    #[derive(Debug, Default)]
    pub struct TcpStreamTransport {
        slots: HashMap<i32, TcpSlot>,
        peers: HashMap<MacAddr, SocketAddr>,
        next_fd: i32,
    }

    impl TcpStreamTransport {
        /// Create an empty transport.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a known ad-hoc peer's real endpoint.
        pub fn register_peer(&mut self, mac: MacAddr, addr: SocketAddr) {
            self.peers.insert(mac, addr);
        }

        fn alloc_fd(&mut self, slot: TcpSlot) -> Result<TransportFd, TransportError> {
            let fd = TransportFd::new(self.next_fd)
                .ok_or_else(|| TransportError::Io("descriptor space exhausted".to_string()))?;
            self.next_fd += 1;
            self.slots.insert(fd.raw(), slot);
            Ok(fd)
        }

        fn slot_mut(&mut self, fd: TransportFd) -> Result<&mut TcpSlot, TransportError> {
            self.slots
                .get_mut(&fd.raw())
                .ok_or_else(|| TransportError::Io(format!("unknown descriptor {}", fd.raw())))
        }

        /// Peer MAC for an inbound connection: reverse peer-table lookup,
        /// else a synthesized locally-administered MAC from the IPv4 octets.
        fn mac_for(&self, addr: &SocketAddr) -> MacAddr {
            for (mac, known) in &self.peers {
                if known.ip() == addr.ip() {
                    return *mac;
                }
            }
            match addr.ip() {
                std::net::IpAddr::V4(v4) => {
                    let o = v4.octets();
                    MacAddr::new([0x02, 0x00, o[0], o[1], o[2], o[3]])
                }
                std::net::IpAddr::V6(_) => MacAddr::new([0x02, 0x00, 0, 0, 0, 0]),
            }
        }

        fn map_io(err: &std::io::Error) -> TransportError {
            match err.kind() {
                ErrorKind::WouldBlock => TransportError::WouldBlock,
                ErrorKind::ConnectionRefused => TransportError::Refused,
                ErrorKind::AddrInUse => TransportError::AddrInUse,
                ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe => TransportError::Reset,
                _ => TransportError::Io(err.to_string()),
            }
        }

        fn try_connect(addr: SocketAddr) -> Result<Option<TcpStream>, TransportError> {
            match TcpStream::connect_timeout(&addr, CONNECT_ATTEMPT_TIMEOUT) {
                Ok(stream) => {
                    stream
                        .set_nonblocking(true)
                        .map_err(|e| Self::map_io(&e))?;
                    Ok(Some(stream))
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => Ok(None),
                Err(e) => Err(Self::map_io(&e)),
            }
        }
    }

    impl StreamTransport for TcpStreamTransport {
        fn open(&mut self) -> Result<TransportFd, TransportError> {
            self.alloc_fd(TcpSlot::Fresh { port: None })
        }

        fn set_reuse(&mut self, fd: TransportFd) -> Result<(), TransportError> {
            // std's listener enables address reuse where the platform
            // defaults allow; nothing further to configure here.
            self.slot_mut(fd).map(|_| ())
        }

        fn bind(&mut self, fd: TransportFd, port: u16) -> Result<(), TransportError> {
            match self.slot_mut(fd)? {
                TcpSlot::Fresh { port: slot_port } => {
                    *slot_port = Some(port);
                    Ok(())
                }
                _ => Err(TransportError::Io("descriptor already bound".to_string())),
            }
        }

        fn listen(&mut self, fd: TransportFd, _backlog: u32) -> Result<(), TransportError> {
            let port = match self.slot_mut(fd)? {
                TcpSlot::Fresh { port: Some(port) } => *port,
                TcpSlot::Fresh { port: None } => {
                    return Err(TransportError::Io("listen on unbound descriptor".to_string()))
                }
                _ => return Err(TransportError::Io("descriptor already active".to_string())),
            };
            let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
                .map_err(|e| Self::map_io(&e))?;
            listener
                .set_nonblocking(true)
                .map_err(|e| Self::map_io(&e))?;
            debug!(fd = fd.raw(), port, "tcp listener bound");
            self.slots.insert(fd.raw(), TcpSlot::Listener(listener));
            Ok(())
        }

        fn connect(
            &mut self,
            fd: TransportFd,
            peer: &MacAddr,
            port: u16,
        ) -> Result<ConnectProgress, TransportError> {
            let mut addr = *self
                .peers
                .get(peer)
                .ok_or_else(|| TransportError::Io(format!("unknown peer {peer}")))?;
            addr.set_port(port);
            match Self::try_connect(addr)? {
                Some(stream) => {
                    self.slots.insert(fd.raw(), TcpSlot::Stream(stream));
                    Ok(ConnectProgress::Established)
                }
                None => {
                    self.slots.insert(fd.raw(), TcpSlot::Connecting { addr });
                    Ok(ConnectProgress::Pending)
                }
            }
        }

        fn poll_connect(&mut self, fd: TransportFd) -> Result<ConnectProgress, TransportError> {
            let addr = match self.slot_mut(fd)? {
                TcpSlot::Stream(_) => return Ok(ConnectProgress::Established),
                TcpSlot::Connecting { addr } => *addr,
                _ => return Err(TransportError::Io("descriptor not connecting".to_string())),
            };
            match Self::try_connect(addr)? {
                Some(stream) => {
                    self.slots.insert(fd.raw(), TcpSlot::Stream(stream));
                    Ok(ConnectProgress::Established)
                }
                None => Ok(ConnectProgress::Pending),
            }
        }

        fn accept(
            &mut self,
            fd: TransportFd,
        ) -> Result<(TransportFd, MacAddr, u16), TransportError> {
            let accepted = match self.slot_mut(fd)? {
                TcpSlot::Listener(listener) => match listener.accept() {
                    Ok((stream, peer_addr)) => {
                        stream
                            .set_nonblocking(true)
                            .map_err(|e| Self::map_io(&e))?;
                        (stream, peer_addr)
                    }
                    Err(e) => return Err(Self::map_io(&e)),
                },
                _ => return Err(TransportError::Io("descriptor not listening".to_string())),
            };
            let (stream, peer_addr) = accepted;
            let mac = self.mac_for(&peer_addr);
            let port = peer_addr.port();
            let conn_fd = self.alloc_fd(TcpSlot::Stream(stream))?;
            debug!(fd = conn_fd.raw(), %mac, port, "tcp connection accepted");
            Ok((conn_fd, mac, port))
        }

        fn send(&mut self, fd: TransportFd, data: &[u8]) -> Result<usize, TransportError> {
            match self.slot_mut(fd)? {
                TcpSlot::Stream(stream) => stream.write(data).map_err(|e| Self::map_io(&e)),
                _ => Err(TransportError::Io("descriptor not connected".to_string())),
            }
        }

        fn recv(&mut self, fd: TransportFd, buf: &mut [u8]) -> Result<usize, TransportError> {
            match self.slot_mut(fd)? {
                TcpSlot::Stream(stream) => stream.read(buf).map_err(|e| Self::map_io(&e)),
                _ => Err(TransportError::Io("descriptor not connected".to_string())),
            }
        }

        fn close(&mut self, fd: TransportFd) {
            // Dropping the slot closes the socket.
            self.slots.remove(&fd.raw());
        }
    }
}

#[cfg(feature = "network")]
pub use tcp_transport::TcpStreamTransport;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_hands_out_distinct_descriptors() {
        let mut t = NoOpTransport::new();
        let a = t.open().unwrap();
        let b = t.open().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_noop_accept_would_block() {
        let mut t = NoOpTransport::new();
        let fd = t.open().unwrap();
        assert_eq!(t.accept(fd).unwrap_err(), TransportError::WouldBlock);
    }
}
