//! Test Utilities
//!
//! Deterministic port implementations for exercising the service without a
//! network: a scripted transport with descriptor accounting and a fixed
//! port source. Available with feature `test-utils` (and to this crate's
//! own tests).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{MacAddr, TransportFd};
use crate::ports::{ConnectProgress, PortSource, StreamTransport, TransportError};

// ============================================================================
// FixedPortSource
// ============================================================================

/// Port source replaying a scripted sequence, repeating the last entry
/// once the script runs out.
#[derive(Debug)]
pub struct FixedPortSource {
    ports: Vec<u16>,
    cursor: AtomicUsize,
}

impl FixedPortSource {
    /// Script the given draws. An empty script yields zero forever, which
    /// the resolver skips; combine with a small attempt cap to force
    /// `PortSpaceExhausted`.
    pub fn new(ports: Vec<u16>) -> Self {
        Self {
            ports,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl PortSource for FixedPortSource {
    fn next_port(&self) -> u16 {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        match self.ports.get(i) {
            Some(port) => *port,
            None => self.ports.last().copied().unwrap_or(0),
        }
    }
}

// ============================================================================
// ScriptedTransport
// ============================================================================

#[derive(Debug, Default)]
struct Inner {
    next_fd: i32,
    open_fds: HashSet<i32>,
    opened_total: usize,
    closed_total: usize,
    double_closes: usize,

    fail_open: bool,
    fail_reuse: bool,
    fail_listen: bool,
    fail_bind_ports: HashSet<u16>,

    bound: HashMap<i32, u16>,
    listening: HashSet<i32>,

    connect_script: VecDeque<Result<ConnectProgress, TransportError>>,
    poll_connect_script: VecDeque<Result<ConnectProgress, TransportError>>,
    accept_script: VecDeque<Result<(MacAddr, u16), TransportError>>,
    send_script: VecDeque<Result<usize, TransportError>>,
    recv_script: VecDeque<Result<Vec<u8>, TransportError>>,

    sent: HashMap<i32, Vec<u8>>,
}

impl Inner {
    fn alloc(&mut self) -> Result<TransportFd, TransportError> {
        let fd = TransportFd::new(self.next_fd)
            .ok_or_else(|| TransportError::Io("descriptor space exhausted".to_string()))?;
        self.next_fd += 1;
        self.open_fds.insert(fd.raw());
        self.opened_total += 1;
        Ok(fd)
    }

    fn check_open(&self, fd: TransportFd) -> Result<(), TransportError> {
        if self.open_fds.contains(&fd.raw()) {
            Ok(())
        } else {
            Err(TransportError::Io(format!(
                "unknown descriptor {}",
                fd.raw()
            )))
        }
    }
}

/// Scriptable `StreamTransport` with descriptor accounting.
///
/// Setup operations succeed unless a failure is injected; readiness
/// operations consume per-operation scripts and default to `WouldBlock`
/// (accept/recv) or full acceptance (send/connect). Every descriptor
/// handed out is tracked so tests can assert that no failure path leaks.
///
/// State is shared across clones: keep one clone for scripting and
/// inspection, move the other into the service.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransport {
    /// Transport where every setup operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("scripted transport poisoned")
    }

    /// Make `open` fail.
    pub fn fail_open(&self) {
        self.lock().fail_open = true;
    }

    /// Make `set_reuse` fail (the service must treat this as non-fatal).
    pub fn fail_reuse(&self) {
        self.lock().fail_reuse = true;
    }

    /// Make `listen` fail.
    pub fn fail_listen(&self) {
        self.lock().fail_listen = true;
    }

    /// Make `bind` of the given port fail with `AddrInUse`.
    pub fn fail_bind_port(&self, port: u16) {
        self.lock().fail_bind_ports.insert(port);
    }

    /// Queue an outcome for the next `connect` call.
    pub fn push_connect(&self, outcome: Result<ConnectProgress, TransportError>) {
        self.lock().connect_script.push_back(outcome);
    }

    /// Queue an outcome for the next `poll_connect` call.
    pub fn push_poll_connect(&self, outcome: Result<ConnectProgress, TransportError>) {
        self.lock().poll_connect_script.push_back(outcome);
    }

    /// Queue an outcome for the next `accept` call; `Ok` spawns a fresh
    /// descriptor for the connection.
    pub fn push_accept(&self, outcome: Result<(MacAddr, u16), TransportError>) {
        self.lock().accept_script.push_back(outcome);
    }

    /// Queue an outcome for the next `send` call. `Ok(n)` caps the bytes
    /// accepted by that call (simulating a partial write).
    pub fn push_send(&self, outcome: Result<usize, TransportError>) {
        self.lock().send_script.push_back(outcome);
    }

    /// Queue an outcome for the next `recv` call.
    pub fn push_recv(&self, outcome: Result<Vec<u8>, TransportError>) {
        self.lock().recv_script.push_back(outcome);
    }

    /// Descriptors currently open.
    pub fn open_count(&self) -> usize {
        self.lock().open_fds.len()
    }

    /// Total descriptors ever opened (including accept-spawned ones).
    pub fn opened_total(&self) -> usize {
        self.lock().opened_total
    }

    /// Total descriptors closed.
    pub fn closed_total(&self) -> usize {
        self.lock().closed_total
    }

    /// Closes of descriptors that were not open; always a bug.
    pub fn double_closes(&self) -> usize {
        self.lock().double_closes
    }

    /// Whether a given raw descriptor is still open.
    pub fn is_open(&self, raw_fd: i32) -> bool {
        self.lock().open_fds.contains(&raw_fd)
    }

    /// Bytes the transport accepted on a descriptor.
    pub fn sent_bytes(&self, raw_fd: i32) -> Vec<u8> {
        self.lock().sent.get(&raw_fd).cloned().unwrap_or_default()
    }
}

impl StreamTransport for ScriptedTransport {
    fn open(&mut self) -> Result<TransportFd, TransportError> {
        let mut inner = self.lock();
        if inner.fail_open {
            return Err(TransportError::Io("open scripted to fail".to_string()));
        }
        inner.alloc()
    }

    fn set_reuse(&mut self, fd: TransportFd) -> Result<(), TransportError> {
        let inner = self.lock();
        inner.check_open(fd)?;
        if inner.fail_reuse {
            return Err(TransportError::Io("reuse scripted to fail".to_string()));
        }
        Ok(())
    }

    fn bind(&mut self, fd: TransportFd, port: u16) -> Result<(), TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        if inner.fail_bind_ports.contains(&port) {
            return Err(TransportError::AddrInUse);
        }
        inner.bound.insert(fd.raw(), port);
        Ok(())
    }

    fn listen(&mut self, fd: TransportFd, _backlog: u32) -> Result<(), TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        if inner.fail_listen {
            return Err(TransportError::Io("listen scripted to fail".to_string()));
        }
        if !inner.bound.contains_key(&fd.raw()) {
            return Err(TransportError::Io(
                "listen on unbound descriptor".to_string(),
            ));
        }
        inner.listening.insert(fd.raw());
        Ok(())
    }

    fn connect(
        &mut self,
        fd: TransportFd,
        _peer: &MacAddr,
        _port: u16,
    ) -> Result<ConnectProgress, TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        inner
            .connect_script
            .pop_front()
            .unwrap_or(Ok(ConnectProgress::Established))
    }

    fn poll_connect(&mut self, fd: TransportFd) -> Result<ConnectProgress, TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        inner
            .poll_connect_script
            .pop_front()
            .unwrap_or(Ok(ConnectProgress::Established))
    }

    fn accept(
        &mut self,
        fd: TransportFd,
    ) -> Result<(TransportFd, MacAddr, u16), TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        if !inner.listening.contains(&fd.raw()) {
            return Err(TransportError::Io("accept on non-listener".to_string()));
        }
        match inner.accept_script.pop_front() {
            Some(Ok((mac, port))) => {
                let conn_fd = inner.alloc()?;
                Ok((conn_fd, mac, port))
            }
            Some(Err(err)) => Err(err),
            None => Err(TransportError::WouldBlock),
        }
    }

    fn send(&mut self, fd: TransportFd, data: &[u8]) -> Result<usize, TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        let accepted = match inner.send_script.pop_front() {
            Some(Ok(cap)) => cap.min(data.len()),
            Some(Err(err)) => return Err(err),
            None => data.len(),
        };
        let raw = fd.raw();
        inner
            .sent
            .entry(raw)
            .or_default()
            .extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    fn recv(&mut self, fd: TransportFd, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut inner = self.lock();
        inner.check_open(fd)?;
        match inner.recv_script.pop_front() {
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Err(err)) => Err(err),
            None => Err(TransportError::WouldBlock),
        }
    }

    fn close(&mut self, fd: TransportFd) {
        let mut inner = self.lock();
        let raw = fd.raw();
        if inner.open_fds.remove(&raw) {
            inner.closed_total += 1;
        } else {
            inner.double_closes += 1;
        }
        inner.bound.remove(&raw);
        inner.listening.remove(&raw);
    }
}
