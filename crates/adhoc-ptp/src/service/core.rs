//! Service construction and lifecycle.

use tracing::{debug, info};

use crate::domain::{AdhocConfig, AdhocError, SocketRegistry};
use crate::ports::{AddressValidator, PortSource, StreamTransport};

/// PTP subsystem service implementing the driving port.
///
/// This is the explicitly constructed context object replacing the
/// original's ambient globals: it owns the socket registry and the boxed
/// outbound ports, and carries the init/shutdown lifecycle the library
/// flag used to represent.
pub struct AdhocPtpService {
    /// Socket-state records, owned here for the subsystem's lifetime.
    pub(crate) registry: SocketRegistry,
    /// Underlying connection-oriented transport.
    pub(crate) transport: Box<dyn StreamTransport>,
    /// Confirms source addresses identify the local host.
    pub(crate) address_validator: Box<dyn AddressValidator>,
    /// Candidate ports for auto-binding.
    pub(crate) port_source: Box<dyn PortSource>,
    pub(crate) config: AdhocConfig,
    /// Mirrors the original library's process-wide init flag.
    pub(crate) initialized: bool,
}

impl AdhocPtpService {
    /// Build a service over the given ports. The service starts
    /// uninitialized; call [`AdhocPtpService::init`] before use.
    pub fn new(
        transport: Box<dyn StreamTransport>,
        address_validator: Box<dyn AddressValidator>,
        port_source: Box<dyn PortSource>,
        config: AdhocConfig,
    ) -> Self {
        Self {
            registry: SocketRegistry::new(config.max_sockets),
            transport,
            address_validator,
            port_source,
            config,
            initialized: false,
        }
    }

    /// Start the subsystem. Operations before this fail with
    /// `NotInitialized`.
    pub fn init(&mut self) {
        info!(max_sockets = self.config.max_sockets, "ptp subsystem initialized");
        self.initialized = true;
    }

    /// Stop the subsystem: close every registered transport descriptor and
    /// empty the registry. Outstanding handles go stale.
    pub fn shutdown(&mut self) {
        let records = self.registry.take_all();
        let count = records.len();
        for record in records {
            self.transport.close(record.transport);
        }
        self.initialized = false;
        info!(closed = count, "ptp subsystem shut down");
    }

    /// Whether `init` has been called (and no `shutdown` since).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of live socket records.
    pub fn socket_count(&self) -> usize {
        self.registry.len()
    }

    /// Read access to the registry, for diagnostics and tests.
    pub fn registry(&self) -> &SocketRegistry {
        &self.registry
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), AdhocError> {
        if self.initialized {
            Ok(())
        } else {
            debug!("operation rejected: subsystem not initialized");
            Err(AdhocError::NotInitialized)
        }
    }
}
