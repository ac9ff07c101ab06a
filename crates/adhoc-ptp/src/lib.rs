//! # PTP Ad-hoc Socket Emulation
//!
//! This crate emulates the console's point-to-point ("PTP")
//! connection-oriented ad-hoc networking primitive on top of a
//! conventional stream transport. Client code sees the original
//! primitive surface — Listen, Open, Accept, Send, Recv, Flush, Close
//! over opaque socket handles — while each logical PTP socket is backed
//! by a real connection-oriented socket tracked in an internal registry.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - **Domain Layer:** socket-state records, the registry arena,
//!   generation-checked handles, port resolution
//! - **Ports Layer:** trait definitions for what we expose
//!   ([`AdhocPtpApi`]) and what we require (address validation, the port
//!   source, the stream transport, configuration)
//! - **Service Layer:** [`AdhocPtpService`], wiring domain to ports with
//!   the original's check ordering and error-code semantics
//! - **Adapters Layer:** concrete implementations, feature-gated
//!
//! ## Example
//!
//! ```rust
//! use adhoc_ptp::{
//!     AdhocConfig, AdhocPtpService, MacAddr, NoOpAddressValidator, NoOpTransport,
//!     PtpState, SequentialPortSource,
//! };
//!
//! let mut service = AdhocPtpService::new(
//!     Box::new(NoOpTransport::new()),
//!     Box::new(NoOpAddressValidator::new()),
//!     Box::new(SequentialPortSource::default()),
//!     AdhocConfig::default(),
//! );
//! service.init();
//!
//! let local = MacAddr::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
//! let handle = service
//!     .listen(&local, 30000, 4096, 100_000, 5, 5, 0)
//!     .unwrap();
//! assert_eq!(service.registry().get(handle).unwrap().state, PtpState::Listening);
//!
//! service.shutdown();
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// ADAPTERS & TEST UTILITIES
// =============================================================================

/// Concrete port implementations. Stubs are always available; production
/// variants require the `network` / `config` features.
pub mod adapters;

/// Deterministic transports and port sources for tests.
/// Requires feature: `test-utils`.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Domain
pub use domain::{
    resolve_port, AdhocConfig, AdhocError, MacAddr, PtpSocketState, PtpState, SocketHandle,
    SocketRegistry, TransportFd,
};

// Port traits
pub use ports::{
    AddressValidator, AdhocPtpApi, ConfigProvider, ConnectProgress, PortSource, StreamTransport,
    TransportError,
};

// Service
pub use service::AdhocPtpService;

// Adapters - stubs always available
pub use adapters::{
    LocalMacValidator, NoOpAddressValidator, NoOpTransport, SequentialPortSource,
    StaticConfigProvider,
};

// Production adapters (feature-gated)
#[cfg(feature = "config")]
pub use adapters::{ConfigError, TomlConfigProvider};
#[cfg(feature = "network")]
pub use adapters::{RandomPortSource, TcpStreamTransport};

// Test utilities
#[cfg(feature = "test-utils")]
pub use test_utils::{FixedPortSource, ScriptedTransport};
