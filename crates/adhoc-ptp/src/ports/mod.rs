//! Ports Layer
//!
//! Trait boundaries between the PTP core and the outside world.
//! `inbound` is what we expose; `outbound` is what we require.

mod inbound;
mod outbound;

pub use inbound::AdhocPtpApi;
pub use outbound::{
    AddressValidator, ConfigProvider, ConnectProgress, PortSource, StreamTransport,
    TransportError,
};
