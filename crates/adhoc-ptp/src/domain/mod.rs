//! Domain Layer
//!
//! Pure PTP socket-table logic: value objects, the socket-state entity,
//! the registry arena, and port resolution. No I/O happens here; the
//! service layer drives these types through the outbound ports.

mod entities;
mod errors;
mod registry;
mod services;
mod value_objects;

pub use entities::PtpSocketState;
pub use errors::AdhocError;
pub use registry::{SocketHandle, SocketRegistry};
pub use services::resolve_port;
pub use value_objects::{AdhocConfig, MacAddr, PtpState, TransportFd};
