//! Adapters Layer
//!
//! Concrete implementations of the outbound ports.

mod network;

pub use network::*;
