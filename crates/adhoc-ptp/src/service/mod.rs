//! Service Layer
//!
//! Wires the domain to the outbound ports and implements the caller-facing
//! PTP operations, one file per operation family.

mod accept;
mod api;
mod close;
mod core;
mod data;
mod listen;
mod open;


pub use self::core::AdhocPtpService;
