//! Cross-layer integration scenarios for the PTP subsystem.

pub mod failure_paths;
pub mod lifecycle;
pub mod loopback;
