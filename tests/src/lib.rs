//! # Adhoc-Net Test Suite
//!
//! Unified test crate containing:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs      # End-to-end PTP socket scenarios
//!     ├── failure_paths.rs  # Error mapping and descriptor accounting
//!     └── loopback.rs       # Real TCP transport over 127.0.0.1
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p adhoc-tests
//! cargo test -p adhoc-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
