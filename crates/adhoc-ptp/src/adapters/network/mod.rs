//! Network-facing adapters: address validation, port sources, transports,
//! and configuration providers. Stub variants are always available;
//! production variants sit behind the `network` and `config` features.

mod address;
mod config;
mod random;
mod transport;

pub use address::{LocalMacValidator, NoOpAddressValidator};
pub use config::StaticConfigProvider;
pub use random::SequentialPortSource;
pub use transport::NoOpTransport;

#[cfg(feature = "config")]
pub use config::{ConfigError, TomlConfigProvider};
#[cfg(feature = "network")]
pub use random::RandomPortSource;
#[cfg(feature = "network")]
pub use transport::TcpStreamTransport;
