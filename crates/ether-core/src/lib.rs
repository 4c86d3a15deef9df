//! ether-core — wire format, protocol constants and configuration.
//! All other Ether crates depend on this one.

pub mod config;
pub mod wire;

pub use config::{ConfigError, EtherConfig};
pub use wire::{TransferHeader, WireError};
