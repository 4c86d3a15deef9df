//! CLI command modules.

pub mod addrs;
pub mod config;
pub mod probe;
pub mod receive;
pub mod send;
