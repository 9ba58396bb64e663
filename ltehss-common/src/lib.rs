//! Common types and utilities for the ltehss workspace
//!
//! This crate provides the shared error type, configuration structures,
//! logging bootstrap and small codecs used by the HSS core.

pub mod config;
pub mod error;
pub mod logging;
pub mod octet;
pub mod types;

pub use config::{HssConfig, UeStoreKind};
pub use error::Error;
pub use logging::{init_logging, HexDump, LogLevel};
pub use octet::parse_hex_fixed;
pub use types::Plmn;
