//! HSS authentication core
//!
//! Owns the long-term cryptographic identity of mobile subscribers and
//! answers the three S6a-facing request types: Authentication Information,
//! Update Location and SQN Resynchronization. Also maintains the IMSI↔IP
//! mapping queried by the packet gateway.
//!
//! The engine ([`Hss`]) is constructed from an [`HssConfig`], backed by one
//! of three subscriber stores (CSV flat file, MySQL, PostgreSQL) selected at
//! configuration time. Lifecycle: construct → [`Hss::init`] → serve →
//! [`Hss::close`] → drop.
//!
//! [`HssConfig`]: ltehss_common::HssConfig

pub mod error;
pub mod hss;
pub mod rng;
pub mod sqn;
pub mod store;
pub mod subscriber;

pub use error::HssError;
pub use hss::{AuthVector, Hss, AUTS_LEN};
pub use store::UeStore;
pub use subscriber::{AuthAlgo, UeContext};
