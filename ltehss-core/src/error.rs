//! Error types for the HSS core

use thiserror::Error;

/// Request and storage faults surfaced by the HSS core.
///
/// Initialization errors are fatal to startup; per-request errors are
/// returned to the caller (the Diameter adapter translates
/// `SubscriberNotFound` to DIAMETER_ERROR_USER_UNKNOWN) and logged with the
/// IMSI and error kind. Subscriber secrets never appear in error text.
#[derive(Debug, Error)]
pub enum HssError {
    /// No subscriber record for the requested IMSI.
    #[error("subscriber not found, IMSI {imsi:015}")]
    SubscriberNotFound {
        /// The unknown IMSI
        imsi: u64,
    },

    /// The storage medium failed. Fatal at init; aborts the response at
    /// request time.
    #[error("subscriber store unavailable: {0}")]
    StoreUnavailable(String),

    /// Malformed subscriber record: bad hex width, unparseable IP,
    /// duplicate static IP, unknown tag. Fatal at init.
    #[error("invalid subscriber record: {0}")]
    InvalidRecord(String),

    /// SQN resynchronization requested for an algorithm that does not
    /// support it (XOR).
    #[error("SQN resynchronization not supported for this algorithm")]
    AlgorithmUnsupported,

    /// AUTS MAC-S verification failed during resynchronization.
    #[error("AUTS MAC-S verification failed")]
    AuthFailure,

    /// A cryptographic primitive surfaced an error. Fatal.
    #[error("cryptographic primitive failure: {0}")]
    CryptoInternal(String),
}

impl From<std::io::Error> for HssError {
    fn from(e: std::io::Error) -> Self {
        HssError::StoreUnavailable(e.to_string())
    }
}

impl From<sqlx::Error> for HssError {
    fn from(e: sqlx::Error) -> Self {
        HssError::StoreUnavailable(e.to_string())
    }
}
