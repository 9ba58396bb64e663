//! Cryptographic algorithms for the HSS authentication core
//!
//! Implements the EPS AKA primitives:
//! - Milenage output functions f1, f1*, f2-f5, f5* (3GPP TS 35.206)
//! - OPc derivation from OP and K
//! - K_ASME key derivation (3GPP TS 33.401 Annex A.2)

pub mod aes;
pub mod kdf;
pub mod milenage;
