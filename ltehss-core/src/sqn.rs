//! SQN sequence number arithmetic (3GPP TS 33.102 Annex C)
//!
//! The 48-bit SQN is carried as 6 big-endian bytes and partitioned into
//! SEQ (upper 43 bits) and IND (lower 5 bits). IND indexes the per-access
//! array on the USIM side, so a regular increment steps both fields; after
//! a resynchronization only SEQ moves.

use ltehss_crypto::milenage::SQN_LEN;

const IND_BITS: u32 = 5;
const IND_MASK: u64 = 0x1f;
// The maximal SEQ value is skipped: SEQ wraps at 2^43 - 1, IND at 31.
const SEQ_MOD: u64 = (1 << 43) - 1;
const IND_MOD: u64 = 31;

/// Decodes the 6-byte big-endian SQN field to a 48-bit integer.
pub fn to_u48(sqn: &[u8; SQN_LEN]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[2..].copy_from_slice(sqn);
    u64::from_be_bytes(bytes)
}

/// Encodes a 48-bit integer as the 6-byte big-endian SQN field.
pub fn from_u48(value: u64) -> [u8; SQN_LEN] {
    let bytes = value.to_be_bytes();
    let mut sqn = [0u8; SQN_LEN];
    sqn.copy_from_slice(&bytes[2..]);
    sqn
}

/// Regular increment after a successful vector generation:
/// SEQ ← (SEQ + 1) mod (2^43 − 1), IND ← (IND + 1) mod 31.
pub fn increment(sqn: &[u8; SQN_LEN]) -> [u8; SQN_LEN] {
    let value = to_u48(sqn);
    let seq = ((value >> IND_BITS) + 1) % SEQ_MOD;
    let ind = ((value & IND_MASK) + 1) % IND_MOD;
    from_u48((seq << IND_BITS) | ind)
}

/// Resynchronization increment: SEQ ← (SEQ + 1) mod (2^43 − 1), IND
/// unchanged.
pub fn increment_seq(sqn: &[u8; SQN_LEN]) -> [u8; SQN_LEN] {
    let value = to_u48(sqn);
    let seq = ((value >> IND_BITS) + 1) % SEQ_MOD;
    from_u48((seq << IND_BITS) | (value & IND_MASK))
}
