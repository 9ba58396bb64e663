//! Key derivation for the EPS key hierarchy
//!
//! Implements the generic KDF of 3GPP TS 33.220 Annex B (HMAC-SHA-256 over
//! FC ‖ P0 ‖ L0 ‖ ... ‖ Pn ‖ Ln) and the K_ASME derivation of
//! 3GPP TS 33.401 Annex A.2 built on top of it. K_ASME anchors the whole
//! EPS key hierarchy, so the serving network identity (the 3-byte encoded
//! PLMN) and the masked sequence number SQN ⊕ AK are both bound into it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HMAC-SHA256 output size in bytes
pub const HMAC_SHA256_SIZE: usize = 32;

/// K_ASME size in bytes (256 bits)
pub const K_ASME_LEN: usize = 32;

/// FC value for K_ASME derivation (TS 33.401 Annex A.2)
const FC_K_ASME: u8 = 0x10;

/// Compute HMAC-SHA256 of `input` under `key`.
pub fn hmac_sha256(key: &[u8], input: &[u8]) -> [u8; HMAC_SHA256_SIZE] {
    // HMAC-SHA256 accepts keys of any size, so this can never fail
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any size"));
    mac.update(input);
    let mut output = [0u8; HMAC_SHA256_SIZE];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Generic 3GPP KDF (TS 33.220 Annex B).
///
/// S = FC ‖ P0 ‖ L0 ‖ P1 ‖ L1 ‖ ... with each Li the big-endian 16-bit
/// length of Pi.
pub fn calculate_kdf_key(key: &[u8], fc: u8, parameters: &[&[u8]]) -> [u8; HMAC_SHA256_SIZE] {
    let mut s = Vec::with_capacity(1 + parameters.iter().map(|p| p.len() + 2).sum::<usize>());
    s.push(fc);
    for param in parameters {
        s.extend_from_slice(param);
        s.extend_from_slice(&(param.len() as u16).to_be_bytes());
    }
    hmac_sha256(key, &s)
}

/// Derive K_ASME from CK, IK, SQN ⊕ AK and the serving network id
/// (TS 33.401 Annex A.2).
///
/// K_ASME = KDF(CK ‖ IK, FC=0x10, SN id, SQN ⊕ AK), where `sn_id` is the
/// 3-byte 3GPP encoding of the serving PLMN.
pub fn derive_k_asme(
    ck: &[u8; 16],
    ik: &[u8; 16],
    sqn_xor_ak: &[u8; 6],
    sn_id: &[u8; 3],
) -> [u8; K_ASME_LEN] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(ck);
    key[16..].copy_from_slice(ik);

    calculate_kdf_key(&key, FC_K_ASME, &[sn_id, sqn_xor_ak])
}
