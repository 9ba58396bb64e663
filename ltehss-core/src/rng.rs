//! RAND challenge generation
//!
//! Challenges come from the operating system CSPRNG. A predictable RAND
//! would let an attacker precompute vectors, so a non-cryptographic
//! generator is not acceptable here.

use ltehss_crypto::milenage::RAND_LEN;
use rand::rngs::OsRng;
use rand::RngCore;

/// Generates a fresh 16-byte RAND from platform entropy.
pub fn generate_rand() -> [u8; RAND_LEN] {
    let mut rand = [0u8; RAND_LEN];
    OsRng.fill_bytes(&mut rand);
    rand
}
