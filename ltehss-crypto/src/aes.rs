//! AES-128 block cipher wrapper
//!
//! Single-block AES-128 operations as needed by Milenage, which is built
//! entirely from the block encryption function E_K.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;

/// AES-128 block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes
pub const KEY_SIZE: usize = 16;

/// AES-128 block cipher for single-block operations
#[derive(Clone)]
pub struct Aes128Block {
    cipher: Aes128,
}

impl Aes128Block {
    /// Create a new AES-128 block cipher with the given key
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
        }
    }

    /// Encrypt a single 16-byte block in place
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let mut generic_block = GenericArray::clone_from_slice(block);
        self.cipher.encrypt_block(&mut generic_block);
        block.copy_from_slice(&generic_block);
    }

    /// Encrypt a single 16-byte block, returning the result
    pub fn encrypt_block_copy(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        let mut result = *block;
        self.encrypt_block(&mut result);
        result
    }
}

/// XOR two 16-byte blocks
#[inline]
pub fn xor_block(a: &mut [u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) {
    for i in 0..BLOCK_SIZE {
        a[i] ^= b[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes128_encrypt_block() {
        // NIST FIPS 197 test vector
        let key: [u8; 16] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
            0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
        ];
        let plaintext: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
            0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
        ];
        let expected: [u8; 16] = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30,
            0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
        ];

        let cipher = Aes128Block::new(&key);
        assert_eq!(cipher.encrypt_block_copy(&plaintext), expected);

        let mut in_place = plaintext;
        cipher.encrypt_block(&mut in_place);
        assert_eq!(in_place, expected);
    }

    #[test]
    fn test_xor_block() {
        let mut a: [u8; 16] = [0xff; 16];
        let b: [u8; 16] = [0xaa; 16];
        xor_block(&mut a, &b);
        assert_eq!(a, [0x55; 16]);
    }
}
