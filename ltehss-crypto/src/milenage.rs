//! Milenage algorithm (3GPP TS 35.206)
//!
//! The 3GPP AKA function family built on AES-128. The HSS needs:
//! - f1: network authentication code MAC-A
//! - f1*: resynchronization authentication code MAC-S
//! - f2/f3/f4/f5: RES, CK, IK, AK (computed together for vector generation)
//! - f5*: the anonymity key used while processing an AUTS token
//! - OPc derivation from the operator code OP and the subscriber key K

use crate::aes::{xor_block, Aes128Block, BLOCK_SIZE};

/// Subscriber key K size in bytes
pub const KEY_LEN: usize = 16;
/// OP/OPc size in bytes
pub const OP_LEN: usize = 16;
/// RAND challenge size in bytes
pub const RAND_LEN: usize = 16;
/// SQN size in bytes
pub const SQN_LEN: usize = 6;
/// AMF size in bytes
pub const AMF_LEN: usize = 2;
/// MAC-A / MAC-S size in bytes
pub const MAC_LEN: usize = 8;
/// RES size in bytes (Milenage f2 output)
pub const RES_LEN: usize = 8;
/// CK size in bytes
pub const CK_LEN: usize = 16;
/// IK size in bytes
pub const IK_LEN: usize = 16;
/// AK size in bytes
pub const AK_LEN: usize = 6;

// Per-function rotation amounts r2..r5 and constants c2..c5 from TS 35.206
// §4.1. c1 is all zeros and r1 = 64; f1/f1* are handled separately because
// their input block mixes in SQN and AMF.
const R1: usize = 64;
const OUT2: (usize, u8) = (0, 1);
const OUT3: (usize, u8) = (32, 2);
const OUT4: (usize, u8) = (64, 4);
const OUT5: (usize, u8) = (96, 8);

/// Rotate a 128-bit block left by `bits` positions
fn rotate_left(block: &[u8; BLOCK_SIZE], bits: usize) -> [u8; BLOCK_SIZE] {
    if bits % 128 == 0 {
        return *block;
    }
    let byte_shift = (bits / 8) % BLOCK_SIZE;
    let bit_shift = bits % 8;
    let mut out = [0u8; BLOCK_SIZE];
    for (i, slot) in out.iter_mut().enumerate() {
        let hi = block[(i + byte_shift) % BLOCK_SIZE];
        let lo = block[(i + byte_shift + 1) % BLOCK_SIZE];
        *slot = if bit_shift == 0 {
            hi
        } else {
            (hi << bit_shift) | (lo >> (8 - bit_shift))
        };
    }
    out
}

/// Derive OPc from the operator code and the subscriber key.
///
/// OPc = OP ⊕ E_K(OP)
pub fn compute_opc(k: &[u8; KEY_LEN], op: &[u8; OP_LEN]) -> [u8; OP_LEN] {
    let mut opc = Aes128Block::new(k).encrypt_block_copy(op);
    xor_block(&mut opc, op);
    opc
}

/// Milenage keyed with a subscriber's K and OPc.
pub struct Milenage {
    cipher: Aes128Block,
    opc: [u8; OP_LEN],
}

impl Milenage {
    /// Create a Milenage instance from K and a precomputed OPc.
    pub fn new(k: &[u8; KEY_LEN], opc: &[u8; OP_LEN]) -> Self {
        Self {
            cipher: Aes128Block::new(k),
            opc: *opc,
        }
    }

    /// TEMP = E_K(RAND ⊕ OPc)
    fn temp(&self, rand: &[u8; RAND_LEN]) -> [u8; BLOCK_SIZE] {
        let mut block = *rand;
        xor_block(&mut block, &self.opc);
        self.cipher.encrypt_block(&mut block);
        block
    }

    /// OUT1 = E_K(TEMP ⊕ rot(IN1 ⊕ OPc, r1) ⊕ c1) ⊕ OPc
    ///
    /// IN1 = SQN ‖ AMF ‖ SQN ‖ AMF. c1 is all zeros and contributes nothing.
    fn out1(
        &self,
        rand: &[u8; RAND_LEN],
        sqn: &[u8; SQN_LEN],
        amf: &[u8; AMF_LEN],
    ) -> [u8; BLOCK_SIZE] {
        let temp = self.temp(rand);

        let mut in1 = [0u8; BLOCK_SIZE];
        in1[0..6].copy_from_slice(sqn);
        in1[6..8].copy_from_slice(amf);
        in1[8..14].copy_from_slice(sqn);
        in1[14..16].copy_from_slice(amf);
        xor_block(&mut in1, &self.opc);

        let mut block = rotate_left(&in1, R1);
        xor_block(&mut block, &temp);
        self.cipher.encrypt_block(&mut block);
        xor_block(&mut block, &self.opc);
        block
    }

    /// OUTn = E_K(rot(TEMP ⊕ OPc, rn) ⊕ cn) ⊕ OPc for n in 2..=5
    fn out_n(&self, rand: &[u8; RAND_LEN], (rotation, constant): (usize, u8)) -> [u8; BLOCK_SIZE] {
        let mut block = self.temp(rand);
        xor_block(&mut block, &self.opc);
        let mut block = rotate_left(&block, rotation);
        block[BLOCK_SIZE - 1] ^= constant;
        self.cipher.encrypt_block(&mut block);
        xor_block(&mut block, &self.opc);
        block
    }

    /// f1 - network authentication function, MAC-A
    pub fn f1(
        &self,
        rand: &[u8; RAND_LEN],
        sqn: &[u8; SQN_LEN],
        amf: &[u8; AMF_LEN],
    ) -> [u8; MAC_LEN] {
        let out1 = self.out1(rand, sqn, amf);
        let mut mac_a = [0u8; MAC_LEN];
        mac_a.copy_from_slice(&out1[0..8]);
        mac_a
    }

    /// f1* - resynchronization authentication function, MAC-S
    ///
    /// During resynchronization the AMF input is a dummy of two zero bytes
    /// (TS 33.102 §6.3.3); the caller supplies it.
    pub fn f1_star(
        &self,
        rand: &[u8; RAND_LEN],
        sqn: &[u8; SQN_LEN],
        amf: &[u8; AMF_LEN],
    ) -> [u8; MAC_LEN] {
        let out1 = self.out1(rand, sqn, amf);
        let mut mac_s = [0u8; MAC_LEN];
        mac_s.copy_from_slice(&out1[8..16]);
        mac_s
    }

    /// f2, f3, f4 and f5 in one call: (RES, CK, IK, AK).
    ///
    /// Vector generation needs all four, and f2/f5 share OUT2.
    pub fn f2345(
        &self,
        rand: &[u8; RAND_LEN],
    ) -> ([u8; RES_LEN], [u8; CK_LEN], [u8; IK_LEN], [u8; AK_LEN]) {
        let out2 = self.out_n(rand, OUT2);
        let ck = self.out_n(rand, OUT3);
        let ik = self.out_n(rand, OUT4);

        let mut res = [0u8; RES_LEN];
        res.copy_from_slice(&out2[8..16]);
        let mut ak = [0u8; AK_LEN];
        ak.copy_from_slice(&out2[0..6]);

        (res, ck, ik, ak)
    }

    /// f5* - resynchronization anonymity key
    pub fn f5_star(&self, rand: &[u8; RAND_LEN]) -> [u8; AK_LEN] {
        let out5 = self.out_n(rand, OUT5);
        let mut ak = [0u8; AK_LEN];
        ak.copy_from_slice(&out5[0..6]);
        ak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3GPP TS 35.207 test set 1
    const K: [u8; 16] = [
        0x46, 0x5b, 0x5c, 0xe8, 0xb1, 0x99, 0xb4, 0x9f,
        0xaa, 0x5f, 0x0a, 0x2e, 0xe2, 0x38, 0xa6, 0xbc,
    ];
    const RAND: [u8; 16] = [
        0x23, 0x55, 0x3c, 0xbe, 0x96, 0x37, 0xa8, 0x9d,
        0x21, 0x8a, 0xe6, 0x4d, 0xae, 0x47, 0xbf, 0x35,
    ];
    const SQN: [u8; 6] = [0xff, 0x9b, 0xb4, 0xd0, 0xb6, 0x07];
    const AMF: [u8; 2] = [0xb9, 0xb9];
    const OP: [u8; 16] = [
        0xcd, 0xc2, 0x02, 0xd5, 0x12, 0x3e, 0x20, 0xf6,
        0x2b, 0x6d, 0x67, 0x6a, 0xc7, 0x2c, 0xb3, 0x18,
    ];
    const OPC: [u8; 16] = [
        0xcd, 0x63, 0xcb, 0x71, 0x95, 0x4a, 0x9f, 0x4e,
        0x48, 0xa5, 0x99, 0x4e, 0x37, 0xa0, 0x2b, 0xaf,
    ];

    #[test]
    fn test_compute_opc_test_set_1() {
        assert_eq!(compute_opc(&K, &OP), OPC);
    }

    #[test]
    fn test_milenage_test_set_1() {
        let m = Milenage::new(&K, &OPC);

        assert_eq!(
            m.f1(&RAND, &SQN, &AMF),
            [0x4a, 0x9f, 0xfa, 0xc3, 0x54, 0xdf, 0xaf, 0xb3],
            "f1 (MAC-A) mismatch"
        );
        assert_eq!(
            m.f1_star(&RAND, &SQN, &AMF),
            [0x01, 0xcf, 0xaf, 0x9e, 0xc4, 0xe8, 0x71, 0xe9],
            "f1* (MAC-S) mismatch"
        );

        let (res, ck, ik, ak) = m.f2345(&RAND);
        assert_eq!(res, [0xa5, 0x42, 0x11, 0xd5, 0xe3, 0xba, 0x50, 0xbf], "f2 (RES) mismatch");
        assert_eq!(
            ck,
            [
                0xb4, 0x0b, 0xa9, 0xa3, 0xc5, 0x8b, 0x2a, 0x05,
                0xbb, 0xf0, 0xd9, 0x87, 0xb2, 0x1b, 0xf8, 0xcb,
            ],
            "f3 (CK) mismatch"
        );
        assert_eq!(
            ik,
            [
                0xf7, 0x69, 0xbc, 0xd7, 0x51, 0x04, 0x46, 0x04,
                0x12, 0x76, 0x72, 0x71, 0x1c, 0x6d, 0x34, 0x41,
            ],
            "f4 (IK) mismatch"
        );
        assert_eq!(ak, [0xaa, 0x68, 0x9c, 0x64, 0x83, 0x70], "f5 (AK) mismatch");

        assert_eq!(
            m.f5_star(&RAND),
            [0x45, 0x1e, 0x8b, 0xec, 0xa4, 0x3b],
            "f5* (AK resync) mismatch"
        );
    }

    /// 3GPP TS 35.207 test set 3
    #[test]
    fn test_milenage_test_set_3() {
        let k: [u8; 16] = [
            0xfe, 0xc8, 0x6b, 0xa6, 0xeb, 0x70, 0x7e, 0xd0,
            0x89, 0x05, 0x75, 0x7b, 0x1b, 0xb4, 0x4b, 0x8f,
        ];
        let rand: [u8; 16] = [
            0x9f, 0x7c, 0x8d, 0x02, 0x1a, 0xcc, 0xf4, 0xdb,
            0x21, 0x3c, 0xcf, 0xf0, 0xc7, 0xf7, 0x1a, 0x6a,
        ];
        let sqn: [u8; 6] = [0x9d, 0x02, 0x77, 0x59, 0x5f, 0xfc];
        let amf: [u8; 2] = [0x72, 0x5c];
        let op: [u8; 16] = [
            0xdb, 0xc5, 0x9a, 0xdc, 0xb6, 0xf9, 0xa0, 0xef,
            0x73, 0x54, 0x77, 0xb7, 0xfa, 0xdf, 0x83, 0x74,
        ];

        let opc = compute_opc(&k, &op);
        assert_eq!(
            opc,
            [
                0x10, 0x06, 0x02, 0x0f, 0x0a, 0x47, 0x8b, 0xf6,
                0xb6, 0x99, 0xf1, 0x5c, 0x06, 0x2e, 0x42, 0xb3,
            ]
        );

        let m = Milenage::new(&k, &opc);
        assert_eq!(m.f1(&rand, &sqn, &amf), [0x9c, 0xab, 0xc3, 0xe9, 0x9b, 0xaf, 0x72, 0x81]);
        assert_eq!(
            m.f1_star(&rand, &sqn, &amf),
            [0x95, 0x81, 0x4b, 0xa2, 0xb3, 0x04, 0x43, 0x24]
        );

        let (res, ck, ik, ak) = m.f2345(&rand);
        assert_eq!(res, [0x80, 0x11, 0xc4, 0x8c, 0x0c, 0x21, 0x4e, 0xd2]);
        assert_eq!(
            ck,
            [
                0x5d, 0xbd, 0xbb, 0x29, 0x54, 0xe8, 0xf3, 0xcd,
                0xe6, 0x65, 0xb0, 0x46, 0x17, 0x9a, 0x50, 0x98,
            ]
        );
        assert_eq!(
            ik,
            [
                0x59, 0xa9, 0x2d, 0x3b, 0x47, 0x6a, 0x04, 0x43,
                0x48, 0x70, 0x55, 0xcf, 0x88, 0xb2, 0x30, 0x7b,
            ]
        );
        assert_eq!(ak, [0x33, 0x48, 0x4d, 0xc2, 0x13, 0x6b]);
        assert_eq!(m.f5_star(&rand), [0xde, 0xac, 0xdd, 0x84, 0x8c, 0xc6]);
    }

    /// 3GPP TS 35.207 test set 6
    #[test]
    fn test_milenage_test_set_6() {
        let k: [u8; 16] = [
            0x6c, 0x38, 0xa1, 0x16, 0xac, 0x28, 0x0c, 0x45,
            0x4f, 0x59, 0x33, 0x2e, 0xe3, 0x5c, 0x8c, 0x4f,
        ];
        let rand: [u8; 16] = [
            0xee, 0x64, 0x66, 0xbc, 0x96, 0x20, 0x2c, 0x5a,
            0x55, 0x7a, 0xbb, 0xef, 0xf8, 0xba, 0xbf, 0x63,
        ];
        let sqn: [u8; 6] = [0x41, 0x4b, 0x98, 0x22, 0x21, 0x81];
        let amf: [u8; 2] = [0x44, 0x64];
        let op: [u8; 16] = [
            0x1b, 0xa0, 0x0a, 0x1a, 0x7c, 0x67, 0x00, 0xac,
            0x8c, 0x3f, 0xf3, 0xe9, 0x6a, 0xd0, 0x87, 0x25,
        ];

        let opc = compute_opc(&k, &op);
        let m = Milenage::new(&k, &opc);

        assert_eq!(m.f1(&rand, &sqn, &amf), [0x07, 0x8a, 0xdf, 0xb4, 0x88, 0x24, 0x1a, 0x57]);
        let (res, _, _, ak) = m.f2345(&rand);
        assert_eq!(res, [0x16, 0xc8, 0x23, 0x3f, 0x05, 0xa0, 0xac, 0x28]);
        assert_eq!(ak, [0x45, 0xb0, 0xf6, 0x9a, 0xb0, 0x6c]);
        assert_eq!(m.f5_star(&rand), [0x1f, 0x53, 0xcd, 0x2b, 0x11, 0x13]);
    }

    #[test]
    fn test_rotate_left() {
        let block: [u8; 16] = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
            0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
        ];
        assert_eq!(rotate_left(&block, 0), block);
        assert_eq!(rotate_left(&block, 128), block);

        let by_64 = rotate_left(&block, 64);
        assert_eq!(by_64[0], 0x09);
        assert_eq!(by_64[8], 0x01);

        let by_96 = rotate_left(&block, 96);
        assert_eq!(by_96[0], 0x0d);
        assert_eq!(by_96[4], 0x01);
    }

    #[test]
    fn test_f2_f5_consistent_with_out2_split() {
        // RES and AK come from the same OUT2 block: recomputing f2345 twice
        // must agree byte for byte.
        let m = Milenage::new(&K, &OPC);
        assert_eq!(m.f2345(&RAND), m.f2345(&RAND));
    }
}
