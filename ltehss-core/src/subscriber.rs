//! In-memory subscriber record

use std::net::Ipv4Addr;

use ltehss_crypto::milenage::{AMF_LEN, KEY_LEN, OP_LEN, RAND_LEN, SQN_LEN};

/// Authentication algorithm configured for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAlgo {
    /// Test-set style XOR algorithm (TS 35.207), kept for interop with
    /// reference handsets
    Xor,
    /// MILENAGE (TS 35.206)
    Milenage,
}

impl AuthAlgo {
    /// The tag used in the CSV schema and the SQL `auth` column.
    pub fn tag(&self) -> &'static str {
        match self {
            AuthAlgo::Xor => "xor",
            AuthAlgo::Milenage => "mil",
        }
    }

    /// Parses the CSV/SQL tag. Unknown tags are rejected so typos in a
    /// credential database cannot silently select a different algorithm.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "xor" => Some(AuthAlgo::Xor),
            "mil" => Some(AuthAlgo::Milenage),
            _ => None,
        }
    }
}

/// One subscriber's authentication state, keyed by IMSI.
///
/// This is a plain value: the engine works on a detached copy for the
/// duration of a request and commits the final SQN and last RAND back
/// through the store. Nothing here references the store.
#[derive(Debug, Clone)]
pub struct UeContext {
    /// 15-decimal-digit subscriber identity
    pub imsi: u64,
    /// Operator-chosen label, ignored by protocol logic
    pub name: String,
    /// Configured authentication algorithm
    pub algo: AuthAlgo,
    /// Permanent subscriber secret K
    pub key: [u8; KEY_LEN],
    /// True if the operator code was provisioned as OP (OPc derived at
    /// load time), false if OPc was provisioned directly
    pub op_configured: bool,
    /// Operator code OP; meaningful only when `op_configured`
    pub op: [u8; OP_LEN],
    /// OPc, either provisioned or derived from OP and K at load time
    pub opc: [u8; OP_LEN],
    /// Authentication management field
    pub amf: [u8; AMF_LEN],
    /// Current sequence number, big-endian
    pub sqn: [u8; SQN_LEN],
    /// Most recent RAND issued to this subscriber; input to
    /// resynchronization
    pub last_rand: [u8; RAND_LEN],
    /// QoS class identifier for the default bearer
    pub qci: u8,
    /// Statically assigned IPv4 address, `None` for dynamic allocation
    pub static_ip: Option<Ipv4Addr>,
}
