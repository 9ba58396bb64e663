//! Flat-file subscriber store
//!
//! One subscriber per CSV line:
//!
//! ```text
//! Name,Auth,IMSI,Key,OP_Type,OP_or_OPc,AMF,SQN,QCI,IP_alloc
//! ```
//!
//! Lines starting with `#` are comments. Records are held in memory for
//! the lifetime of the store; `close` rewrites the whole file so SQN
//! updates survive a clean shutdown. `last_rand` is kept in memory only
//! (the schema has no column for it and it does not need to survive a
//! restart).

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use ltehss_common::octet::parse_hex_fixed;
use ltehss_crypto::milenage::{compute_opc, RAND_LEN, SQN_LEN};
use tracing::{debug, info, warn};

use crate::error::HssError;
use crate::store::{IpPool, UeStore};
use crate::subscriber::{AuthAlgo, UeContext};

const FIELDS_PER_LINE: usize = 10;

const FILE_HEADER: &str = "\
#
# HSS subscriber database, one UE per line:
#   Name,Auth,IMSI,Key,OP_Type,OP_or_OPc,AMF,SQN,QCI,IP_alloc
#
# Name:      Human readable label to tell UEs apart. Ignored by the HSS.
# Auth:      Authentication algorithm, 'xor' or 'mil' (MILENAGE).
# IMSI:      15-digit subscriber identity.
# Key:       Permanent subscriber key K, 16 bytes of hex.
# OP_Type:   'op' or 'opc', selecting how the next field is read.
# OP_or_OPc: Operator code OP or ciphered operator code OPc, 16 bytes of hex.
# AMF:       Authentication management field, 2 bytes of hex.
# SQN:       Sequence number for authentication freshness, 6 bytes of hex.
# QCI:       QoS class identifier for the UE's default bearer.
# IP_alloc:  'dynamic' for SPGW-assigned addresses, or a static IPv4
#            address (e.g. '172.16.0.2').
#
# Lines starting with '#' are ignored and rewritten on shutdown.
#
";

#[derive(Default)]
struct CsvState {
    // BTreeMap keeps the rewrite order stable across init/close cycles
    subscribers: BTreeMap<u64, UeContext>,
    ip_to_imsi: HashMap<Ipv4Addr, u64>,
}

/// CSV flat-file backend.
pub struct CsvUeStore {
    path: PathBuf,
    pool: IpPool,
    state: RwLock<CsvState>,
}

impl CsvUeStore {
    /// Creates a store over `path`. The file is not touched until `init`.
    pub fn new(path: PathBuf, pool: IpPool) -> Self {
        Self {
            path,
            pool,
            state: RwLock::new(CsvState::default()),
        }
    }

    fn parse_line(line: &str, line_no: usize) -> Result<UeContext, HssError> {
        let invalid =
            |detail: String| HssError::InvalidRecord(format!("line {line_no}: {detail}"));

        let fields: Vec<&str> = line.split(',').collect();
        debug_assert_eq!(fields.len(), FIELDS_PER_LINE);

        let name = fields[0].to_string();

        let algo = AuthAlgo::from_tag(fields[1])
            .ok_or_else(|| invalid(format!("unknown Auth tag '{}'", fields[1])))?;

        let imsi: u64 = fields[2]
            .parse()
            .map_err(|_| invalid(format!("bad IMSI '{}'", fields[2])))?;

        let key = parse_hex_fixed::<16>(fields[3]).map_err(|e| invalid(e.to_string()))?;

        let op_configured = match fields[4] {
            "op" => true,
            "opc" => false,
            other => return Err(invalid(format!("unknown OP_Type tag '{other}'"))),
        };

        let op_or_opc = parse_hex_fixed::<16>(fields[5]).map_err(|e| invalid(e.to_string()))?;
        // When provisioned as OP the OPc is derived once here, so the hot
        // path never recomputes it.
        let (op, opc) = if op_configured {
            (op_or_opc, compute_opc(&key, &op_or_opc))
        } else {
            ([0u8; 16], op_or_opc)
        };

        let amf = parse_hex_fixed::<2>(fields[6]).map_err(|e| invalid(e.to_string()))?;
        let sqn = parse_hex_fixed::<6>(fields[7]).map_err(|e| invalid(e.to_string()))?;

        let qci: u8 = fields[8]
            .parse()
            .map_err(|_| invalid(format!("bad QCI '{}'", fields[8])))?;

        let static_ip = if fields[9] == "dynamic" {
            None
        } else {
            let ip: Ipv4Addr = fields[9]
                .parse()
                .map_err(|_| invalid(format!("bad static IP '{}'", fields[9])))?;
            Some(ip)
        };

        Ok(UeContext {
            imsi,
            name,
            algo,
            key,
            op_configured,
            op,
            opc,
            amf,
            sqn,
            last_rand: [0u8; RAND_LEN],
            qci,
            static_ip,
        })
    }

    fn parse_file(&self, contents: &str) -> Result<CsvState, HssError> {
        let mut state = CsvState::default();

        for (idx, line) in contents.lines().enumerate() {
            let line_no = idx + 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let field_count = line.split(',').count();
            if field_count != FIELDS_PER_LINE {
                warn!(line_no, field_count, "skipping CSV line with wrong field count");
                continue;
            }

            let ctx = Self::parse_line(line, line_no)?;

            if let Some(ip) = ctx.static_ip {
                if state.ip_to_imsi.insert(ip, ctx.imsi).is_some() {
                    return Err(HssError::InvalidRecord(format!(
                        "line {line_no}: duplicate static IP {ip}"
                    )));
                }
                debug!(imsi = ctx.imsi, %ip, "static IP address");
            }

            if state.subscribers.insert(ctx.imsi, ctx).is_some() {
                warn!(line_no, "duplicate IMSI, later line wins");
            }
        }

        Ok(state)
    }

    fn render_line(out: &mut String, ctx: &UeContext) {
        let (op_type, op_value) = if ctx.op_configured {
            ("op", &ctx.op)
        } else {
            ("opc", &ctx.opc)
        };
        let ip = match ctx.static_ip {
            Some(ip) => ip.to_string(),
            None => "dynamic".to_string(),
        };
        // Infallible: writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{:015},{},{},{},{},{},{},{}",
            ctx.name,
            ctx.algo.tag(),
            ctx.imsi,
            hex::encode(ctx.key),
            op_type,
            hex::encode(op_value),
            hex::encode(ctx.amf),
            hex::encode(ctx.sqn),
            ctx.qci,
            ip,
        );
    }
}

#[async_trait]
impl UeStore for CsvUeStore {
    async fn init(&self) -> Result<(), HssError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            HssError::StoreUnavailable(format!(
                "failed to open CSV file {}: {e}",
                self.path.display()
            ))
        })?;

        let parsed = self.parse_file(&contents)?;
        info!(
            subscribers = parsed.subscribers.len(),
            static_ips = parsed.ip_to_imsi.len(),
            file = %self.path.display(),
            "loaded UE database"
        );

        *self.state.write().unwrap() = parsed;
        Ok(())
    }

    async fn close(&self) -> Result<(), HssError> {
        let mut out = String::from(FILE_HEADER);
        {
            let state = self.state.read().unwrap();
            for ctx in state.subscribers.values() {
                Self::render_line(&mut out, ctx);
            }
        }
        fs::write(&self.path, out)?;
        info!(file = %self.path.display(), "rewrote UE database");
        Ok(())
    }

    async fn get_ue_ctx(&self, imsi: u64) -> Result<Option<UeContext>, HssError> {
        Ok(self.state.read().unwrap().subscribers.get(&imsi).cloned())
    }

    async fn set_sqn(&self, imsi: u64, sqn: &[u8; SQN_LEN]) -> Result<(), HssError> {
        let mut state = self.state.write().unwrap();
        let ctx = state
            .subscribers
            .get_mut(&imsi)
            .ok_or(HssError::SubscriberNotFound { imsi })?;
        ctx.sqn.copy_from_slice(sqn);
        Ok(())
    }

    async fn set_last_rand(&self, imsi: u64, last_rand: &[u8; RAND_LEN]) -> Result<(), HssError> {
        let mut state = self.state.write().unwrap();
        let ctx = state
            .subscribers
            .get_mut(&imsi)
            .ok_or(HssError::SubscriberNotFound { imsi })?;
        ctx.last_rand.copy_from_slice(last_rand);
        Ok(())
    }

    async fn get_imsi_from_ip(&self, ip: Ipv4Addr) -> Result<Option<u64>, HssError> {
        Ok(self.state.read().unwrap().ip_to_imsi.get(&ip).copied())
    }

    async fn set_imsi_from_ip(&self, ip: Ipv4Addr, imsi: u64) -> Result<(), HssError> {
        let mut state = self.state.write().unwrap();
        if let Some(existing) = state.ip_to_imsi.get(&ip) {
            return Err(HssError::InvalidRecord(format!(
                "IP {ip} already bound to IMSI {existing:015}"
            )));
        }
        state.ip_to_imsi.insert(ip, imsi);
        Ok(())
    }

    async fn allocate_ip_from_imsi(&self, imsi: u64) -> Result<Option<Ipv4Addr>, HssError> {
        let mut state = self.state.write().unwrap();
        for candidate in self.pool.iter() {
            if !state.ip_to_imsi.contains_key(&candidate) {
                state.ip_to_imsi.insert(candidate, imsi);
                debug!(imsi, ip = %candidate, "allocated dynamic IP");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}
