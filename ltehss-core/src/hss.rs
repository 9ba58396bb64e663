//! HSS authentication engine
//!
//! The only externally called component. For each request it fetches a
//! detached subscriber context from the store, dispatches on the
//! configured algorithm, and commits the new SQN and last RAND back
//! through the store before the response leaves the process.

use std::sync::Arc;

use ltehss_common::{HexDump, HssConfig, Plmn};
use ltehss_crypto::kdf;
use ltehss_crypto::milenage::{
    Milenage, AK_LEN, AMF_LEN, MAC_LEN, RAND_LEN, SQN_LEN,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::HssError;
use crate::rng;
use crate::sqn;
use crate::store::{self, UeStore};
use crate::subscriber::{AuthAlgo, UeContext};

/// AUTS resynchronization token size: (SQN_MS ⊕ AK)[6] ‖ MAC_S[8]
pub const AUTS_LEN: usize = 14;

/// EPS authentication vector returned to the MME.
///
/// Only derived values leave the process; the subscriber secrets stay in
/// the store.
#[derive(Debug, Clone)]
pub struct AuthVector {
    /// Fresh 128-bit challenge
    pub rand: [u8; RAND_LEN],
    /// Authentication token: (SQN ⊕ AK) ‖ AMF ‖ MAC
    pub autn: [u8; 16],
    /// Expected response: 8 bytes for MILENAGE, 16 for XOR
    pub xres: Vec<u8>,
    /// Key anchoring the EPS key hierarchy
    pub k_asme: [u8; kdf::K_ASME_LEN],
}

/// The HSS authentication engine.
///
/// One instance owns the subscriber set; the request dispatcher constructs
/// it, calls [`Hss::init`], serves, then [`Hss::close`]s it. Mutating
/// requests are serialized by a short-held lock, which keeps the
/// (SQN-used, SQN-incremented-to, last_rand) tuple linearizable per
/// subscriber.
pub struct Hss {
    store: Arc<dyn UeStore>,
    plmn: Plmn,
    request_lock: Mutex<()>,
}

impl Hss {
    /// Builds the engine and the configured store backend. The store is
    /// opened by [`Hss::init`].
    pub fn new(config: &HssConfig) -> Result<Self, HssError> {
        let store = store::build(config)?;
        Ok(Self {
            store,
            plmn: config.plmn(),
            request_lock: Mutex::new(()),
        })
    }

    /// Opens the subscriber store. Errors here are fatal to startup.
    pub async fn init(&self) -> Result<(), HssError> {
        self.store.init().await?;
        info!(plmn = %self.plmn, "HSS initialized");
        Ok(())
    }

    /// Flushes and releases the subscriber store.
    pub async fn close(&self) -> Result<(), HssError> {
        self.store.close().await
    }

    /// The IMSI↔IP view used by the packet gateway.
    pub fn get_ip_to_imsi(&self) -> Arc<dyn UeStore> {
        Arc::clone(&self.store)
    }

    async fn fetch_ctx(&self, imsi: u64) -> Result<UeContext, HssError> {
        match self.store.get_ue_ctx(imsi).await? {
            Some(ctx) => Ok(ctx),
            None => {
                warn!("user not found at HSS, IMSI {imsi:015}");
                Err(HssError::SubscriberNotFound { imsi })
            }
        }
    }

    /// Produces an EPS authentication vector for `imsi`.
    ///
    /// The new SQN and the issued RAND are persisted before the vector is
    /// returned; if persistence fails the vector is withheld, leaving the
    /// stored state at the pre-request SQN. That desynchronizes nothing
    /// the resync procedure cannot recover.
    pub async fn gen_auth_info_answer(&self, imsi: u64) -> Result<AuthVector, HssError> {
        let _guard = self.request_lock.lock().await;
        debug!("generating auth info answer for IMSI {imsi:015}");

        let ctx = self.fetch_ctx(imsi).await?;
        let rand = rng::generate_rand();

        let sn_id = self.plmn.encode();
        let vector = match ctx.algo {
            AuthAlgo::Milenage => build_milenage_vector(&ctx, &rand, &sn_id),
            AuthAlgo::Xor => build_xor_vector(&ctx, &rand, &sn_id),
        };

        self.store.set_last_rand(imsi, &rand).await?;
        let next_sqn = sqn::increment(&ctx.sqn);
        self.store.set_sqn(imsi, &next_sqn).await?;

        debug!(
            "issued vector for IMSI {imsi:015}: RAND {}, AUTN {}, next SQN {}",
            HexDump(&vector.rand),
            HexDump(&vector.autn),
            HexDump(&next_sqn),
        );
        Ok(vector)
    }

    /// Reports the subscription parameters for an attaching subscriber.
    /// No state change.
    pub async fn gen_update_loc_answer(&self, imsi: u64) -> Result<u8, HssError> {
        let ctx = self.fetch_ctx(imsi).await?;
        info!("update location answer for IMSI {imsi:015}: QCI {}", ctx.qci);
        Ok(ctx.qci)
    }

    /// Recovers from SQN desynchronization using the AUTS token built by
    /// the USIM over the last issued RAND.
    pub async fn resync_sqn(&self, imsi: u64, auts: &[u8; AUTS_LEN]) -> Result<(), HssError> {
        let _guard = self.request_lock.lock().await;
        debug!("re-syncing SQN for IMSI {imsi:015}");

        let ctx = self.fetch_ctx(imsi).await?;
        if ctx.algo == AuthAlgo::Xor {
            warn!("XOR SQN synchronization not supported, IMSI {imsi:015}");
            return Err(HssError::AlgorithmUnsupported);
        }

        let mut sqn_ms_xor_ak = [0u8; SQN_LEN];
        sqn_ms_xor_ak.copy_from_slice(&auts[..SQN_LEN]);
        let mut mac_s = [0u8; MAC_LEN];
        mac_s.copy_from_slice(&auts[SQN_LEN..]);

        let milenage = Milenage::new(&ctx.key, &ctx.opc);
        let ak = milenage.f5_star(&ctx.last_rand);

        let mut sqn_ms = [0u8; SQN_LEN];
        for i in 0..SQN_LEN {
            sqn_ms[i] = sqn_ms_xor_ak[i] ^ ak[i];
        }

        // f1* takes a dummy AMF of zeros during resync (TS 33.102 §6.3.3)
        let expected_mac_s = milenage.f1_star(&ctx.last_rand, &sqn_ms, &[0u8; AMF_LEN]);
        if !macs_equal(&expected_mac_s, &mac_s) {
            warn!("AUTS MAC-S mismatch, IMSI {imsi:015}");
            return Err(HssError::AuthFailure);
        }

        debug!(
            "accepted SQN from UE for IMSI {imsi:015}: SQN_MS {}, SQN_HE {}",
            HexDump(&sqn_ms),
            HexDump(&ctx.sqn),
        );

        self.store.set_sqn(imsi, &sqn_ms).await?;
        let next_sqn = sqn::increment_seq(&sqn_ms);
        self.store.set_sqn(imsi, &next_sqn).await?;
        Ok(())
    }
}

/// Constant-time MAC comparison.
fn macs_equal(a: &[u8; MAC_LEN], b: &[u8; MAC_LEN]) -> bool {
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// MILENAGE vector assembly (TS 33.401):
/// AUTN = (SQN ⊕ AK) ‖ AMF ‖ MAC-A, K_ASME = KDF(CK, IK, SQN ⊕ AK, SN id).
fn build_milenage_vector(ctx: &UeContext, rand: &[u8; RAND_LEN], sn_id: &[u8; 3]) -> AuthVector {
    let milenage = Milenage::new(&ctx.key, &ctx.opc);
    let (xres, ck, ik, ak) = milenage.f2345(rand);
    let mac = milenage.f1(rand, &ctx.sqn, &ctx.amf);

    let mut sqn_xor_ak = [0u8; SQN_LEN];
    for i in 0..SQN_LEN {
        sqn_xor_ak[i] = ctx.sqn[i] ^ ak[i];
    }

    let k_asme = kdf::derive_k_asme(&ck, &ik, &sqn_xor_ak, sn_id);

    let mut autn = [0u8; 16];
    autn[..6].copy_from_slice(&sqn_xor_ak);
    autn[6..8].copy_from_slice(&ctx.amf);
    autn[8..].copy_from_slice(&mac);

    AuthVector {
        rand: *rand,
        autn,
        xres: xres.to_vec(),
        k_asme,
    }
}

/// XOR test-algorithm vector assembly (TS 35.207 test-set style, kept for
/// interop with reference handsets). XRES is the full 16-byte XDOUT.
fn build_xor_vector(ctx: &UeContext, rand: &[u8; RAND_LEN], sn_id: &[u8; 3]) -> AuthVector {
    let mut xdout = [0u8; 16];
    for i in 0..16 {
        xdout[i] = ctx.key[i] ^ rand[i];
    }

    let mut ck = [0u8; 16];
    let mut ik = [0u8; 16];
    for i in 0..16 {
        ck[i] = xdout[(i + 1) % 16];
        ik[i] = xdout[(i + 2) % 16];
    }
    let mut ak = [0u8; AK_LEN];
    ak.copy_from_slice(&xdout[3..9]);

    // CDOUT = SQN ‖ AMF, MAC = XDOUT ⊕ CDOUT over the first 8 bytes
    let mut cdout = [0u8; 8];
    cdout[..6].copy_from_slice(&ctx.sqn);
    cdout[6..].copy_from_slice(&ctx.amf);
    let mut mac = [0u8; MAC_LEN];
    for i in 0..MAC_LEN {
        mac[i] = xdout[i] ^ cdout[i];
    }

    let mut sqn_xor_ak = [0u8; SQN_LEN];
    for i in 0..SQN_LEN {
        sqn_xor_ak[i] = ctx.sqn[i] ^ ak[i];
    }

    let k_asme = kdf::derive_k_asme(&ck, &ik, &sqn_xor_ak, sn_id);

    let mut autn = [0u8; 16];
    autn[..6].copy_from_slice(&sqn_xor_ak);
    autn[6..8].copy_from_slice(&ctx.amf);
    autn[8..].copy_from_slice(&mac);

    AuthVector {
        rand: *rand,
        autn,
        xres: xdout.to_vec(),
        k_asme,
    }
}
