//! Pluggable subscriber persistence
//!
//! Three backends with identical observable behavior: a CSV flat file, a
//! MySQL table and a PostgreSQL table. The store is the single source of
//! truth for subscriber state; every SQN change taken by the engine must
//! flow through [`UeStore::set_sqn`] before a response leaves the process.

pub mod csv;
pub mod mysql;
pub mod postgres;

use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use ltehss_common::{HssConfig, UeStoreKind};
use ltehss_crypto::milenage::{RAND_LEN, SQN_LEN};

use crate::error::HssError;
use crate::subscriber::UeContext;

use self::csv::CsvUeStore;
use self::mysql::MysqlUeStore;
use self::postgres::PostgresUeStore;

/// Inclusive IPv4 range from which dynamic UE addresses are allocated.
#[derive(Debug, Clone, Copy)]
pub struct IpPool {
    /// First allocatable address
    pub start: Ipv4Addr,
    /// Last allocatable address (inclusive)
    pub end: Ipv4Addr,
}

impl IpPool {
    /// Iterates the pool from the lowest address upwards.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        (u32::from(self.start)..=u32::from(self.end)).map(Ipv4Addr::from)
    }
}

/// Abstract subscriber store.
///
/// `init` errors are fatal to startup; request-time errors abort the
/// response. [`UeStore::get_ue_ctx`] hands out a detached copy of the
/// record; mutations are committed through the setter methods.
#[async_trait]
pub trait UeStore: Send + Sync {
    /// Opens the underlying medium and populates the in-memory indices.
    async fn init(&self) -> Result<(), HssError>;

    /// Flushes (file backend) and releases the medium.
    async fn close(&self) -> Result<(), HssError>;

    /// Returns a by-value copy of the subscriber record, if present.
    async fn get_ue_ctx(&self, imsi: u64) -> Result<Option<UeContext>, HssError>;

    /// Persists a new SQN for this IMSI. All six bytes are written.
    /// Idempotent with respect to the same value.
    async fn set_sqn(&self, imsi: u64, sqn: &[u8; SQN_LEN]) -> Result<(), HssError>;

    /// Persists the most recent RAND challenge. The file backend keeps it
    /// in memory only; the SQL backends update the `last_rand` column.
    async fn set_last_rand(&self, imsi: u64, last_rand: &[u8; RAND_LEN]) -> Result<(), HssError>;

    /// Looks up the IMSI bound to an IP address.
    async fn get_imsi_from_ip(&self, ip: Ipv4Addr) -> Result<Option<u64>, HssError>;

    /// Binds `ip` to `imsi`. Fails if the address is already bound.
    async fn set_imsi_from_ip(&self, ip: Ipv4Addr, imsi: u64) -> Result<(), HssError>;

    /// Binds and returns the lowest unbound address of the configured
    /// pool, or `None` if the pool is exhausted.
    async fn allocate_ip_from_imsi(&self, imsi: u64) -> Result<Option<Ipv4Addr>, HssError>;
}

/// Builds the store selected by the configuration. The returned store is
/// not yet initialized; call [`UeStore::init`] before serving requests.
pub fn build(config: &HssConfig) -> Result<Arc<dyn UeStore>, HssError> {
    let pool = IpPool {
        start: config.ip_pool_start,
        end: config.ip_pool_end,
    };

    match config.ue_store {
        UeStoreKind::Csv => {
            let path = config.db_file.clone().ok_or_else(|| {
                HssError::StoreUnavailable("csv backend selected without db_file".into())
            })?;
            Ok(Arc::new(CsvUeStore::new(path, pool)))
        }
        UeStoreKind::Mysql => Ok(Arc::new(MysqlUeStore::from_config(config, pool)?)),
        UeStoreKind::Postgresql => Ok(Arc::new(PostgresUeStore::from_config(config, pool)?)),
    }
}
