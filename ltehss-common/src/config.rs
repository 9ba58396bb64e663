//! Configuration structures for the HSS
//!
//! The embedding process (CLI, service wrapper) is responsible for locating
//! the configuration file; this module only defines the record and its
//! validation rules. No environment variables are consulted.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Plmn;

/// Subscriber store backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UeStoreKind {
    /// Flat-file CSV database
    Csv,
    /// MySQL `ue_subscriber` table
    Mysql,
    /// PostgreSQL `ue_subscriber` table
    Postgresql,
}

/// HSS configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HssConfig {
    /// Which subscriber store backend to use
    pub ue_store: UeStoreKind,
    /// Path to the CSV subscriber database (csv backend)
    #[serde(default)]
    pub db_file: Option<PathBuf>,
    /// Database server host (SQL backends)
    #[serde(default)]
    pub db_host: Option<String>,
    /// Database user (SQL backends)
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (SQL backends)
    #[serde(default)]
    pub db_password: Option<String>,
    /// Database name (SQL backends)
    #[serde(default)]
    pub db_database: Option<String>,
    /// Mobile Country Code of the serving network
    pub mcc: u16,
    /// Mobile Network Code of the serving network
    pub mnc: u16,
    /// True if the MNC has 3 digits
    #[serde(default)]
    pub long_mnc: bool,
    /// First address of the dynamic UE address pool
    #[serde(default = "default_ip_pool_start")]
    pub ip_pool_start: Ipv4Addr,
    /// Last address (inclusive) of the dynamic UE address pool
    #[serde(default = "default_ip_pool_end")]
    pub ip_pool_end: Ipv4Addr,
}

fn default_ip_pool_start() -> Ipv4Addr {
    Ipv4Addr::new(172, 16, 0, 2)
}

fn default_ip_pool_end() -> Ipv4Addr {
    Ipv4Addr::new(172, 16, 0, 250)
}

impl HssConfig {
    /// Parses an HSS configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads an HSS configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration to a YAML string.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The serving network identity used for K_ASME derivation.
    pub fn plmn(&self) -> Plmn {
        Plmn::new(self.mcc, self.mnc, self.long_mnc)
    }

    /// Validates the configuration against the selected backend.
    pub fn validate(&self) -> Result<(), Error> {
        if self.mcc == 0 || self.mcc > 999 {
            return Err(Error::Config(format!(
                "invalid MCC {}: must be between 001 and 999",
                self.mcc
            )));
        }
        if self.mnc > 999 {
            return Err(Error::Config(format!(
                "invalid MNC {}: must be between 00 and 999",
                self.mnc
            )));
        }

        match self.ue_store {
            UeStoreKind::Csv => {
                if self.db_file.is_none() {
                    return Err(Error::Config(
                        "csv backend selected but db_file is not set".into(),
                    ));
                }
            }
            UeStoreKind::Mysql | UeStoreKind::Postgresql => {
                for (field, value) in [
                    ("db_host", &self.db_host),
                    ("db_username", &self.db_username),
                    ("db_password", &self.db_password),
                    ("db_database", &self.db_database),
                ] {
                    if value.is_none() {
                        return Err(Error::Config(format!(
                            "SQL backend selected but {field} is not set"
                        )));
                    }
                }
            }
        }

        if u32::from(self.ip_pool_start) > u32::from(self.ip_pool_end) {
            return Err(Error::Config(format!(
                "IP pool start {} is above pool end {}",
                self.ip_pool_start, self.ip_pool_end
            )));
        }

        Ok(())
    }
}
