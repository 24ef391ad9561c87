//! Vendor-name resolution from a hardware address
//!
//! Two interchangeable backends sit behind [`VendorLookup`]: a local JSON
//! prefix database (an object of `{"AA:BB:CC": "Vendor"}` entries covering
//! MA-L, MA-M and MA-S assignment prefixes) and the maclookup.app HTTP
//! API. Both collapse "not found" and every failure mode to `None`; the
//! pipeline turns that into the field placeholder.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Vendor lookup seam consumed by the field pipeline
#[async_trait]
pub trait VendorLookup: Send + Sync {
    /// Vendor name for a full `AA:BB:CC:DD:EE:FF` MAC, if known
    async fn lookup(&self, mac: &str) -> Option<String>;
}

fn clean(vendor: &str) -> Option<String> {
    let vendor = vendor.trim();
    if vendor.is_empty() || vendor.eq_ignore_ascii_case("not found") {
        None
    } else {
        Some(vendor.to_string())
    }
}

/// Local prefix database. Longest assignment wins: MA-S (36-bit), then
/// MA-M (28-bit), then MA-L (24-bit).
pub struct VendorDb {
    prefixes: HashMap<String, String>,
}

impl VendorDb {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(&path)?;
        let prefixes: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                crate::ScanError::ParseError(format!(
                    "Invalid vendor database {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        log::info!("Loaded {} vendor prefixes", prefixes.len());
        Ok(Self { prefixes })
    }

    #[cfg(test)]
    pub fn from_prefixes(prefixes: HashMap<String, String>) -> Self {
        Self { prefixes }
    }
}

#[async_trait]
impl VendorLookup for VendorDb {
    async fn lookup(&self, mac: &str) -> Option<String> {
        let mac = mac.to_uppercase();
        if mac.len() != 17 || !mac.is_ascii() {
            return None;
        }

        [13, 10, 8]
            .iter()
            .find_map(|&len| self.prefixes.get(&mac[..len]))
            .and_then(|vendor| clean(vendor))
    }
}

/// Online lookup against the maclookup.app company-name endpoint
pub struct VendorApi {
    client: reqwest::Client,
}

impl VendorApi {
    pub fn new(request_timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl VendorLookup for VendorApi {
    async fn lookup(&self, mac: &str) -> Option<String> {
        let url = format!("https://api.maclookup.app/v2/macs/{}/company/name", mac);
        let response = self.client.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        clean(&response.text().await.ok()?)
    }
}
