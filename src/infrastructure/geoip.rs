//! GeoIP lookup using a MaxMind GeoLite2/GeoIP2 City database.

use anyhow::{Context, Result};
use maxminddb::{Reader, geoip2};
use std::net::IpAddr;
use std::sync::Arc;

/// Location fields resolved for an IP address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLocation {
    /// ISO country code (e.g., "US", "GB")
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Thread-safe GeoIP lookup service.
///
/// The database is read into memory once at startup and shared between
/// enrichment tasks.
#[derive(Clone)]
pub struct GeoIpService {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoIpService {
    /// Opens a MaxMind City `.mmdb` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid database.
    pub fn open(path: &str) -> Result<Self> {
        let reader = Reader::open_readfile(path)
            .with_context(|| format!("Failed to open GeoIP City database at {}", path))?;

        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Looks up the location of an IP address.
    ///
    /// Private, reserved and unknown addresses yield an empty location.
    pub fn lookup(&self, ip: IpAddr) -> GeoLocation {
        let mut location = GeoLocation::default();

        let Ok(result) = self.reader.lookup(ip) else {
            return location;
        };

        if let Ok(Some(city)) = result.decode::<geoip2::City>() {
            location.country_code = city.country.iso_code.map(|s| s.to_string());
            if let Some(subdivision) = city.subdivisions.first() {
                location.region = subdivision.names.english.map(|s| s.to_string());
            }
            location.city = city.city.names.english.map(|s| s.to_string());
        } else if let Ok(Some(country)) = result.decode::<geoip2::Country>() {
            location.country_code = country.country.iso_code.map(|s| s.to_string());
        }

        location
    }
}
