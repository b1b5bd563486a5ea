//! Geo and device enrichment of click fingerprints.

use std::net::IpAddr;

use crate::domain::entities::{Enrichment, RequestFingerprint};
use crate::domain::enrichment_job::ClickEnricher;
use crate::infrastructure::geoip::GeoIpService;
use crate::utils::user_agent::parse_user_agent;

/// Derives location from the client IP and browser/OS/device from the
/// User-Agent.
///
/// Geo lookup is skipped when no MaxMind database is configured.
pub struct EnrichmentService {
    geoip: Option<GeoIpService>,
}

impl EnrichmentService {
    pub fn new(geoip: Option<GeoIpService>) -> Self {
        Self { geoip }
    }
}

impl ClickEnricher for EnrichmentService {
    fn enrich(&self, fingerprint: &RequestFingerprint) -> Enrichment {
        let mut enrichment = Enrichment::default();

        if let Some(ua) = fingerprint.user_agent.as_deref() {
            let parsed = parse_user_agent(ua);
            enrichment.browser = parsed.browser;
            enrichment.os = parsed.os;
            enrichment.device_category = parsed.device_category;
            enrichment.is_bot = parsed.is_bot;
        }

        if let (Some(geoip), Some(ip)) = (
            &self.geoip,
            fingerprint
                .ip
                .as_deref()
                .and_then(|ip| ip.parse::<IpAddr>().ok()),
        ) {
            let location = geoip.lookup(ip);
            enrichment.country_code = location.country_code;
            enrichment.region = location.region;
            enrichment.city = location.city;
        }

        enrichment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_without_geoip() {
        let service = EnrichmentService::new(None);
        let fingerprint = RequestFingerprint {
            ip: Some("203.0.113.7".to_string()),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            ..Default::default()
        };

        let enrichment = service.enrich(&fingerprint);

        assert_eq!(enrichment.browser.as_deref(), Some("Chrome"));
        assert_eq!(enrichment.device_category.as_deref(), Some("pc"));
        assert!(enrichment.country_code.is_none());
        assert!(enrichment.city.is_none());
    }

    #[test]
    fn test_enrich_empty_fingerprint() {
        let service = EnrichmentService::new(None);

        assert_eq!(
            service.enrich(&RequestFingerprint::default()),
            Enrichment::default()
        );
    }
}
