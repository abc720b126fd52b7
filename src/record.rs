use serde::Serialize;

/// Normalized geolocation result for one IP address.
///
/// Every field falls back to its zero value independently, so a failed lookup
/// has the same shape as a sparse successful one.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct GeoRecord {
    pub ip: String,
    pub isp: String,
    pub organization: String,
    pub latitude: f64,
    pub longitude: f64,
    pub asn: i64,
    pub asn_organization: String,
    pub timezone: String,
    pub region: String,
    pub city: String,
    pub country: String,
    pub country_code: String,
}

impl GeoRecord {
    /// A lookup counts as resolved when the provider echoed back an address.
    pub fn is_resolved(&self) -> bool {
        !self.ip.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_serializes_all_keys_in_order() {
        let json = serde_json::to_string(&GeoRecord::default()).unwrap();
        assert_eq!(
            json,
            r#"{"ip":"","isp":"","organization":"","latitude":0.0,"longitude":0.0,"asn":0,"asn_organization":"","timezone":"","region":"","city":"","country":"","country_code":""}"#
        );
    }

    #[test]
    fn resolved_only_with_ip() {
        let mut record = GeoRecord::default();
        assert!(!record.is_resolved());
        record.ip = "1.2.3.4".to_string();
        assert!(record.is_resolved());
    }
}
