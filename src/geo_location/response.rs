use serde_json::Value;

use crate::record::GeoRecord;

/// Response structure for the ipleak.net JSON endpoint.
///
/// Only the fields the record is built from are kept. Each one stays a raw
/// JSON value so that a field of an unexpected type degrades to its default
/// instead of failing the whole body.
#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct IpleakResponse {
    /// Address the provider resolved
    pub query: Option<Value>,
    pub isp_name: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    /// Autonomous system number, usually sent as a string
    pub as_number: Option<Value>,
    pub time_zone: Option<Value>,
    pub region_name: Option<Value>,
    pub city: Option<Value>,
    pub city_name: Option<Value>,
    pub country_code: Option<Value>,
}

impl IpleakResponse {
    /// Parses a response body without ever failing.
    ///
    /// A missing, empty or malformed body, or one whose top level is not an
    /// object, yields the empty response.
    pub fn parse(body: Option<&str>) -> Self {
        body.and_then(|body| serde_json::from_str::<Value>(body).ok())
            .filter(Value::is_object)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Maps the provider fields onto the normalized record.
    ///
    /// `organization` and `asn_organization` repeat `isp_name`, and `country`
    /// is read from `city_name`.
    pub fn into_record(self) -> GeoRecord {
        GeoRecord {
            ip: text(&self.query),
            isp: text(&self.isp_name),
            organization: text(&self.isp_name),
            latitude: number(&self.latitude),
            longitude: number(&self.longitude),
            asn: integer(&self.as_number),
            asn_organization: text(&self.isp_name),
            timezone: text(&self.time_zone),
            region: text(&self.region_name),
            city: text(&self.city),
            country: text(&self.city_name),
            country_code: text(&self.country_code),
        }
    }
}

// Scalars are rendered as their JSON text, everything else is empty.
fn text(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn number(value: &Option<Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Reads an integer the lenient way: leading digits count, trailing junk is
/// ignored, and anything without digits becomes 0.
fn integer(value: &Option<Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .map(f64::trunc)
                .filter(|f| (i64::MIN as f64..i64::MAX as f64).contains(f))
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => leading_integer(s),
        _ => None,
    }
    .unwrap_or(0)
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
