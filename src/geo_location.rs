// Module containing the ipleak.net response structure and field mapping
mod response;

pub use response::IpleakResponse;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use tokio_retry::{Retry, strategy::FixedInterval};
use tracing::{debug, error, info, warn};

use crate::{
    config::{MAX_RETRIES, ProviderConfig},
    error::AppError,
    record::GeoRecord,
};

/// A source of geolocation data for IP addresses.
///
/// Implementations never fail: whatever goes wrong degrades into a record
/// with default fields.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn lookup(&self, ip: &str) -> GeoRecord;
}

/// Geolocation lookups against the ipleak.net JSON API.
#[derive(Debug, Clone)]
pub struct IpleakProvider {
    client: Client,
    config: ProviderConfig,
}

impl IpleakProvider {
    /// Creates a provider with its own HTTP client.
    ///
    /// # Errors
    /// * `InvalidConfig` if the endpoint is not a URL, the timeout is zero,
    ///   the retry budget exceeds `MAX_RETRIES` or the user agent is not a
    ///   valid header value
    /// * `RequestError` if the HTTP client cannot be built
    pub fn new(config: ProviderConfig) -> Result<Self, AppError> {
        Url::parse(&config.endpoint).map_err(|e| {
            AppError::InvalidConfig(format!("endpoint {:?}: {}", config.endpoint, e))
        })?;
        if config.timeout.is_zero() {
            return Err(AppError::InvalidConfig("timeout must be positive".to_string()));
        }
        if config.retries > MAX_RETRIES {
            return Err(AppError::InvalidConfig(format!(
                "retries must be at most {}, got {}",
                MAX_RETRIES, config.retries
            )));
        }
        header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| AppError::InvalidConfig(format!("user agent: {}", e)))?;

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Builds the request URL for an address.
    ///
    /// The address is not validated. IPv6 literals go to the same IPv4 host,
    /// the family is only reported in the logs.
    pub fn url_for(&self, ip: &str) -> String {
        let family = if ip.contains(':') { "ipv6" } else { "ipv4" };
        debug!(family, "Building ipleak URL for {}", ip);
        format!("{}/{}", self.config.endpoint, ip)
    }

    /// Fetches the response body, retrying transport failures without delay.
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let strategy = FixedInterval::new(Duration::ZERO).take(self.config.retries);
        let attempts = self.config.retries.saturating_add(1);

        Retry::spawn(strategy, || self.fetch_once(url))
            .await
            .map_err(|source| AppError::TransportFailed { attempts, source })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.config.user_agent.as_str())
            .send()
            .await
            .inspect_err(|e| warn!("ipleak request attempt failed: {}", e))?;

        // The body is used whatever the status, an error page simply maps to defaults
        if !response.status().is_success() {
            warn!("ipleak returned non-success status: {}", response.status());
        }

        response.text().await
    }
}

#[async_trait]
impl GeoProvider for IpleakProvider {
    fn name(&self) -> &str {
        "ipleak"
    }

    async fn lookup(&self, ip: &str) -> GeoRecord {
        info!("Fetching geolocation data for ip: {}", ip);
        let url = self.url_for(ip);

        let body = match self.fetch(&url).await {
            Ok(body) => Some(body),
            Err(e) => {
                error!("Failed to fetch geolocation data: {}", e);
                None
            }
        };

        let record = IpleakResponse::parse(body.as_deref()).into_record();
        debug!("Geolocation data for {}: {:?}", ip, record);
        record
    }
}
