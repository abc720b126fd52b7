use tracing::{debug, info};

use crate::{
    config::ProviderConfig,
    error::AppError,
    geo_location::{GeoProvider, IpleakProvider},
    record::GeoRecord,
};

/// Tries geolocation providers in a fixed order.
#[derive(Default)]
pub struct GeoResolver {
    providers: Vec<Box<dyn GeoProvider>>,
}

impl GeoResolver {
    pub fn new(providers: Vec<Box<dyn GeoProvider>>) -> Self {
        Self { providers }
    }

    /// The standard provider chain. Currently only ipleak.net.
    pub fn default_providers(config: ProviderConfig) -> Result<Self, AppError> {
        Ok(Self::new(vec![Box::new(IpleakProvider::new(config)?)]))
    }

    /// Appends a provider at the end of the chain.
    pub fn with_provider(mut self, provider: impl GeoProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Returns the first record with a non-empty `ip`.
    ///
    /// When no provider resolves the address, the last record produced is
    /// returned as is, or the default record if the chain is empty.
    pub async fn lookup(&self, ip: &str) -> GeoRecord {
        let mut last = GeoRecord::default();
        for provider in &self.providers {
            let record = provider.lookup(ip).await;
            if record.is_resolved() {
                info!("{} resolved {}", provider.name(), ip);
                return record;
            }
            debug!("{} did not resolve {}", provider.name(), ip);
            last = record;
        }
        last
    }
}
