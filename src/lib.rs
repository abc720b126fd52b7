//! Normalized IP geolocation lookups backed by the ipleak.net JSON API.

pub mod config;
pub mod error;
pub mod geo_location;
pub mod record;
pub mod resolver;

pub use config::ProviderConfig;
pub use error::AppError;
pub use geo_location::{GeoProvider, IpleakProvider};
pub use record::GeoRecord;
pub use resolver::GeoResolver;
