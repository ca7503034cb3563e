//! Address → coordinates lookups.
//!
//! One request per restaurant, issued in sequence. Nothing is cached: the
//! same restaurant on the next page load is looked up again.

use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::data::model::{GeocodedResult, RestaurantRanking};

/// Google Geocoding API, JSON output.
pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("no results for address {0:?}")]
    NotFound(String),

    #[error("geocoding quota exceeded")]
    QuotaExceeded,

    #[error("geocoding request denied: {0}")]
    Denied(String),

    #[error("geocoding failed with status {0}")]
    Status(String),

    #[error("geocoding is not configured")]
    NotConfigured,

    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolves a single-line street address.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<LatLon, GeocodeError>;
}

/// Attach coordinates to each ranking, in order. A failed lookup leaves
/// that row's coordinates null; it never fails the batch.
pub async fn enrich(geocoder: &dyn Geocoder, rankings: Vec<RestaurantRanking>) -> Vec<GeocodedResult> {
    let mut results = Vec::with_capacity(rankings.len());

    for ranking in rankings {
        info!("querying for address {}", ranking.address);
        let location = match geocoder.geocode(&ranking.address).await {
            Ok(loc) => {
                info!("lat, lon = {}, {}", loc.lat, loc.lon);
                Some(loc)
            }
            Err(e) => {
                warn!("no location for {}: {e}", ranking.name);
                None
            }
        };

        results.push(GeocodedResult {
            ranking,
            lat: location.map(|l| l.lat),
            lon: location.map(|l| l.lon),
        });
    }

    results
}

// ---------------------------------------------------------------------------
// Google Geocoding API
// ---------------------------------------------------------------------------

pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<LatLon, GeocodeError> {
        let response: GeocodeResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.first_location(address)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn first_location(self, address: &str) -> Result<LatLon, GeocodeError> {
        match self.status.as_str() {
            "OK" => self
                .results
                .into_iter()
                .next()
                .map(|r| LatLon {
                    lat: r.geometry.location.lat,
                    lon: r.geometry.location.lng,
                })
                .ok_or_else(|| GeocodeError::NotFound(address.to_string())),
            "ZERO_RESULTS" => Err(GeocodeError::NotFound(address.to_string())),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(GeocodeError::QuotaExceeded),
            "REQUEST_DENIED" | "INVALID_REQUEST" => Err(GeocodeError::Denied(
                self.error_message.unwrap_or_else(|| self.status.clone()),
            )),
            _ => Err(GeocodeError::Status(self.status.clone())),
        }
    }
}

/// Stand-in used when no API key is configured: every lookup fails, so the
/// table still renders and the map stays empty.
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> Result<LatLon, GeocodeError> {
        Err(GeocodeError::NotConfigured)
    }
}
