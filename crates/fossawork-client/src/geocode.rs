use std::time::Duration;

use fossawork_core::work_order::WorkOrder;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ClientError;

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Forward geocoder for work-order addresses (Nominatim search API).
///
/// Lookups are deliberately serialized with a fixed inter-call delay to
/// respect the service's usage policy. There is no retry or backoff: a
/// failed lookup is logged and reported as no match.
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("fossawork-client/0.1")
                .build()
                .expect("failed to build reqwest client"),
            base_url: NOMINATIM_BASE_URL.to_string(),
        }
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("fossawork-client/0.1")
                .build()
                .expect("failed to build reqwest client"),
            base_url,
        }
    }

    /// Look up a single address. Returns `None` when the service has no match.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ClientError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: body,
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse geocode response: {e}")))?;

        match places.first() {
            Some(place) => Ok(Some(place.to_coordinates()?)),
            None => Ok(None),
        }
    }

    /// Geocode the addresses of a work-order batch, one request at a time
    /// with `delay` between consecutive requests.
    ///
    /// Orders without an address are skipped entirely. A failed lookup
    /// yields `None` for that order and the loop continues.
    pub async fn geocode_orders(
        &self,
        orders: &[WorkOrder],
        delay: Duration,
    ) -> Vec<(String, Option<Coordinates>)> {
        let mut results = Vec::new();
        let mut first = true;

        for order in orders {
            let Some(address) = order.address.as_deref() else {
                continue;
            };

            if !first {
                tokio::time::sleep(delay).await;
            }
            first = false;

            match self.geocode(address).await {
                Ok(coords) => {
                    debug!("work order {}: geocoded '{address}'", order.id);
                    results.push((order.id.clone(), coords));
                }
                Err(e) => {
                    warn!("work order {}: geocoding '{address}' failed: {e}", order.id);
                    results.push((order.id.clone(), None));
                }
            }
        }

        results
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn to_coordinates(&self) -> Result<Coordinates, ClientError> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|e| ClientError::Parse(format!("invalid latitude '{}': {e}", self.lat)))?;
        let lon: f64 = self
            .lon
            .parse()
            .map_err(|e| ClientError::Parse(format!("invalid longitude '{}': {e}", self.lon)))?;
        Ok(Coordinates { lat, lon })
    }
}
