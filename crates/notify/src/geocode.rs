//! Best-effort city/country geocoding.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use dovic_tracking::Coordinates;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(String),

    #[error("geocoding response was malformed: {0}")]
    Malformed(String),
}

/// Resolves a city/country pair into coordinates.
///
/// Best-effort by contract: `Ok(None)` means the location could not be
/// resolved; errors are for transport-level failures. Callers treat both the
/// same way (null coordinates) and never abort the operation being enriched.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, city: &str, country: &str)
    -> Result<Option<Coordinates>, GeocodeError>;
}

/// A geocoder that never resolves anything. Used in tests and as the
/// degraded-mode fallback when no geocoding endpoint is configured.
#[derive(Debug, Default)]
pub struct NullGeocoder;

#[async_trait]
impl Geocoder for NullGeocoder {
    async fn geocode(
        &self,
        _city: &str,
        _country: &str,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

fn parse_hits(hits: &[NominatimHit]) -> Result<Option<Coordinates>, GeocodeError> {
    let Some(first) = hits.first() else {
        return Ok(None);
    };
    let lat: f64 = first
        .lat
        .parse()
        .map_err(|e| GeocodeError::Malformed(format!("lat: {e}")))?;
    let lng: f64 = first
        .lon
        .parse()
        .map_err(|e| GeocodeError::Malformed(format!("lon: {e}")))?;
    Ok(Some(Coordinates { lat, lng }))
}

/// OpenStreetMap Nominatim client (free, no API key).
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub const DEFAULT_BASE_URL: &'static str = "https://nominatim.openstreetmap.org";
    const USER_AGENT: &'static str = "dovic-express/1.0 (admin@dovicexpress.com)";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(
        &self,
        city: &str,
        country: &str,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        if city.trim().is_empty() || country.trim().is_empty() {
            return Ok(None);
        }

        let url = format!("{}/search", self.base_url);
        let query = format!("{city}, {country}");
        let hits: Vec<NominatimHit> = self
            .client
            .get(url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Malformed(e.to_string()))?;

        parse_hits(&hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hit_list_resolves_to_none() {
        assert_eq!(parse_hits(&[]).unwrap(), None);
    }

    #[test]
    fn first_hit_is_parsed_as_coordinates() {
        let hits: Vec<NominatimHit> = serde_json::from_str(
            r#"[{"lat": "6.4550575", "lon": "3.3941795"}, {"lat": "0", "lon": "0"}]"#,
        )
        .unwrap();
        let coords = parse_hits(&hits).unwrap().unwrap();
        assert!((coords.lat - 6.4550575).abs() < 1e-9);
        assert!((coords.lng - 3.3941795).abs() < 1e-9);
    }

    #[test]
    fn non_numeric_coordinates_are_malformed() {
        let hits: Vec<NominatimHit> =
            serde_json::from_str(r#"[{"lat": "abc", "lon": "3.39"}]"#).unwrap();
        assert!(matches!(
            parse_hits(&hits),
            Err(GeocodeError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn null_geocoder_always_yields_none() {
        let g = NullGeocoder;
        assert_eq!(g.geocode("Lagos", "Nigeria").await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_location_short_circuits_without_network() {
        let g = NominatimGeocoder::with_base_url("http://127.0.0.1:1");
        assert_eq!(g.geocode("", "Nigeria").await.unwrap(), None);
        assert_eq!(g.geocode("Lagos", " ").await.unwrap(), None);
    }
}
