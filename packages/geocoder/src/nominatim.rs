//! Nominatim / OpenStreetMap geocoder client.
//!
//! Keyless fallback for deployments without a Yandex API key. The public
//! instance allows at most **1 request per second** and requires a
//! descriptive `User-Agent`, which [`crate::build_client`] sets.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;

use crate::{GeocodeError, GeocodedAddress, Geocoder, GeocodingProvider, validated};

/// Geocoder backed by a Nominatim free-form search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_codes: Option<String>,
}

impl NominatimGeocoder {
    /// Creates a client for `base_url`, optionally restricted to a
    /// comma-separated list of ISO country codes.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        country_codes: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            country_codes,
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        let mut req = self.client.get(&self.base_url).query(&[
            ("q", address),
            ("format", "jsonv2"),
            ("limit", "1"),
        ]);

        if let Some(codes) = &self.country_codes {
            req = req.query(&[("countrycodes", codes.as_str())]);
        }

        let resp = req.send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)?.ok_or_else(|| GeocodeError::NotFound {
            query: address.to_string(),
        })
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let results = body
        .as_array()
        .ok_or_else(|| GeocodeError::malformed("Nominatim response is not an array"))?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::malformed("Missing lat in Nominatim response"))?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::malformed("Missing lon in Nominatim response"))?;

    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedAddress {
        coordinate: validated(lat, lon)?,
        matched_address: display_name,
        provider: GeocodingProvider::Nominatim,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "52.9650",
            "lon": "36.0630",
            "display_name": "Комсомольская улица, Орёл, Россия"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinate.latitude() - 52.965).abs() < 1e-4);
        assert!((result.coordinate.longitude() - 36.063).abs() < 1e-4);
        assert_eq!(result.provider, GeocodingProvider::Nominatim);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_numeric_lat() {
        let body = serde_json::json!([{ "lat": 52.965, "lon": "36.063" }]);
        assert!(parse_response(&body).is_err());
    }
}
