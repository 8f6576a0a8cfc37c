//! Yandex Maps Geocoder HTTP API client.
//!
//! Sends `GET {base_url}?apikey=...&format=json&geocode=...` and reads the
//! first `featureMember` of the `GeoObjectCollection`. Positions come back
//! as a single `"<longitude> <latitude>"` string.
//!
//! See <https://yandex.ru/dev/geocode/doc/en/>

use async_trait::async_trait;

use crate::{GeocodeError, GeocodedAddress, Geocoder, GeocodingProvider, validated};

/// Geocoder backed by the Yandex HTTP API.
#[derive(Debug, Clone)]
pub struct YandexGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YandexGeocoder {
    /// Creates a client for `base_url` authenticated with `api_key`.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl Geocoder for YandexGeocoder {
    fn name(&self) -> &str {
        "yandex"
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("format", "json"),
                ("geocode", address),
                ("results", "1"),
            ])
            .send()
            .await?;

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

/// Parses a Yandex geocoder JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let members = body
        .pointer("/response/GeoObjectCollection/featureMember")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::malformed("Yandex response missing featureMember array"))?;

    let Some(first) = members.first() else {
        return Ok(None);
    };

    let pos = first
        .pointer("/GeoObject/Point/pos")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| GeocodeError::malformed("GeoObject missing Point.pos"))?;

    let mut parts = pos.split_whitespace().map(str::parse::<f64>);
    let (Some(Ok(lng)), Some(Ok(lat)), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeocodeError::malformed(format!(
            "Point.pos '{pos}' is not '<longitude> <latitude>'"
        )));
    };

    let matched_address = first
        .pointer("/GeoObject/metaDataProperty/GeocoderMetaData/text")
        .and_then(serde_json::Value::as_str)
        .map(String::from);

    Ok(Some(GeocodedAddress {
        coordinate: validated(lat, lng)?,
        matched_address,
        provider: GeocodingProvider::Yandex,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeocodeFailure;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single request on a local port with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/1.x/")
    }

    fn geocoder(base_url: String, api_key: &str) -> YandexGeocoder {
        YandexGeocoder::new(reqwest::Client::new(), base_url, api_key.to_string())
    }

    fn response_with(members: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "response": {
                "GeoObjectCollection": {
                    "metaDataProperty": {
                        "GeocoderResponseMetaData": { "request": "Орёл, Комсомольская 100" }
                    },
                    "featureMember": members
                }
            }
        })
    }

    #[test]
    fn parses_yandex_feature_member() {
        let body = response_with(serde_json::json!([{
            "GeoObject": {
                "metaDataProperty": {
                    "GeocoderMetaData": { "text": "Россия, Орёл, Комсомольская улица, 100" }
                },
                "Point": { "pos": "36.063 52.965" }
            }
        }]));
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinate.latitude() - 52.965).abs() < 1e-9);
        assert!((result.coordinate.longitude() - 36.063).abs() < 1e-9);
        assert_eq!(result.provider, GeocodingProvider::Yandex);
        assert_eq!(
            result.matched_address.as_deref(),
            Some("Россия, Орёл, Комсомольская улица, 100")
        );
    }

    #[test]
    fn parses_yandex_empty() {
        let body = response_with(serde_json::json!([]));
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_missing_collection() {
        let body = serde_json::json!({ "statusCode": 403, "error": "Forbidden" });
        let err = parse_response(&body).unwrap_err();
        assert_eq!(err.reason(), GeocodeFailure::MalformedResponse);
    }

    #[test]
    fn rejects_unparsable_pos() {
        for pos in ["36.063", "east north", "36.063 52.965 10"] {
            let body = response_with(serde_json::json!([{
                "GeoObject": { "Point": { "pos": pos } }
            }]));
            let err = parse_response(&body).unwrap_err();
            assert_eq!(err.reason(), GeocodeFailure::MalformedResponse, "pos: {pos}");
        }
    }

    #[test]
    fn rejects_swapped_axes_out_of_range() {
        let body = response_with(serde_json::json!([{
            "GeoObject": { "Point": { "pos": "37.6 155.7" } }
        }]));
        assert!(parse_response(&body).is_err());
    }

    #[tokio::test]
    async fn resolves_over_http() {
        let base_url = serve_once(
            "200 OK",
            r#"{"response":{"GeoObjectCollection":{"featureMember":[{"GeoObject":{"Point":{"pos":"36.063 52.965"}}}]}}}"#,
        )
        .await;

        let result = geocoder(base_url, "KEY").geocode("Орёл").await.unwrap();

        assert!((result.coordinate.latitude() - 52.965).abs() < 1e-9);
        assert!(result.matched_address.is_none());
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let base_url = serve_once("429 Too Many Requests", "{}").await;

        let err = geocoder(base_url, "KEY").geocode("Орёл").await.unwrap_err();

        assert!(matches!(err, GeocodeError::RateLimited), "{err}");
        assert_eq!(err.reason(), GeocodeFailure::Transport);
    }

    #[tokio::test]
    async fn error_status_is_transport() {
        let base_url = serve_once("500 Internal Server Error", "{}").await;

        let err = geocoder(base_url, "KEY").geocode("Орёл").await.unwrap_err();

        assert!(matches!(err, GeocodeError::Status { status: 500 }), "{err}");
        assert_eq!(err.reason(), GeocodeFailure::Transport);
    }

    #[tokio::test]
    async fn transport_error_hides_api_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = geocoder(format!("http://{addr}/1.x/"), "SECRET_KEY_123")
            .geocode("Орёл")
            .await
            .unwrap_err();

        assert!(matches!(err, GeocodeError::Http(_)), "{err}");
        assert_eq!(err.reason(), GeocodeFailure::Transport);
        assert!(!err.to_string().contains("SECRET_KEY_123"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET_KEY_123"), "{err:?}");
    }
}
