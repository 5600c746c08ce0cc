use crate::domain::model::{Coordinates, RouteMeasurement, TravelDuration};
use crate::domain::ports::RoutingProvider;
use crate::utils::error::{FareError, Result, RoutingError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DISTANCE_MATRIX_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

// --- Distance Matrix response shapes ---

#[derive(Deserialize, Debug)]
pub struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

#[derive(Deserialize, Debug)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Deserialize, Debug)]
pub struct MatrixElement {
    pub status: String,
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

#[derive(Deserialize, Debug)]
pub struct TextValue {
    pub value: f64,
    #[serde(default)]
    pub text: Option<String>,
}

const RATE_LIMIT_STATUSES: [&str; 2] = ["OVER_QUERY_LIMIT", "OVER_DAILY_LIMIT"];

pub struct GoogleDistanceMatrixProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GoogleDistanceMatrixProvider {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FareError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    fn parse(text: &str) -> std::result::Result<RouteMeasurement, RoutingError> {
        let body: DistanceMatrixResponse = serde_json::from_str(text)?;

        if RATE_LIMIT_STATUSES.contains(&body.status.as_str()) {
            return Err(RoutingError::RateLimited);
        }
        if body.status != "OK" {
            return Err(RoutingError::ApiError {
                status: body.status,
                message: body.error_message.unwrap_or_default(),
            });
        }

        let element = body
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(|| RoutingError::Malformed("response has no elements".to_string()))?;

        if RATE_LIMIT_STATUSES.contains(&element.status.as_str()) {
            return Err(RoutingError::RateLimited);
        }
        if element.status != "OK" {
            return Err(RoutingError::ApiError {
                status: element.status,
                message: "no route between the requested points".to_string(),
            });
        }

        let distance = element
            .distance
            .ok_or_else(|| RoutingError::Malformed("element has no distance".to_string()))?;

        Ok(RouteMeasurement {
            distance_meters: distance.value,
            duration: element.duration.map(|duration| TravelDuration {
                seconds: duration.value.max(0.0).round() as u64,
                text: duration.text,
            }),
        })
    }
}

#[async_trait]
impl RoutingProvider for GoogleDistanceMatrixProvider {
    fn name(&self) -> &str {
        "google-distance-matrix"
    }

    async fn measure(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> std::result::Result<RouteMeasurement, RoutingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RoutingError::NotConfigured("missing API key".to_string()))?;

        tracing::debug!("Making Distance Matrix request to: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin.to_query_value()),
                ("destinations", destination.to_query_value()),
                ("mode", "driving".to_string()),
                ("units", "metric".to_string()),
                ("key", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Distance Matrix response status: {}", status);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }
        if !status.is_success() {
            return Err(RoutingError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await?;
        Self::parse(&text).map_err(|e| {
            tracing::debug!("Unusable Distance Matrix response ({}). Body: {}", e, text);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const MATRIX_PATH: &str = "/maps/api/distancematrix/json";

    fn ok_body() -> serde_json::Value {
        serde_json::json!({
            "status": "OK",
            "origin_addresses": ["Basey, Samar"],
            "destination_addresses": ["Amandayehan, Basey, Samar"],
            "rows": [{
                "elements": [{
                    "status": "OK",
                    "distance": {"text": "6.4 km", "value": 6420},
                    "duration": {"text": "12 mins", "value": 716}
                }]
            }]
        })
    }

    fn provider(server: &MockServer, key: Option<&str>) -> GoogleDistanceMatrixProvider {
        GoogleDistanceMatrixProvider::new(
            server.url(MATRIX_PATH),
            key.map(str::to_string),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_measure_successful_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path(MATRIX_PATH)
                .query_param("origins", "11.2806,125.0683")
                .query_param("destinations", "11.2589,125.1187")
                .query_param("mode", "driving")
                .query_param("key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(ok_body());
        });

        let measurement = provider(&server, Some("test-key"))
            .measure(
                Coordinates::new(11.2806, 125.0683),
                Coordinates::new(11.2589, 125.1187),
            )
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(measurement.distance_meters, 6420.0);
        let duration = measurement.duration.unwrap();
        assert_eq!(duration.seconds, 716);
        assert_eq!(duration.text.as_deref(), Some("12 mins"));
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_out() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path(MATRIX_PATH);
            then.status(200).json_body(ok_body());
        });

        let result = provider(&server, Some("  "))
            .measure(Coordinates::new(10.0, 125.0), Coordinates::new(10.1, 125.0))
            .await;

        assert!(matches!(result, Err(RoutingError::NotConfigured(_))));
        api_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(MATRIX_PATH);
            then.status(500);
        });

        let result = provider(&server, Some("k"))
            .measure(Coordinates::new(10.0, 125.0), Coordinates::new(10.1, 125.0))
            .await;

        assert!(matches!(result, Err(RoutingError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_quota_status_is_rate_limit() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(MATRIX_PATH);
            then.status(200).json_body(serde_json::json!({
                "status": "OVER_QUERY_LIMIT",
                "error_message": "You have exceeded your rate-limit for this API.",
                "rows": []
            }));
        });

        let result = provider(&server, Some("k"))
            .measure(Coordinates::new(10.0, 125.0), Coordinates::new(10.1, 125.0))
            .await;

        assert!(matches!(result, Err(RoutingError::RateLimited)));
    }

    #[test]
    fn test_parse_request_denied() {
        let result = GoogleDistanceMatrixProvider::parse(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "rows": []}"#,
        );
        match result {
            Err(RoutingError::ApiError { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_zero_results_element() {
        let result = GoogleDistanceMatrixProvider::parse(
            r#"{"status": "OK", "rows": [{"elements": [{"status": "ZERO_RESULTS"}]}]}"#,
        );
        assert!(matches!(result, Err(RoutingError::ApiError { .. })));
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(matches!(
            GoogleDistanceMatrixProvider::parse(r#"{"status": "OK", "rows": []}"#),
            Err(RoutingError::Malformed(_))
        ));
        assert!(matches!(
            GoogleDistanceMatrixProvider::parse("<html>502 Bad Gateway</html>"),
            Err(RoutingError::ParseError(_))
        ));
    }
}
