use crate::config::QuoteApiConfig;
use crate::quotes::errors::FetchError;
use crate::quotes::models::QuoteRecord;
use reqwest::StatusCode;

/// Quote fetcher port - one request per symbol
#[async_trait::async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Fetch the latest quote for a single symbol
    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError>;
}

/// HTTP client for the Finnhub `/quote` endpoint
pub struct FinnhubClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl FinnhubClient {
    /// Build a client with the configured per-request timeout
    pub fn new(config: &QuoteApiConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }
}

impl std::fmt::Debug for FinnhubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinnhubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl QuoteFetcher for FinnhubClient {
    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("symbol", symbol), ("token", self.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_quote(&body)
    }
}

/// Decode a 200 body into a quote
///
/// Serde also accepts arrays for structs (fields by position), so the
/// payload must be checked to be an object first.
fn parse_quote(body: &str) -> Result<QuoteRecord, FetchError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if !value.is_object() {
        return Err(FetchError::Decode(format!(
            "expected a JSON object, got: {}",
            body.chars().take(200).collect::<String>()
        )));
    }

    serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_secs: u64) -> FinnhubClient {
        FinnhubClient::new(&QuoteApiConfig {
            base_url: format!("{}/api/v1/quote", server.uri()),
            token: "test-token".to_string(),
            timeout_secs,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_symbol_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/quote"))
            .and(query_param("symbol", "AAPL"))
            .and(query_param("token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"o":150,"h":155,"l":149,"c":152,"pc":151,"d":1,"dp":0.66,"t":1700000000}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let quote = client_for(&server, 10).fetch("AAPL").await.unwrap();

        assert_eq!(quote.open, Some(dec!(150)));
        assert_eq!(quote.high, Some(dec!(155)));
        assert_eq!(quote.low, Some(dec!(149)));
        assert_eq!(quote.close, Some(dec!(152)));
        assert_eq!(quote.prev_close, Some(dec!(151)));
    }

    #[tokio::test]
    async fn test_non_200_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let err = client_for(&server, 10).fetch("AAPL").await.unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_success_codes_are_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = client_for(&server, 10).fetch("AAPL").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_missing_fields_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"c":0,"pc":null}"#))
            .mount(&server)
            .await;

        let quote = client_for(&server, 10).fetch("NOPE").await.unwrap();
        assert_eq!(quote.close, Some(dec!(0)));
        assert_eq!(quote.prev_close, None);
        assert_eq!(quote.open, None);
    }

    #[tokio::test]
    async fn test_non_object_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, 10).fetch("AAPL").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_array_body_is_decode_error() {
        for body in ["[]", "[150,155,149,152,151]"] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&server)
                .await;

            let err = client_for(&server, 10).fetch("AAPL").await.unwrap_err();
            assert!(matches!(err, FetchError::Decode(_)), "body {body} gave {err:?}");
        }
    }

    #[test]
    fn test_parse_quote_rejects_scalars_and_bad_values() {
        assert!(matches!(parse_quote("152.5"), Err(FetchError::Decode(_))));
        assert!(matches!(parse_quote("null"), Err(FetchError::Decode(_))));
        assert!(matches!(parse_quote(r#"{"c":"abc"}"#), Err(FetchError::Decode(_))));
        assert_eq!(parse_quote("{}").unwrap(), QuoteRecord::default());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 1).fetch("AAPL").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = FinnhubClient::new(&QuoteApiConfig {
            base_url: "http://127.0.0.1:1/api/v1/quote".to_string(),
            token: "test-token".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        let err = client.fetch("AAPL").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_debug_hides_token() {
        let client = FinnhubClient::new(&QuoteApiConfig {
            token: "very-secret".to_string(),
            ..QuoteApiConfig::default()
        })
        .unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
