use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{ClientError, FetchError};
use crate::config::ApiConfig;

/// One HTTP GET against the analytics backend.
///
/// Implementations return the decoded JSON body of a 2xx response and map
/// every other outcome into a [`FetchError`]. Retrying and caching happen
/// above this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, FetchError>;
}

/// [`Transport`] over reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    root: Url,
}

impl HttpTransport {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let root = config.api_root()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, root))
    }

    pub fn with_client(client: reqwest::Client, root: Url) -> Self {
        Self { client, root }
    }

    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        let joined = format!("{}{}", self.root.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| FetchError::Network(format!("invalid URL {joined}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        let url = self.url_for(path)?;
        debug!(url = %url, params = params.len(), "GET");

        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), &body));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::MalformedPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    fn transport_for(server: &MockServer) -> HttpTransport {
        let config = ApiConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        HttpTransport::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_appends_prefix_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/events"))
            .and(query_param("companies", "Acme,Globex"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport_for(&server)
            .get(
                "/events",
                &[("companies".to_string(), "Acme,Globex".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/trends"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": "INVALID_DATE", "message": "Invalid start date format" }
            })))
            .mount(&server)
            .await;

        let err = transport_for(&server).get("/trends", &[]).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                status: 400,
                message: "Invalid start date format".into()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = transport_for(&server).get("/metrics", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".into(),
            ..Default::default()
        };
        let err = HttpTransport::from_config(&config)
            .unwrap()
            .get("/metrics", &[])
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
