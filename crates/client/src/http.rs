use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use crate::Backend;
use crate::schema::{ExtractRequest, ExtractResponse, ModelCatalog};

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests fail after `timeout`. Without one the transport
    /// decides when a request has failed.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Backend for HttpBackend {
    async fn list_models(&self) -> Result<ModelCatalog> {
        let url = format!("{}/api/models", self.base_url);
        debug!(%url, "Requesting model catalog");

        let response = self.client
            .get(&url)
            .send()
            .await
            .context("Failed to send model listing request")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to load models: {}", response.status().as_u16());
        }

        let catalog: ModelCatalog = response
            .json()
            .await
            .context("Failed to parse model catalog")?;

        Ok(catalog)
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        let url = format!("{}/api/extract", self.base_url);
        debug!(%url, model = %request.model_version, chars = request.text.chars().count(), "Submitting text");

        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send extraction request")?;

        if !response.status().is_success() {
            anyhow::bail!("API error: {}", response.status().as_u16());
        }

        let extracted: ExtractResponse = response
            .json()
            .await
            .context("Failed to parse extraction response")?;

        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OrderedMap;
    use axum::{
        Json, Router,
        http::StatusCode,
        routing::{get, post},
    };
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_list_models() {
        let router = Router::new().route(
            "/api/models",
            get(|| async {
                Json(json!({"models": {
                    "v2": {"name": "PII-Shield-v2", "type": "pii_shield"},
                    "v1": {"name": "PII-Shield-v1", "type": "pii_shield"}
                }}))
            }),
        );
        let backend = HttpBackend::new(format!("{}/", serve(router).await));

        let catalog = backend.list_models().await.unwrap();
        let names: Vec<&str> = catalog.models.iter().map(|(_, m)| m.name.as_str()).collect();
        assert_eq!(names, vec!["PII-Shield-v2", "PII-Shield-v1"]);
    }

    #[tokio::test]
    async fn test_list_models_rejects_bad_status_and_body() {
        let router = Router::new()
            .route("/api/models", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let backend = HttpBackend::new(serve(router).await);
        let err = backend.list_models().await.unwrap_err();
        assert!(err.to_string().contains("503"));

        let router = Router::new()
            .route("/api/models", get(|| async { Json(json!({"versions": ["v1"]})) }));
        let backend = HttpBackend::new(serve(router).await);
        assert!(backend.list_models().await.is_err());
    }

    #[tokio::test]
    async fn test_extract_sends_text_and_model() {
        let router = Router::new().route(
            "/api/extract",
            post(|Json(req): Json<ExtractRequest>| async move {
                let mut counts = OrderedMap::new();
                counts.insert("PER", 1);
                Json(ExtractResponse {
                    highlighted_text: Some(format!("<b>{}</b>@{}", req.text, req.model_version)),
                    entity_counts: Some(counts),
                })
            }),
        );
        let backend = HttpBackend::new(serve(router).await);

        let response = backend
            .extract(&ExtractRequest {
                text: "Bond".to_string(),
                model_version: "v1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.highlighted_text.as_deref(), Some("<b>Bond</b>@v1"));
        assert_eq!(response.entity_counts.unwrap().get("PER"), Some(&1));
    }

    #[tokio::test]
    async fn test_extract_tolerates_null_span_list() {
        let router = Router::new().route(
            "/api/extract",
            post(|| async {
                Json(json!({
                    "highlighted_text": "<b>Bond</b>",
                    "entity_counts": {"PER": 1},
                    "entities": null
                }))
            }),
        );
        let backend = HttpBackend::new(serve(router).await);

        let response = backend
            .extract(&ExtractRequest {
                text: "Bond".to_string(),
                model_version: "v1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.highlighted_text.as_deref(), Some("<b>Bond</b>"));
        assert_eq!(response.entity_counts.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_error_carries_status_code() {
        let router = Router::new()
            .route("/api/extract", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let backend = HttpBackend::new(serve(router).await);

        let err = backend
            .extract(&ExtractRequest {
                text: "x".to_string(),
                model_version: "v1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: 500");
    }

    #[tokio::test]
    async fn test_extract_unparseable_body() {
        let router = Router::new().route("/api/extract", post(|| async { "<html>oops</html>" }));
        let backend = HttpBackend::new(serve(router).await);

        let err = backend
            .extract(&ExtractRequest {
                text: "x".to_string(),
                model_version: "v1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to parse extraction response");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::with_timeout(format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        assert!(backend.list_models().await.is_err());
    }
}
