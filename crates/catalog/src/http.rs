use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rocketshoes_core::config::CatalogConfig;
use rocketshoes_core::{LookupError, Product, ProductId, Stock, StockLookup};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("could not build catalog http client: {0}")]
    Build(#[source] reqwest::Error),
}

#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    api_token: Option<SecretString>,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(CatalogClientError::Build)?;

        Ok(Self::with_client(client, &config.base_url, config.api_token.clone()))
    }

    pub fn with_client(client: Client, base_url: &str, api_token: Option<SecretString>) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string(), api_token }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        product_id: ProductId,
    ) -> Result<T, LookupError> {
        let url = format!("{}{path}", self.base_url);
        debug!(event_name = "catalog.request", url = %url, product_id = product_id.0, "catalog lookup");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|error| {
            warn!(
                event_name = "catalog.transport_error",
                url = %url,
                error = %error,
                "catalog request failed"
            );
            LookupError::Transport(error.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(product_id));
        }
        if !status.is_success() {
            warn!(
                event_name = "catalog.unexpected_status",
                url = %url,
                status = %status,
                "catalog returned a non-success status"
            );
            return Err(LookupError::Status { status: status.as_u16(), path: path.to_string() });
        }

        response.json::<T>().await.map_err(|error| LookupError::Decode(error.to_string()))
    }
}

#[async_trait]
impl StockLookup for HttpCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, LookupError> {
        self.get_json(&format!("/stock/{product_id}"), product_id).await
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        self.get_json(&format!("/products/{product_id}"), product_id).await
    }
}
