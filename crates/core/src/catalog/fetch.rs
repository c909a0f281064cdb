use tracing::{debug, info};

use crate::{config::AppConfig, error::CatalogError, models::CatalogItem};

/// Fetches the full catalog from the configured endpoint.
///
/// One GET, no authentication, no pagination, no retry. Failures are
/// flattened into [`CatalogError`] so the UI can show the message as-is.
#[derive(Clone)]
pub struct CatalogFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl CatalogFetcher {
    /// Build a fetcher for the endpoint named in configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.api_url.clone(),
        }
    }

    /// The catalog endpoint this fetcher talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Retrieve the catalog. A single attempt; the caller decides what
    /// a failure means for the session.
    pub async fn fetch(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        debug!(endpoint = %self.endpoint, "requesting catalog");
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|err| CatalogError::Http(err.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|err| CatalogError::Http(err.to_string()))?;

        let items = response
            .json::<Vec<CatalogItem>>()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))?;
        info!(count = items.len(), "catalog fetched");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_endpoint(url: &str) -> AppConfig {
        AppConfig {
            api_url: url.to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn fetcher_uses_configured_endpoint() {
        let config = config_with_endpoint("http://localhost:9/bikes");
        let fetcher = CatalogFetcher::new(&config);
        assert_eq!(fetcher.endpoint(), "http://localhost:9/bikes");
    }

    #[tokio::test]
    async fn unreachable_endpoint_surfaces_http_error() {
        // Port 0 is never routable; the connect error becomes the
        // user-visible message.
        let config = config_with_endpoint("http://127.0.0.1:0/bikes");
        let fetcher = CatalogFetcher::new(&config);
        let err = fetcher.fetch().await.expect_err("connect must fail");
        assert!(matches!(err, CatalogError::Http(_)));
        assert!(!err.message().is_empty());
    }
}
