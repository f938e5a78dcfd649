use crate::adapters::auth::{AuthClient, Session};
use crate::config::AppConfig;
use crate::domain::model::{CustomerPage, PropertyPage};
use crate::domain::ports::TokenSource;
use crate::utils::error::{ReportError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

const TENANT_HEADER: &str = "tenantId";

/// Authenticated access to the vendor REST API.
///
/// Every request carries the bearer token and tenant header. A 401 is
/// answered with exactly one token refresh and resend; a second 401 is
/// returned as `HttpError`.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tenant_id: String,
    session: Session,
}

impl ApiClient {
    pub fn new(
        client: Client,
        config: &AppConfig,
        token_source: Arc<dyn TokenSource>,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ReportError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: config.base_url.clone(),
                reason: "Not a usable base URL".to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            tenant_id: config.tenant_id.clone(),
            session: Session::new(token_source, config.cache_tokens),
        })
    }

    /// Builds the shared HTTP client (with the configured timeout) and the
    /// credential exchange behind it.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let auth = AuthClient::new(
            client.clone(),
            &config.base_url,
            config.client_id.clone(),
            config.client_secret.clone(),
            config.token_ttl()?,
        );

        Self::new(client, config, Arc::new(auth))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `GET /v1/customers?page=N&limit=L`
    pub async fn customers_page(&self, page: u32, limit: u32) -> Result<CustomerPage> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        self.get_json(self.endpoint(&["v1", "customers"])?, &query).await
    }

    /// `GET /v1/customers/{id}/properties`, optionally with `include_addresses=true`.
    pub async fn customer_properties(
        &self,
        customer_id: &str,
        include_addresses: bool,
    ) -> Result<PropertyPage> {
        let url = self.properties_url(customer_id)?;
        if include_addresses {
            let query = [("include_addresses", "true".to_string())];
            self.get_json(url, &query).await
        } else {
            self.get_json(url, &[]).await
        }
    }

    /// The id is pushed as one escaped path segment.
    pub(crate) fn properties_url(&self, customer_id: &str) -> Result<Url> {
        self.endpoint(&["v1", "customers", customer_id, "properties"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReportError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: self.base_url.to_string(),
                reason: "Not a usable base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut token = self.session.token().await?;
        let mut refreshed = false;

        loop {
            tracing::debug!("📡 GET {} {:?}", url, query);

            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&token)
                .header(TENANT_HEADER, &self.tenant_id)
                .query(query)
                .send()
                .await?;

            let status = response.status();
            tracing::debug!("📡 {} -> {}", url, status);

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                tracing::warn!("Auth token expired while fetching {}. Refreshing token...", url);
                token = self.session.refresh(&token).await?;
                refreshed = true;
                continue;
            }

            if !status.is_success() {
                return Err(ReportError::HttpError {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            return Ok(response.json().await?);
        }
    }
}
