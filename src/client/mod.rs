//! Catalog API client.
//!
//! [`CatalogClient`] wraps every outbound call to the remote parts catalog.
//! Its methods are split by concern:
//! - [`auth`] - login and VIN decode
//! - [`catalog`] - category tree, manufacturers, part fitments, part detail
//!
//! The export engine only depends on the narrow [`CatalogSource`] trait, so it
//! can be driven by a scripted source in tests.

mod auth;
mod catalog;


use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::{ApiConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::session::SessionContext;
use crate::types::{CatalogScope, Ccl, ManufacturerRecord, Part};

/// The two catalog queries the export pipeline issues per group
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Manufacturers (with their brands) offering parts for `scope`
    async fn manufacturers(
        &self,
        session: &SessionContext,
        scope: &CatalogScope,
    ) -> Result<Vec<ManufacturerRecord>>;

    /// Part fitments for `scope`, restricted to the brands in `ccl`
    async fn part_fitments(
        &self,
        session: &SessionContext,
        scope: &CatalogScope,
        ccl: &Ccl,
    ) -> Result<Vec<Part>>;
}

/// HTTP client for the remote parts catalog
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    api: ApiConfig,
    retry: RetryConfig,
}

impl CatalogClient {
    /// Create a client for the configured catalog service
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(api: ApiConfig, retry: RetryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(api.timeout)
            .user_agent(api.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, api, retry })
    }

    /// The API settings this client was built with
    pub fn api_config(&self) -> &ApiConfig {
        &self.api
    }

    fn url(&self, path_and_query: &str) -> String {
        format!(
            "{}/api/{}",
            self.api.base_url.trim_end_matches('/'),
            path_and_query
        )
    }

    /// A GET carrying the bearer token, language, and vehicle configuration
    fn authed_get(&self, url: &str, session: &SessionContext) -> RequestBuilder {
        self.http
            .get(url)
            .bearer_auth(&session.token)
            .header("Accept-Language", &self.api.accept_language)
            .header("X-Vehicle-Configuration", &session.vehicle_config)
    }

    /// Send a request (with retry) and decode its JSON body
    ///
    /// `build` is called once per attempt. HTTP 401 maps to
    /// [`Error::SessionExpired`], any other non-success status to [`Error::Api`].
    async fn send_json<T, F>(&self, context: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let body = with_retry(&self.retry, || {
            let request = build();
            async move { read_body(context, request).await }
        })
        .await?;

        serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("{} returned malformed JSON: {}", context, e)))
    }
}

async fn read_body(context: &str, request: RequestBuilder) -> Result<String> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!(context, "catalog API rejected the session token");
        return Err(Error::SessionExpired);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            context: context.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.text().await?)
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn manufacturers(
        &self,
        session: &SessionContext,
        scope: &CatalogScope,
    ) -> Result<Vec<ManufacturerRecord>> {
        CatalogClient::manufacturers(self, session, scope).await
    }

    async fn part_fitments(
        &self,
        session: &SessionContext,
        scope: &CatalogScope,
        ccl: &Ccl,
    ) -> Result<Vec<Part>> {
        CatalogClient::part_fitments(self, session, scope, ccl).await
    }
}
