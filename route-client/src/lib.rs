//! A client for the LiFi routing API, used to discover swap routes and to
//! list the networks and tokens a swap may be built from

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]
#![deny(clippy::needless_pass_by_ref_mut)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::unused_async)]

use std::time::Duration;

use api_types::{LifiChainsResponse, LifiRoutesRequest, LifiRoutesResponse, LifiTokensResponse};
use async_trait::async_trait;
use error::RouteClientError;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use swap_executor_api::{
    chain::{Chain, ChainId, Token},
    errors::{DiscoveryError, MetadataError},
    intent::{DiscoveryOptions, SwapIntent},
    interfaces::{MetadataSource, RouteDiscovery},
    route::Route,
};
use tracing::{info, instrument};

pub mod api_types;
pub mod error;

// -------------
// | Constants |
// -------------

/// The base URL for the LiFi API
pub const LIFI_BASE_URL: &str = "https://li.quest/v1";

/// The endpoint for discovering routes
const ROUTES_ENDPOINT: &str = "advanced/routes";
/// The endpoint for listing chains
const CHAINS_ENDPOINT: &str = "chains";
/// The endpoint for listing tokens
const TOKENS_ENDPOINT: &str = "tokens";

/// The LiFi api key header
const LIFI_API_KEY_HEADER: &str = "x-lifi-api-key";

/// The chain family listed by the metadata endpoints
const EVM_CHAIN_TYPE: &str = "EVM";

/// Default timeout for requests to the routing service
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------
// | Types |
// ---------

/// The configuration options for the route client
#[derive(Debug, Clone)]
pub struct RouteClientConfig {
    /// The base URL of the routing service
    pub base_url: String,
    /// The API key sent with each request, if any
    pub api_key: Option<String>,
    /// The options attached to every route discovery request
    pub options: DiscoveryOptions,
    /// The timeout applied to each request
    pub timeout: Duration,
}

impl Default for RouteClientConfig {
    fn default() -> Self {
        Self {
            base_url: LIFI_BASE_URL.to_string(),
            api_key: None,
            options: DiscoveryOptions::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ---------------------
// | Client Definition |
// ---------------------

/// A client for the LiFi routing API
#[derive(Debug, Clone)]
pub struct LifiClient {
    /// The base URL of the routing service, without a trailing slash
    base_url: String,
    /// The API key to use for requests
    api_key: Option<String>,
    /// The options attached to every route discovery request
    options: DiscoveryOptions,
    /// The shared HTTP client used for issuing requests
    http_client: Client,
}

impl LifiClient {
    /// Create a new client from the given config
    pub fn new(config: RouteClientConfig) -> Result<Self, RouteClientError> {
        let RouteClientConfig { base_url, api_key, options, timeout } = config;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RouteClientError::setup(format!("invalid base url: {base_url}")));
        }

        let http_client =
            Client::builder().timeout(timeout).build().map_err(RouteClientError::setup)?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { base_url, api_key, options, http_client })
    }

    /// The options attached to route discovery requests
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Discover routes for the intent, in the order the service returns them
    #[instrument(skip_all, fields(
        from_chain = intent.source_chain,
        to_chain = intent.destination_chain,
        amount = %intent.amount,
    ))]
    pub async fn get_routes(&self, intent: &SwapIntent) -> Result<Vec<Route>, RouteClientError> {
        let body = self.build_routes_request(intent)?;
        let resp: LifiRoutesResponse = self.send_post_request(ROUTES_ENDPOINT, &body).await?;

        let routes: Vec<Route> = resp.routes.into_iter().map(Route::from).collect();
        info!("discovered {} routes", routes.len());
        Ok(routes)
    }

    /// List the supported EVM chains
    #[instrument(skip_all)]
    pub async fn get_chains(&self) -> Result<Vec<Chain>, RouteClientError> {
        let query = [("chainTypes", EVM_CHAIN_TYPE)];
        let resp: LifiChainsResponse = self.send_get_request(CHAINS_ENDPOINT, &query).await?;
        Ok(resp.chains)
    }

    /// List the tokens available on a chain
    #[instrument(skip(self))]
    pub async fn get_tokens(&self, chain_id: ChainId) -> Result<Vec<Token>, RouteClientError> {
        let chain = chain_id.to_string();
        let query = [("chains", chain.as_str())];
        let resp: LifiTokensResponse = self.send_get_request(TOKENS_ENDPOINT, &query).await?;
        Ok(resp.take_chain(chain_id))
    }

    /// Build the body of a routes request, validating the intent first
    pub fn build_routes_request(
        &self,
        intent: &SwapIntent,
    ) -> Result<LifiRoutesRequest, RouteClientError> {
        if intent.amount.is_zero() {
            return Err(RouteClientError::validation("amount must be greater than zero"));
        }
        if intent.sender.is_zero() {
            return Err(RouteClientError::validation("sender address is required"));
        }
        if intent.recipient.is_zero() {
            return Err(RouteClientError::validation("recipient address is required"));
        }

        Ok(LifiRoutesRequest {
            from_chain_id: intent.source_chain,
            to_chain_id: intent.destination_chain,
            from_token_address: intent.source_token,
            to_token_address: intent.destination_token,
            from_amount: intent.amount,
            from_address: intent.sender,
            to_address: intent.recipient,
            options: (&self.options).into(),
        })
    }

    // -----------
    // | Helpers |
    // -----------

    /// Build the full URL of an endpoint
    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Attach the API key to a request, if one is configured
    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(api_key) => request.header(LIFI_API_KEY_HEADER, api_key.as_str()),
            None => request,
        }
    }

    /// Send a get request to the routing service
    async fn send_get_request<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RouteClientError> {
        let request = self.http_client.get(self.build_url(path)).query(query);
        let response = self.with_api_key(request).send().await?;
        handle_http_response(response).await
    }

    /// Send a post request with a JSON body to the routing service
    async fn send_post_request<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RouteClientError> {
        let request = self.http_client.post(self.build_url(path)).json(body);
        let response = self.with_api_key(request).send().await?;
        handle_http_response(response).await
    }
}

#[async_trait]
impl RouteDiscovery for LifiClient {
    async fn discover_routes(&self, intent: &SwapIntent) -> Result<Vec<Route>, DiscoveryError> {
        self.get_routes(intent).await.map_err(DiscoveryError::from)
    }
}

#[async_trait]
impl MetadataSource for LifiClient {
    async fn list_networks(&self) -> Result<Vec<Chain>, MetadataError> {
        self.get_chains().await.map_err(MetadataError::from)
    }

    async fn list_tokens(&self, chain_id: ChainId) -> Result<Vec<Token>, MetadataError> {
        self.get_tokens(chain_id).await.map_err(MetadataError::from)
    }
}

// ----------------------
// | Non-Member Helpers |
// ----------------------

/// Check the status of a response and deserialize its JSON body
async fn handle_http_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, RouteClientError> {
    if !response.status().is_success() {
        let status = response.status();
        let message = response.text().await.map_err(RouteClientError::parsing)?;

        return Err(RouteClientError::http(format!("Status {}: {}", status, message)));
    }

    response.json::<T>().await.map_err(RouteClientError::parsing)
}
