// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn, Instrument};
use url::Url;

use super::types::{
    ClaimRequest, CrossChainQuoteRequest, CrossChainTransferRequest, Quote, RedeemRequest,
    SwapInstructionRequest, SwapQuoteRequest, TransactionPayload,
};
use crate::backends::{http_client, retry_after_secs};
use crate::error::{RelayError, Result};
use crate::spans;
use crate::traits::SwapApi;

/// Environment variable holding the API base URL.
pub const SWAP_API_URL_ENV: &str = "SWAP_API_URL";
/// Environment variable holding the API key.
pub const SWAP_API_KEY_ENV: &str = "SWAP_API_KEY";

const API_KEY_HEADER: &str = "x-api-key";
const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 2;

/// Instruction endpoints wrap the payload.
#[derive(Debug, Deserialize)]
struct InstructionResponse {
    transaction: TransactionPayload,
}

/// HTTP client for the swap-aggregation API.
///
/// # Examples
///
/// ```rust,no_run
/// use swap_relay_rs::{Chain, SwapApi, SwapApiClient, SwapQuoteRequest};
///
/// # async fn example() -> swap_relay_rs::Result<()> {
/// let client = SwapApiClient::builder()
///     .base_url("https://api.example-aggregator.xyz")
///     .api_key("secret")
///     .build();
///
/// let quote = client
///     .swap_quote(&SwapQuoteRequest {
///         chain: Chain::Solana,
///         input_token: "So11111111111111111111111111111111111111112".to_string(),
///         output_token: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
///         amount: "1000000000".to_string(),
///         slippage_bps: 50,
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SwapApiClient {
    #[builder(into)]
    base_url: String,

    #[builder(into)]
    api_key: String,

    #[builder(default = http_client())]
    client: Client,

    /// 429 responses absorbed per request before giving up.
    #[builder(default = 3)]
    max_rate_limit_retries: u32,
}

impl SwapApiClient {
    /// Builds a client from `SWAP_API_URL` and `SWAP_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| RelayError::InvalidConfig(format!("{name} is not set")))
        };
        Ok(Self::builder()
            .base_url(var(SWAP_API_URL_ENV)?)
            .api_key(var(SWAP_API_KEY_ENV)?)
            .build())
    }

    /// Constructs the endpoint URL, with `query` encoded as query pairs.
    ///
    /// `path` is resolved below the base URL, keeping any path prefix the
    /// base carries.
    pub fn endpoint_url<Q: Serialize>(&self, path: &str, query: Option<&Q>) -> Result<Url> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(|e| RelayError::InvalidUrl {
                reason: format!("Failed to construct {path} URL: {e}"),
            })?;

        if let Some(query) = query {
            let serde_json::Value::Object(fields) = serde_json::to_value(query)? else {
                return Err(RelayError::InvalidUrl {
                    reason: format!("query for {path} is not an object"),
                });
            };
            let mut pairs = url.query_pairs_mut();
            for (key, value) in fields {
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::String(s) => {
                        pairs.append_pair(&key, &s);
                    }
                    other => {
                        pairs.append_pair(&key, &other.to_string());
                    }
                }
            }
        }
        Ok(url)
    }

    async fn get<Q: Serialize, T: DeserializeOwned>(&self, path: &str, query: &Q) -> Result<T> {
        let url = self.endpoint_url(path, Some(query))?;
        self.execute(Method::GET, url, |request| request).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url::<()>(path, None)?;
        self.execute(Method::POST, url, |request| request.json(body))
            .await
    }

    /// Sends the request, sleeping through up to `max_rate_limit_retries`
    /// 429 responses.
    async fn execute<T, F>(&self, method: Method, url: Url, prepare: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let span = spans::api_request(method.as_str(), &url);

        async move {
            let mut rate_limited = 0;
            loop {
                let request = self
                    .client
                    .request(method.clone(), url.as_str())
                    .header(API_KEY_HEADER, &self.api_key);
                let response = prepare(request).send().await?;
                let status = response.status();
                tracing::Span::current().record("http.status_code", status.as_u16());

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_seconds =
                        retry_after_secs(&response, DEFAULT_RATE_LIMIT_BACKOFF_SECS);
                    if rate_limited >= self.max_rate_limit_retries {
                        warn!(retries = rate_limited, event = "api_rate_limit_exhausted");
                        return Err(RelayError::RateLimitExceeded {
                            retry_after_seconds,
                        });
                    }
                    rate_limited += 1;
                    debug!(
                        sleep_secs = retry_after_seconds,
                        retry = rate_limited,
                        event = "api_rate_limited"
                    );
                    sleep(Duration::from_secs(retry_after_seconds)).await;
                    continue;
                }

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    warn!(status = status.as_u16(), body = %body, event = "api_request_failed");
                    return Err(RelayError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }

                return Ok(response.json::<T>().await?);
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl SwapApi for SwapApiClient {
    async fn swap_quote(&self, request: &SwapQuoteRequest) -> Result<Quote> {
        self.get("/v1/swapQuote", request).await
    }

    async fn swap_instruction(
        &self,
        request: &SwapInstructionRequest,
    ) -> Result<TransactionPayload> {
        let response: InstructionResponse = self.post("/v1/swapInstruction", request).await?;
        Ok(response.transaction)
    }

    async fn cross_chain_quote(&self, request: &CrossChainQuoteRequest) -> Result<Quote> {
        self.get("/v1/crossChainQuote", request).await
    }

    async fn cross_chain_transfer(
        &self,
        request: &CrossChainTransferRequest,
    ) -> Result<TransactionPayload> {
        let response: InstructionResponse = self.post("/v1/crossChainTransfer", request).await?;
        Ok(response.transaction)
    }

    async fn claim(&self, request: &ClaimRequest) -> Result<TransactionPayload> {
        let response: InstructionResponse = self.post("/v1/claim", request).await?;
        Ok(response.transaction)
    }

    async fn redeem(&self, request: &RedeemRequest) -> Result<TransactionPayload> {
        let response: InstructionResponse = self.post("/v1/redeem", request).await?;
        Ok(response.transaction)
    }
}
