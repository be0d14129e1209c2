//! HTTP client for the parcel utility resolution service.
//!
//! One operation: `POST {base}/api/v1/parcels/lookup` with a JSON
//! [`LookupPayload`], answered by a [`ParcelUtilityInfo`]. Every non-2xx
//! status, transport failure, or undecodable body is returned as a
//! [`LookupError`]; the client never retries.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use utilix_core::{LookupRequest, ParcelUtilityInfo};

use crate::error::LookupError;

const LOOKUP_PATH: &str = "api/v1/parcels/lookup";

/// Longest error body kept in [`LookupError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Resolves utility availability for a single parcel.
///
/// The batch runner is written against this trait so tests can substitute
/// an in-memory implementation for the HTTP client.
pub trait ParcelLookup {
    fn lookup(
        &self,
        request: &LookupRequest,
    ) -> impl Future<Output = Result<ParcelUtilityInfo, LookupError>> + Send;
}

/// JSON body of a lookup call.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LookupPayload<'a> {
    pub apn: &'a str,
    pub street_address: Option<&'a str>,
    pub county: &'a str,
    pub state: &'a str,
}

impl<'a> From<&'a LookupRequest> for LookupPayload<'a> {
    fn from(request: &'a LookupRequest) -> Self {
        Self {
            apn: &request.apn,
            street_address: request.street_address.as_deref(),
            county: &request.county,
            state: &request.state,
        }
    }
}

/// Client for the resolution service.
///
/// Use [`LookupClient::new`] with the configured base URL; tests point it at
/// a wiremock server the same way.
pub struct LookupClient {
    client: Client,
    lookup_url: Url,
    authorization: String,
}

impl LookupClient {
    /// Creates a client for `base_url` authenticating with `token`.
    ///
    /// A token already carrying the `Bearer` scheme is sent verbatim;
    /// otherwise the scheme is prepended.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LookupError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn new(
        base_url: &str,
        token: &str,
        user_agent: &str,
        timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            lookup_url: Self::lookup_url(base_url)?,
            authorization: authorization_header(token),
        })
    }

    /// Builds `{base}/api/v1/parcels/lookup`, tolerating a trailing slash on
    /// the base.
    fn lookup_url(base_url: &str) -> Result<Url, LookupError> {
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        Url::parse(&normalised)
            .and_then(|base| base.join(LOOKUP_PATH))
            .map_err(|e| LookupError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn post_lookup(&self, request: &LookupRequest) -> Result<ParcelUtilityInfo, LookupError> {
        let payload = LookupPayload::from(request);
        let response = self
            .client
            .post(self.lookup_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.lookup_url.to_string(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LookupError::Deserialize {
            context: format!("lookup(apn={})", request.apn),
            source: e,
        })
    }
}

impl ParcelLookup for LookupClient {
    async fn lookup(&self, request: &LookupRequest) -> Result<ParcelUtilityInfo, LookupError> {
        tracing::debug!(row = request.row_index, apn = %request.apn, "sending parcel lookup");
        self.post_lookup(request).await
    }
}

fn authorization_header(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("Bearer") {
        token.to_owned()
    } else {
        format!("Bearer {token}")
    }
}
