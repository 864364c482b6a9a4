//! HTTP clients for the price dataset and the search backend.
//!
//! Provides both async and blocking client variants behind feature flags.
//! [`PriceClient`] reads the hosted `PostgREST` price tables;
//! [`SearchClient`] talks to the batch search backend.

use serde::Deserialize;

/// `PostgREST` mount point below the dataset root.
#[cfg(any(feature = "async", feature = "blocking"))]
const REST_PATH: &str = "/rest/v1";

/// Batch search endpoint path.
#[cfg(any(feature = "async", feature = "blocking"))]
const SEARCH_PATH: &str = "/search";

/// Health probe endpoint path.
#[cfg(any(feature = "async", feature = "blocking"))]
const HEALTH_PATH: &str = "/";

/// Error body returned by `PostgREST` and most JSON APIs.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Human-readable message.
    message: Option<String>,
    /// `FastAPI`-style detail field.
    detail: Option<serde_json::Value>,
}

/// Extracts a human-readable message from an error response body.
///
/// Prefers a JSON `message` (`PostgREST`) or `detail` (`FastAPI`) field, then
/// the trimmed raw body.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let from_json = parsed.and_then(|err| {
        err.message.or_else(|| {
            err.detail.map(|detail| match detail {
                serde_json::Value::String(text) => text,
                other @ (serde_json::Value::Null
                | serde_json::Value::Bool(_)
                | serde_json::Value::Number(_)
                | serde_json::Value::Array(_)
                | serde_json::Value::Object(_)) => other.to_string(),
            })
        })
    });
    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "unknown error".to_owned()
        } else {
            trimmed.to_owned()
        }
    })
}

/// Strips trailing slashes so paths can be appended verbatim.
#[cfg(any(feature = "async", feature = "blocking"))]
fn normalize_base(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

/// Generates the price and search clients (async or blocking) with
/// builders, methods, and tests.
macro_rules! define_clients {
    (
        price_client: $price:ident,
        price_builder: $price_builder:ident,
        search_client: $search:ident,
        search_builder: $search_builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        price_doc: $price_doc:expr,
        price_builder_doc: $price_builder_doc:expr,
        search_doc: $search_doc:expr,
        search_builder_doc: $search_builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        /// Reads a response body, turning a non-success status into
        /// [`PriceCompareError::Api`].
        $($async_kw)? fn read_body(response: $resp_type) -> Result<String> {
            let status = response.status();
            tracing::debug!(status = %status, "received response");
            if status.is_success() {
                let body = response.text() $( .$await_ext )? ?;
                tracing::trace!(body_len = body.len(), "read response body");
                Ok(body)
            } else {
                let body = response.text() $( .$await_ext )? .unwrap_or_default();
                let message = error_message(&body);
                tracing::debug!(status = status.as_u16(), message = %message, "API error");
                Err(PriceCompareError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }

        /// Builds the underlying HTTP client.
        fn build_http(timeout: Option<Duration>) -> Result<$http_type> {
            let mut builder = <$http_type>::builder();
            if let Some(limit) = timeout {
                builder = builder.timeout(limit);
            }
            Ok(builder.build()?)
        }

        #[doc = $price_builder_doc]
        #[derive(Debug, Default)]
        pub struct $price_builder {
            /// Dataset root URL.
            base_url: Option<String>,
            /// Dataset API key.
            api_key: Option<SecretString>,
            /// Per-request timeout.
            timeout: Option<Duration>,
        }

        impl $price_builder {
            /// Sets the dataset root URL (e.g. `https://<project>.supabase.co`).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the API key sent as `apikey` and bearer token.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(SecretString::from(key.into()));
                self
            }

            /// Sets a per-request timeout.
            #[inline]
            #[must_use]
            pub const fn timeout(mut self, timeout: Duration) -> Self {
                self.timeout = Some(timeout);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`PriceCompareError::Config`] if the base URL or API
            /// key is missing.
            /// Returns [`PriceCompareError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$price> {
                let base_url = self.base_url.ok_or_else(|| {
                    PriceCompareError::Config("price dataset base URL is required".to_owned())
                })?;
                let api_key = self.api_key.ok_or_else(|| {
                    PriceCompareError::Config("price dataset API key is required".to_owned())
                })?;
                let base_url = normalize_base(&base_url);
                tracing::debug!(base_url = %base_url, "building price client");

                Ok($price {
                    http: build_http(self.timeout)?,
                    base_url,
                    api_key,
                })
            }
        }

        #[doc = $price_doc]
        #[derive(Debug)]
        pub struct $price {
            /// Underlying HTTP client.
            http: $http_type,
            /// Dataset root URL without trailing slash.
            base_url: String,
            /// Dataset API key.
            api_key: SecretString,
        }

        impl $price {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub fn builder() -> $price_builder {
                $price_builder::default()
            }

            /// Creates a client from resolved configuration.
            ///
            /// # Errors
            ///
            /// Returns [`PriceCompareError::Config`] if the dataset URL or
            /// key is not configured, or an HTTP error if the client fails
            /// to build.
            #[inline]
            pub fn from_config(config: &Config) -> Result<Self> {
                Self::builder()
                    .base_url(config.supabase_url()?.as_str())
                    .api_key(config.supabase_key()?.expose_secret())
                    .build()
            }

            /// Runs a read request against `GET /rest/v1/<table>`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the rows cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(table = request.table))]
            pub $($async_kw)? fn read(&self, request: &ReadRequest) -> Result<Vec<PriceRecord>> {
                let url = format!("{}{REST_PATH}/{}", self.base_url, request.table);
                tracing::trace!(url = %url, "sending GET request");
                let key = self.api_key.expose_secret();
                let response: $resp_type = self
                    .http
                    .get(&url)
                    .header("apikey", key)
                    .header(AUTHORIZATION, format!("Bearer {key}"))
                    .header(ACCEPT, "application/json")
                    .query(&request.query_pairs())
                    .send()
                    $( .$await_ext )?
                    ?;

                let body = read_body(response) $( .$await_ext )? ?;
                let rows: Vec<PriceRecord> = serde_json::from_str(&body)?;
                tracing::debug!(rows = rows.len(), "price rows received");
                Ok(rows)
            }
        }

        #[doc = $search_builder_doc]
        #[derive(Debug, Default)]
        pub struct $search_builder {
            /// Backend root URL.
            base_url: Option<String>,
            /// Per-request timeout.
            timeout: Option<Duration>,
        }

        impl $search_builder {
            /// Sets the backend root URL.
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets a per-request timeout.
            #[inline]
            #[must_use]
            pub const fn timeout(mut self, timeout: Duration) -> Self {
                self.timeout = Some(timeout);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`PriceCompareError::Config`] if the base URL is missing.
            /// Returns [`PriceCompareError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$search> {
                let base_url = self.base_url.ok_or_else(|| {
                    PriceCompareError::Config("search backend base URL is required".to_owned())
                })?;
                let base_url = normalize_base(&base_url);
                tracing::debug!(base_url = %base_url, "building search client");

                Ok($search {
                    http: build_http(self.timeout)?,
                    base_url,
                })
            }
        }

        #[doc = $search_doc]
        #[derive(Debug)]
        pub struct $search {
            /// Underlying HTTP client.
            http: $http_type,
            /// Backend root URL without trailing slash.
            base_url: String,
        }

        impl $search {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub fn builder() -> $search_builder {
                $search_builder::default()
            }

            /// Creates a client from resolved configuration.
            ///
            /// # Errors
            ///
            /// Returns [`PriceCompareError::Config`] if the backend URL is not
            /// configured, or an HTTP error if the client fails to build.
            #[inline]
            pub fn from_config(config: &Config) -> Result<Self> {
                Self::builder()
                    .base_url(config.backend_url()?.as_str())
                    .build()
            }

            /// Submits a batch search via `POST /search`.
            ///
            /// The response shape is not fixed, so it is returned as raw JSON.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the body is not valid JSON.
            #[inline]
            #[tracing::instrument(skip_all, fields(queries = request.queries.len()))]
            pub $($async_kw)? fn search(&self, request: &SearchRequest) -> Result<serde_json::Value> {
                let url = format!("{}{SEARCH_PATH}", self.base_url);
                tracing::trace!(url = %url, "sending POST request");
                let response: $resp_type = self
                    .http
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .json(request)
                    .send()
                    $( .$await_ext )?
                    ?;

                let body = read_body(response) $( .$await_ext )? ?;
                serde_json::from_str(&body).map_err(PriceCompareError::from)
            }

            /// Probes the backend via `GET /`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the body cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn health(&self) -> Result<HealthStatus> {
                let url = format!("{}{HEALTH_PATH}", self.base_url);
                let response: $resp_type = self.http.get(&url).send() $( .$await_ext )? ?;
                let body = read_body(response) $( .$await_ext )? ?;
                serde_json::from_str(&body).map_err(PriceCompareError::from)
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP clients.

    use core::time::Duration;

    use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
    use secrecy::{ExposeSecret as _, SecretString};

    use super::{HEALTH_PATH, REST_PATH, SEARCH_PATH, error_message, normalize_base};
    use crate::config::Config;
    use crate::error::{PriceCompareError, Result};
    use crate::models::{HealthStatus, PriceRecord, SearchRequest};
    use crate::query::ReadRequest;
    use crate::source::{PriceSource, SearchBackend};

    define_clients! {
        price_client: PriceClient,
        price_builder: PriceClientBuilder,
        search_client: SearchClient,
        search_builder: SearchClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        price_doc: "Async client for the hosted price dataset.\n\nUse [`PriceClient::builder()`] or [`PriceClient::from_config()`] to construct an instance.",
        price_builder_doc: "Builder for constructing a [`PriceClient`].",
        search_doc: "Async client for the batch search backend.\n\nUse [`SearchClient::builder()`] or [`SearchClient::from_config()`] to construct an instance.",
        search_builder_doc: "Builder for constructing a [`SearchClient`].",
        async_kw: async,
        await_kw: await,
    }

    impl PriceSource for PriceClient {
        #[inline]
        fn query(
            &self,
            request: &ReadRequest,
        ) -> impl Future<Output = Result<Vec<PriceRecord>>> + Send {
            self.read(request)
        }
    }

    impl SearchBackend for SearchClient {
        #[inline]
        fn submit(
            &self,
            request: &SearchRequest,
        ) -> impl Future<Output = Result<serde_json::Value>> + Send {
            self.search(request)
        }
    }

}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP clients.

    use core::time::Duration;

    use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
    use secrecy::{ExposeSecret as _, SecretString};

    use super::{HEALTH_PATH, REST_PATH, SEARCH_PATH, error_message, normalize_base};
    use crate::config::Config;
    use crate::error::{PriceCompareError, Result};
    use crate::models::{HealthStatus, PriceRecord, SearchRequest};
    use crate::query::ReadRequest;
    use crate::source::{BlockingPriceSource, BlockingSearchBackend};

    define_clients! {
        price_client: PriceBlockingClient,
        price_builder: PriceBlockingClientBuilder,
        search_client: SearchBlockingClient,
        search_builder: SearchBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        price_doc: "Blocking (synchronous) client for the hosted price dataset.\n\nUse [`PriceBlockingClient::builder()`] or [`PriceBlockingClient::from_config()`] to construct an instance.",
        price_builder_doc: "Builder for constructing a [`PriceBlockingClient`].",
        search_doc: "Blocking (synchronous) client for the batch search backend.\n\nUse [`SearchBlockingClient::builder()`] or [`SearchBlockingClient::from_config()`] to construct an instance.",
        search_builder_doc: "Builder for constructing a [`SearchBlockingClient`].",
    }

    impl BlockingPriceSource for PriceBlockingClient {
        #[inline]
        fn query(&self, request: &ReadRequest) -> Result<Vec<PriceRecord>> {
            self.read(request)
        }
    }

    impl BlockingSearchBackend for SearchBlockingClient {
        #[inline]
        fn submit(&self, request: &SearchRequest) -> Result<serde_json::Value> {
            self.search(request)
        }
    }
}

#[cfg(feature = "async")]
pub use async_client::{PriceClient, PriceClientBuilder, SearchClient, SearchClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{
    PriceBlockingClient, PriceBlockingClientBuilder, SearchBlockingClient,
    SearchBlockingClientBuilder,
};
