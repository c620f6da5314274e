use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client as HttpClient;
use std::fmt::Debug;
use tracing::{error, trace, warn};

/// Proxy framework.
///
/// Every upstream dataset is served in two parts, in order to segment code neatly;
///
/// 1. `[Http]` - the procedure for fetching and reshaping `Output` from some HTTP endpoint.
/// 2. `[Api]` - the static stand-in served whenever (1) fails, and the shortcut tying both.
#[async_trait]
pub trait Http: Send + Sync {
    /// What the caller selects, e.g., a market-cap segment.
    type Query: Debug + Send + Sync;

    /// The canonical, JSON-serializable shape handed back to the caller.
    type Output: Debug + Send;

    /// How the `Output` is fetched from the upstream provider and normalized.
    async fn fetch(&self, http_client: &HttpClient, query: &Self::Query) -> Result<Self::Output, FetchError>;
}

#[async_trait]
pub trait Api: Http {
    /// Deterministic data served in place of a failed fetch.
    fn fallback(&self, query: &Self::Query) -> Self::Output;

    /// Shortcut method for the entire process; never fails, so the caller always receives a
    /// well-formed `Output`, live or not.
    async fn serve(&self, http_client: &HttpClient, query: &Self::Query) -> Self::Output {
        match self.fetch(http_client, query).await {
            Ok(data) => data,
            Err(e) => {
                warn!("serving fallback for {query:?} | {e}");
                self.fallback(query)
            }
        }
    }
}

/// GET `url` with `headers` and deserialize the JSON body; non-success statuses are errors.
pub async fn fetch_de<D>(http_client: &HttpClient, url: &str, headers: HeaderMap) -> Result<D, FetchError>
where
    D: serde::de::DeserializeOwned,
{
    trace!("GET {url}");
    let response = http_client
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(|source| {
            error!("failed fetching response from {url}");
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let de: D = response.json().await.map_err(|source| {
        error!("failed deserializing from {url}");
        FetchError::Decode {
            url: url.to_string(),
            source,
        }
    })?;

    Ok(de)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Flaky {
        fail: bool,
    }

    #[async_trait]
    impl Http for Flaky {
        type Query = u8;
        type Output = Vec<u8>;

        async fn fetch(&self, _: &HttpClient, query: &u8) -> Result<Vec<u8>, FetchError> {
            match self.fail {
                true => Err(FetchError::Empty(format!("flaky {query}"))),
                false => Ok(vec![*query; 2]),
            }
        }
    }

    impl Api for Flaky {
        fn fallback(&self, query: &u8) -> Vec<u8> {
            vec![*query]
        }
    }

    #[tokio::test]
    async fn serve_prefers_live_data() {
        let data = Flaky { fail: false }.serve(&HttpClient::new(), &7).await;
        assert_eq!(data, vec![7, 7]);
    }

    #[tokio::test]
    async fn serve_substitutes_fallback_on_failure() {
        let data = Flaky { fail: true }.serve(&HttpClient::new(), &7).await;
        assert_eq!(data, vec![7]);
    }
}
