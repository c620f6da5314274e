use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER,
    SET_COOKIE, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::{debug, error, trace};

/// Failure to obtain the session artifact a provider gates its API behind.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("landing page {url} unreachable: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("landing page {url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("malformed set-cookie header from {url}")]
    MalformedCookie { url: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

/// Headers (and folded cookies) reusable for every data call made after visiting a provider's
/// landing page.
#[derive(Debug, Clone)]
pub struct SessionHeaders {
    headers: HeaderMap,
    cookie: String,
}

impl SessionHeaders {
    /// Build the header set used against `base_url`, e.g.,
    ///
    /// ```text
    /// User-Agent:       <user_agent>
    /// Accept:           application/json
    /// Accept-Language:  en-US,en;q=0.9
    /// Referer:          https://www.nseindia.com/
    /// Origin:           https://www.nseindia.com
    /// Cookie:           nsit=abc; nseappid=xyz
    /// ```
    pub fn new(base_url: &str, user_agent: &str, cookie: String) -> Result<Self, SessionError> {
        let origin = base_url.trim_end_matches('/');

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_str(&format!("{origin}/"))?);
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
        headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);

        Ok(Self { headers, cookie })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The folded `Cookie` value; empty when the landing page set none.
    pub fn cookie(&self) -> &str {
        &self.cookie
    }
}

/// Fold every `Set-Cookie` directive into a single `Cookie` header value, keeping only the
/// `name=value` pair of each:
///
/// ```text
/// Set-Cookie: nsit=abc; Path=/; HttpOnly
/// Set-Cookie: nseappid=xyz; Secure
///
/// -> "nsit=abc; nseappid=xyz"
/// ```
pub fn fold_cookies<'a, I>(set_cookies: I) -> Option<String>
where
    I: IntoIterator<Item = &'a HeaderValue>,
{
    let mut pairs = Vec::new();
    for value in set_cookies {
        let value = value.to_str().ok()?;
        let pair = value.split(';').next().unwrap_or_default().trim();
        if !pair.is_empty() {
            pairs.push(pair);
        }
    }
    Some(pairs.join("; "))
}

pub trait ClientSessionExt {
    fn acquire_session(
        &self,
        base_url: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<SessionHeaders, SessionError>> + Send;
}

/// Add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl ClientSessionExt for Client {
    /// Visit the landing page at `base_url` and collect its cookies; no retries.
    async fn acquire_session(
        &self,
        base_url: &str,
        user_agent: &str,
    ) -> Result<SessionHeaders, SessionError> {
        trace!("acquiring session from {base_url}");

        let response = self
            .get(base_url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|source| {
                error!("failed fetching landing page {base_url}");
                SessionError::Unreachable {
                    url: base_url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Status {
                url: base_url.to_string(),
                status,
            });
        }

        let cookie = fold_cookies(response.headers().get_all(SET_COOKIE)).ok_or_else(|| {
            SessionError::MalformedCookie {
                url: base_url.to_string(),
            }
        })?;
        debug!("session acquired from {base_url} ({} bytes of cookies)", cookie.len());

        SessionHeaders::new(base_url, user_agent, cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "dalal-test/0.1";

    #[test]
    fn fold_keeps_name_value_pairs_only() {
        let values = [
            HeaderValue::from_static("nsit=abc; Path=/; HttpOnly"),
            HeaderValue::from_static("nseappid=xyz; Secure; Expires=Wed, 21 Oct 2026 07:28:00 GMT"),
        ];
        assert_eq!(fold_cookies(values.iter()).unwrap(), "nsit=abc; nseappid=xyz");
    }

    #[test]
    fn fold_without_cookies_is_empty() {
        assert_eq!(fold_cookies(std::iter::empty()).unwrap(), "");
    }

    #[test]
    fn fold_rejects_non_visible_ascii() {
        let value = HeaderValue::from_bytes(b"nsit=\xfe\xff").unwrap();
        assert!(fold_cookies([&value]).is_none());
    }

    #[test]
    fn headers_carry_referer_and_origin() {
        let session = SessionHeaders::new("https://www.nseindia.com/", UA, "a=1".into()).unwrap();
        let headers = session.headers();
        assert_eq!(headers[REFERER], "https://www.nseindia.com/");
        assert_eq!(headers[ORIGIN], "https://www.nseindia.com");
        assert_eq!(headers[USER_AGENT], UA);
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(session.cookie(), "a=1");
    }

    #[tokio::test]
    async fn acquires_cookies_from_landing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", UA))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "nsit=abc; Path=/")
                    .append_header("set-cookie", "bm_sv=def; HttpOnly"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = Client::new()
            .acquire_session(&format!("{}/", server.uri()), UA)
            .await
            .unwrap();

        assert_eq!(session.cookie(), "nsit=abc; bm_sv=def");
        assert_eq!(session.headers()[COOKIE], "nsit=abc; bm_sv=def");
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = Client::new()
            .acquire_session(&server.uri(), UA)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Status { status, .. } if status == StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn unreachable_landing_page_fails() {
        let err = Client::new()
            .acquire_session("http://127.0.0.1:9", UA)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Unreachable { .. }));
    }
}
