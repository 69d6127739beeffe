//! Live document fetching
//!
//! The run only sees the [`Fetcher`] trait. [`HttpFetcher`] is the real
//! implementation (feature `http`); [`StaticFetcher`] serves canned
//! responses for tests and offline use.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP method implied by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// No body
    Get,
    /// Body present
    Post,
}

/// Basic access authentication credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Secret
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One live request
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Target URL
    pub url: String,
    /// POST payload; GET is used when absent
    pub body: Option<String>,
    /// Basic auth, applied only when both parts are non-empty
    pub credentials: Option<Credentials>,
    /// Whole-request timeout
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    /// GET request for `url`
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Method implied by the body
    pub fn method(&self) -> Method {
        if self.body.is_some() {
            Method::Post
        } else {
            Method::Get
        }
    }

    /// Credentials worth sending
    pub fn usable_credentials(&self) -> Option<&Credentials> {
        self.credentials
            .as_ref()
            .filter(|c| !c.username.is_empty() && !c.password.is_empty())
    }
}

/// Raw response: status and body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(String),
    /// Request did not complete
    #[error("{0}")]
    Transport(String),
}

/// Performs a live request
pub trait Fetcher {
    /// Send `request` and return the status and raw body
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Rewrite `///` to `/%2f/`.
///
/// RabbitMQ names its default vhost `/`, which must be percent-encoded
/// inside a path such as `/api/queues/%2f/myqueue`.
pub fn encode_default_vhost(url: &str) -> String {
    url.replace("///", "/%2f/")
}

/// Blocking HTTP client
#[cfg(feature = "http")]
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        // `None` also clears the client's built-in 30 s default.
        let client = reqwest::blocking::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let url = with_default_scheme(&request.url);
        let mut req = match &request.body {
            Some(body) => client.post(&*url).body(body.clone()),
            None => client.get(&*url),
        };
        if let Some(creds) = request.usable_credentials() {
            req = req.basic_auth(&creds.username, Some(&creds.password));
        }

        let resp = req
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_vec();

        Ok(FetchResponse { status, body })
    }
}

/// Accept bare `host:port/path` URLs the way curl does.
#[cfg(feature = "http")]
fn with_default_scheme(url: &str) -> std::borrow::Cow<'_, str> {
    if url.contains("://") {
        std::borrow::Cow::Borrowed(url)
    } else {
        std::borrow::Cow::Owned(format!("http://{}", url))
    }
}

/// Serves one canned response, or a canned transport error
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    outcome: Result<FetchResponse, String>,
}

impl StaticFetcher {
    /// Always answer `status` with `body`
    pub fn respond(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            outcome: Ok(FetchResponse {
                status,
                body: body.into(),
            }),
        }
    }

    /// Always fail with a transport error
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, _request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        self.outcome.clone().map_err(FetchError::Transport)
    }
}
