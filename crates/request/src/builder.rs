use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::HttpClient;
use crate::decode::ResponseBody;
use crate::error::{ConfigError, Result};
use crate::payload::IntoPayload;

/// Reusable, chainable HTTP request configuration.
///
/// Configuration calls mutate the builder in place and return it for
/// chaining. The first configuration error is kept and every later
/// configuration call becomes a no-op; executions then fail with that error
/// without touching the network.
///
/// ```no_run
/// # async fn run() -> Result<(), courier_request::RequestError> {
/// use courier_request::RequestBuilder;
/// use tokio_util::sync::CancellationToken;
///
/// let mut builder = RequestBuilder::new();
/// builder
///     .header("Authorization", "Bearer token")
///     .compressed()
///     .enable_log();
///
/// let cancel = CancellationToken::new();
/// let reply: Option<serde_json::Value> = builder
///     .post_json(&cancel, "https://example.com/api", serde_json::json!({"a": 1}))
///     .await?;
/// # let _ = reply;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    pub(crate) build_error: Option<ConfigError>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) log: bool,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) compress: bool,
    pub(crate) disable_redirect: bool,
    pub(crate) client: Option<HttpClient>,
}

impl RequestBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(&self) -> bool {
        self.build_error.is_some()
    }

    /// Sets a header, replacing any value previously set under the same
    /// (case-insensitive) name
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if self.poisoned() {
            return self;
        }
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => *slot = (name, value),
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Routes requests through the proxy at `proxy_url`.
    ///
    /// An empty string is ignored. An invalid URL is recorded as the build
    /// error. The configured client, if any, is copied before the proxy is
    /// attached.
    pub fn with_proxy(&mut self, proxy_url: &str) -> &mut Self {
        if proxy_url.is_empty() || self.poisoned() {
            return self;
        }
        let proxied = Url::parse(proxy_url)
            .map_err(|e| ConfigError::invalid_proxy(proxy_url, e))
            .and_then(|url| match &self.client {
                Some(client) => client.with_proxy(url),
                None => HttpClient::new().with_proxy(url),
            });
        match proxied {
            Ok(client) => self.client = Some(client),
            Err(e) => {
                tracing::debug!(error = %e, "proxy rejected, builder disabled");
                self.build_error = Some(e);
            }
        }
        self
    }

    /// Installs `client` outright, replacing any earlier client or proxy
    pub fn with_client(&mut self, client: HttpClient) -> &mut Self {
        if !self.poisoned() {
            self.client = Some(client);
        }
        self
    }

    /// Gzip-compresses non-empty request bodies
    pub fn compressed(&mut self) -> &mut Self {
        if !self.poisoned() {
            self.compress = true;
        }
        self
    }

    /// Fails requests that receive a redirect instead of following it
    pub fn disable_redirect(&mut self) -> &mut Self {
        if !self.poisoned() {
            self.disable_redirect = true;
        }
        self
    }

    /// Turns console logging of the equivalent curl command on or off
    pub fn log(&mut self, enabled: bool) -> &mut Self {
        if !self.poisoned() {
            self.log = enabled;
        }
        self
    }

    /// Turns console logging on
    pub fn enable_log(&mut self) -> &mut Self {
        self.log(true)
    }

    /// Writes the equivalent curl command to `path` before each request
    pub fn log_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        if !self.poisoned() {
            let path = path.as_ref();
            self.log_file = (!path.as_os_str().is_empty()).then(|| path.to_path_buf());
        }
        self
    }

    /// First configuration error, if any
    pub fn build_error(&self) -> Option<&ConfigError> {
        self.build_error.as_ref()
    }

    /// Configured headers in the order they were first set
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Configured client, if one was installed or derived from a proxy
    pub fn client(&self) -> Option<&HttpClient> {
        self.client.as_ref()
    }

    /// Sends a GET request and decodes the response into `T`.
    ///
    /// Use `()` to discard the body, [`PlainHtml`](crate::PlainHtml) for the
    /// raw text, or `Option<T>` for JSON.
    pub async fn get<T: ResponseBody>(&self, cancel: &CancellationToken, url: &str) -> Result<T> {
        let body = self.execute(cancel, url, false, (), T::NEEDS_BODY).await?;
        T::from_body(body)
    }

    /// Sends a POST request with `payload` labeled as JSON and decodes the
    /// response into `T`
    pub async fn post_json<T: ResponseBody>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        payload: impl IntoPayload,
    ) -> Result<T> {
        let body = self.execute(cancel, url, true, payload, T::NEEDS_BODY).await?;
        T::from_body(body)
    }
}
