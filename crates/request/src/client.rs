use std::sync::{Arc, LazyLock, OnceLock};
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, RedirectDenied, RequestError, Result};

static DEFAULT_CLIENT: LazyLock<HttpClient> = LazyLock::new(HttpClient::new);

/// Settings the underlying reqwest client is built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ClientSettings {
    proxy: Option<Url>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    redirect_limit: Option<usize>,
}

/// HTTP client used to dispatch requests.
///
/// Cheap to clone: clones share the lazily built reqwest clients and with
/// them the connection pool. Changing a setting always produces a new value,
/// so a client handed to a [`RequestBuilder`](crate::RequestBuilder) is never
/// altered behind the caller's back.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    settings: ClientSettings,
    following: Arc<OnceLock<reqwest::Client>>,
    denying: Arc<OnceLock<reqwest::Client>>,
}

impl HttpClient {
    /// Creates a client with reqwest's defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide client used when a builder has none configured
    pub fn default_client() -> &'static Self {
        &DEFAULT_CLIENT
    }

    fn with_settings(settings: ClientSettings) -> Self {
        Self {
            settings,
            following: Arc::default(),
            denying: Arc::default(),
        }
    }

    /// Sets the total request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        Self::with_settings(self.settings)
    }

    /// Sets the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.settings.connect_timeout = Some(timeout);
        Self::with_settings(self.settings)
    }

    /// Sets the User-Agent sent with every request
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = Some(user_agent.into());
        Self::with_settings(self.settings)
    }

    /// Limits how many redirects are followed when following is allowed
    pub fn redirect_limit(mut self, limit: usize) -> Self {
        self.settings.redirect_limit = Some(limit);
        Self::with_settings(self.settings)
    }

    /// Returns a copy of this client routed through `proxy`.
    ///
    /// `self` is left untouched.
    pub fn with_proxy(&self, proxy: Url) -> Result<Self, ConfigError> {
        reqwest::Proxy::all(proxy.as_str())
            .map_err(|e| ConfigError::invalid_proxy(proxy.as_str(), e))?;
        let mut settings = self.settings.clone();
        settings.proxy = Some(proxy);
        Ok(Self::with_settings(settings))
    }

    /// Proxy this client routes through, if any
    pub fn proxy(&self) -> Option<&Url> {
        self.settings.proxy.as_ref()
    }

    /// Returns the reqwest client for this configuration.
    ///
    /// With `deny_redirects` the returned client fails every redirect
    /// attempt instead of following it.
    pub(crate) fn reqwest_client(&self, deny_redirects: bool) -> Result<reqwest::Client> {
        let slot = if deny_redirects {
            &self.denying
        } else {
            &self.following
        };
        if let Some(client) = slot.get() {
            return Ok(client.clone());
        }
        let client = self.build(deny_redirects)?;
        Ok(slot.get_or_init(|| client).clone())
    }

    fn build(&self, deny_redirects: bool) -> Result<reqwest::Client> {
        let settings = &self.settings;
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        builder = builder.redirect(if deny_redirects {
            reqwest::redirect::Policy::custom(|attempt| attempt.error(RedirectDenied))
        } else if let Some(limit) = settings.redirect_limit {
            reqwest::redirect::Policy::limited(limit)
        } else {
            reqwest::redirect::Policy::default()
        });

        if let Some(proxy) = &settings.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(RequestError::ClientBuild)?;
            builder = builder.proxy(proxy);
        }

        tracing::debug!(
            proxy = ?settings.proxy.as_ref().map(Url::as_str),
            deny_redirects,
            "building http client"
        );
        builder.build().map_err(RequestError::ClientBuild)
    }
}
