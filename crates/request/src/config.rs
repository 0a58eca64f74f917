use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::builder::RequestBuilder;
use crate::client::HttpClient;

/// Serializable request policy, e.g. loaded from a JSON settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    pub headers: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    pub compress: bool,

    pub disable_redirect: bool,

    pub log: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Total request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl RequestConfig {
    /// Parses a config from a JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn client(&self) -> Option<HttpClient> {
        if self.timeout_secs.is_none()
            && self.connect_timeout_secs.is_none()
            && self.user_agent.is_none()
        {
            return None;
        }
        let mut client = HttpClient::new();
        if let Some(secs) = self.timeout_secs {
            client = client.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout_secs {
            client = client.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &self.user_agent {
            client = client.user_agent(user_agent.clone());
        }
        Some(client)
    }

    /// Builds a configured [`RequestBuilder`].
    ///
    /// An invalid proxy ends up as the builder's build error, exactly as if
    /// [`RequestBuilder::with_proxy`] had been called.
    pub fn into_builder(self) -> RequestBuilder {
        let mut builder = RequestBuilder::new();
        if let Some(client) = self.client() {
            builder.with_client(client);
        }
        if let Some(proxy) = &self.proxy {
            builder.with_proxy(proxy);
        }
        for (name, value) in self.headers {
            builder.header(name, value);
        }
        if self.compress {
            builder.compressed();
        }
        if self.disable_redirect {
            builder.disable_redirect();
        }
        builder.log(self.log);
        if let Some(path) = self.log_file {
            builder.log_file(path);
        }
        builder
    }
}

impl From<RequestConfig> for RequestBuilder {
    fn from(config: RequestConfig) -> Self {
        config.into_builder()
    }
}
