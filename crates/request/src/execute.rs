//! Request execution pipeline

use std::io::Write;

use bytes::Bytes;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::builder::RequestBuilder;
use crate::client::HttpClient;
use crate::compress::gzip;
use crate::curl;
use crate::error::{RequestError, Result};
use crate::method::RequestMethod;
use crate::payload::IntoPayload;

impl RequestBuilder {
    /// Runs one exchange and returns the captured body.
    ///
    /// With `need_result` unset the body is drained and an empty buffer is
    /// returned, including inside a [`RequestError::Status`].
    pub(crate) async fn execute(
        &self,
        cancel: &CancellationToken,
        url: &str,
        is_post: bool,
        payload: impl IntoPayload,
        need_result: bool,
    ) -> Result<Bytes> {
        if let Some(err) = &self.build_error {
            return Err(err.clone().into());
        }

        let method = RequestMethod::from_post_flag(is_post);
        let body = if method.can_have_body() {
            payload
                .into_payload()
                .map_err(RequestError::Serialization)?
                .map(|payload| payload.encode().map_err(RequestError::Serialization))
                .transpose()?
        } else {
            None
        };

        let wire_body = match &body {
            Some(body) if self.compress => {
                Some(Bytes::from(gzip(body).map_err(RequestError::Compression)?))
            }
            other => other.clone(),
        };
        let gzipped = self.compress && body.is_some();

        let target =
            Url::parse(url).map_err(|e| RequestError::Build(format!("invalid url {url:?}: {e}")))?;
        let mut request = reqwest::Request::new(method.into(), target);
        *request.body_mut() = wire_body.map(reqwest::Body::from);

        let headers = request.headers_mut();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::Build(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::Build(format!("invalid value for header {name}: {e}")))?;
            headers.append(name, value);
        }
        if method == RequestMethod::Post {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if self.wants_log() {
            let command = curl::render(method, request.headers(), body.as_deref(), url);
            tracing::debug!(%command, "request command");
            if let Some(path) = &self.log_file {
                tokio::fs::write(path, command.as_bytes())
                    .await
                    .map_err(|source| RequestError::LogFile {
                        path: path.clone(),
                        source,
                    })?;
            }
            if self.log {
                let _ = emit(&mut std::io::stderr().lock(), &command);
            }
        }

        // Set after logging so the logged command replays the plain body.
        if gzipped {
            request
                .headers_mut()
                .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }

        let client = match &self.client {
            Some(client) => client,
            None => HttpClient::default_client(),
        };
        let http = client.reqwest_client(self.disable_redirect)?;

        tracing::debug!(%method, url, compressed = gzipped, "sending request");

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RequestError::Cancelled),
            result = http.execute(request) => result.map_err(|e| classify_send_error(e, self.disable_redirect))?,
        };

        let status = response.status();
        let body = if need_result {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RequestError::Cancelled),
                bytes = response.bytes() => bytes.map_err(RequestError::ResponseRead)?,
            }
        } else {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RequestError::Cancelled),
                () = drain(response) => Bytes::new(),
            }
        };

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.as_u16() >= 300 {
            return Err(RequestError::Status {
                code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    /// Whether a command line has to be rendered at all
    pub(crate) fn wants_log(&self) -> bool {
        self.log || self.log_file.is_some()
    }
}

/// Writes the console form of a logged command
fn emit(out: &mut impl Write, command: &str) -> std::io::Result<()> {
    writeln!(out, "HTTP DEBUG: {command}")
}

/// Reads the rest of the body and throws it away so the connection can be
/// reused.
async fn drain(mut response: reqwest::Response) {
    loop {
        match response.chunk().await {
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to drain response body");
                break;
            }
        }
    }
}

fn classify_send_error(err: reqwest::Error, redirects_denied: bool) -> RequestError {
    if redirects_denied && err.is_redirect() {
        return RequestError::RedirectEncountered {
            location: err.url().map(ToString::to_string),
        };
    }
    RequestError::Transport(err)
}
