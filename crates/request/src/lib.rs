//! Configurable HTTP request executor.
//!
//! A [`RequestBuilder`] accumulates request policy (headers, proxy, gzip
//! request bodies, redirect suppression, curl-style debug logging) and then
//! performs single GET or POST exchanges, decoding the body into the caller's
//! target type.
//!
//! - Status codes of 300 and above are errors carrying code, reason and body.
//! - JSON is decoded without routing numbers through `f64`.
//! - The first configuration error is sticky and surfaces on execution.

mod builder;
mod client;
mod compress;
mod config;
mod curl;
mod decode;
mod error;
mod execute;
mod method;
mod payload;

pub use builder::RequestBuilder;
pub use client::HttpClient;
pub use config::RequestConfig;
pub use curl::quote_sh;
pub use decode::{PlainHtml, ResponseBody, decode_safe_number};
pub use error::{ConfigError, RequestError, Result};
pub use method::RequestMethod;
pub use payload::{IntoPayload, Json, Payload};
