//! Response body decoding
//!
//! JSON numbers never pass through `f64`: serde_json is built with
//! `arbitrary_precision`, so a [`serde_json::Value`] keeps every digit of the
//! number as written and integer fields decode straight from their text.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{RequestError, Result};

/// Response body delivered byte for byte, without JSON parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PlainHtml(pub Bytes);

impl PlainHtml {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the body as text when it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Returns the body as text, replacing invalid sequences with U+FFFD
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for PlainHtml {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for PlainHtml {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PlainHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Target type of a terminal call.
///
/// - `()` discards the body without reading it into memory.
/// - [`PlainHtml`] receives the raw body.
/// - `Option<T>` decodes JSON into `T`, or yields `None` for an empty body.
pub trait ResponseBody: Sized {
    /// Whether the body has to be captured for this target
    const NEEDS_BODY: bool = true;

    fn from_body(body: Bytes) -> Result<Self>;
}

impl ResponseBody for () {
    const NEEDS_BODY: bool = false;

    fn from_body(_body: Bytes) -> Result<Self> {
        Ok(())
    }
}

impl ResponseBody for PlainHtml {
    fn from_body(body: Bytes) -> Result<Self> {
        Ok(Self(body))
    }
}

impl<T: DeserializeOwned> ResponseBody for Option<T> {
    fn from_body(body: Bytes) -> Result<Self> {
        if body.is_empty() {
            return Ok(None);
        }
        decode_safe_number(&body).map(Some)
    }
}

/// Decodes `body` as JSON without routing numbers through floating point
pub fn decode_safe_number<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(RequestError::Decode)
}
