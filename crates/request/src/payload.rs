//! Request payload shapes and their wire encoding

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use serde_json::value::RawValue;

/// Body of a POST request, before compression
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw bytes sent verbatim
    Bytes(Bytes),
    /// Already serialized JSON sent verbatim
    RawJson(Box<RawValue>),
    /// Plain text sent verbatim
    Text(String),
    /// JSON value serialized on send
    Json(Value),
}

impl Payload {
    /// Produces the bytes written to the wire
    pub(crate) fn encode(self) -> serde_json::Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::RawJson(raw) => Ok(Bytes::from(raw.get().to_owned())),
            Self::Text(text) => Ok(Bytes::from(text)),
            Self::Json(value) => serde_json::to_vec(&value).map(Bytes::from),
        }
    }
}

/// Wrapper marking an arbitrary [`Serialize`] value as a JSON payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Conversion into an optional request payload.
///
/// The conversion runs inside the execution, so a serialization failure
/// surfaces as [`RequestError::Serialization`](crate::RequestError::Serialization)
/// before any network I/O.
pub trait IntoPayload {
    fn into_payload(self) -> serde_json::Result<Option<Payload>>;
}

impl IntoPayload for Payload {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(self))
    }
}

impl IntoPayload for () {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(None)
    }
}

impl<P: IntoPayload> IntoPayload for Option<P> {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        match self {
            Some(payload) => payload.into_payload(),
            None => Ok(None),
        }
    }
}

impl IntoPayload for Bytes {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::Bytes(self)))
    }
}

impl IntoPayload for Vec<u8> {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::Bytes(Bytes::from(self))))
    }
}

impl IntoPayload for &[u8] {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::Bytes(Bytes::copy_from_slice(self))))
    }
}

impl IntoPayload for String {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::Text(self)))
    }
}

impl IntoPayload for &str {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::Text(self.to_owned())))
    }
}

impl IntoPayload for Box<RawValue> {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::RawJson(self)))
    }
}

impl IntoPayload for &RawValue {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::RawJson(self.to_owned())))
    }
}

impl IntoPayload for Value {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        Ok(Some(Payload::Json(self)))
    }
}

impl<T: Serialize> IntoPayload for Json<T> {
    fn into_payload(self) -> serde_json::Result<Option<Payload>> {
        serde_json::to_vec(&self.0).map(|bytes| Some(Payload::Bytes(Bytes::from(bytes))))
    }
}
