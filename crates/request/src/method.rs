use core::fmt;

use serde::{Deserialize, Serialize};

/// HTTP methods the executor issues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// GET method for retrieving resources
    #[default]
    Get,
    /// POST method, the only one that carries a payload
    Post,
}

impl RequestMethod {
    pub(crate) fn from_post_flag(is_post: bool) -> Self {
        if is_post { Self::Post } else { Self::Get }
    }

    /// Checks if this method can have a request body
    pub fn can_have_body(&self) -> bool {
        matches!(self, Self::Post)
    }

    /// Returns the string representation of the method in uppercase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl From<RequestMethod> for reqwest::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => Self::GET,
            RequestMethod::Post => Self::POST,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RequestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(format!("Unsupported HTTP method: {s}")),
        }
    }
}
