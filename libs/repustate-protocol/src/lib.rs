use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path segment every demo endpoint lives under.
pub const DEMO_BASE_PATH: &str = "demo";

pub const ACCEPT_JSON: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Register,
    Index,
    Search,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Register => "register",
            Endpoint::Index => "index",
            Endpoint::Search => "search",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Register | Endpoint::Index => Method::Post,
            Endpoint::Search => Method::Get,
        }
    }

    /// Path relative to the server root, e.g. `demo/search`.
    pub fn path(&self) -> String {
        self.path_under(DEMO_BASE_PATH)
    }

    /// Path beneath a custom prefix; surrounding slashes in `base` are ignored
    /// and an empty prefix puts the endpoint at the server root.
    pub fn path_under(&self, base: &str) -> String {
        match base.trim_matches('/') {
            "" => self.name().to_string(),
            base => format!("{}/{}", base, self.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub username: String,
    pub text: String,
}

/// Query-string parameters of `POST demo/index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// Query-string parameters of `GET demo/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub username: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "matches")]
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub classifications: Vec<String>,
}

/// Analysis the server returns for a freshly indexed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResult {
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty response body")]
    EmptyBody,
}

pub fn decode_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, ProtocolError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ProtocolError::EmptyBody);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Like [`decode_body`], but a blank body yields `T::default()`.
pub fn decode_body_or_default<T>(body: &[u8]) -> Result<T, ProtocolError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match decode_body(body) {
        Err(ProtocolError::EmptyBody) => Ok(T::default()),
        other => other,
    }
}
