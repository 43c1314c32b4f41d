pub mod commands;
pub mod config;
pub mod profile;
pub mod query;
pub mod render;
pub mod session;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;

use repustate_protocol::ProtocolError;
use thiserror::Error;
use utils::{EXIT_INTERNAL_ERROR, EXIT_INVALID_ARGS, EXIT_NOT_REGISTERED, EXIT_SERVER_UNAVAILABLE};

pub const USER_AGENT: &str = concat!("rcli/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("bad server url address: {0}")]
    BadServerUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed server response: {0}")]
    Decode(#[from] ProtocolError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("user not registered, run `register` first")]
    NotRegistered,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid username {0:?}: only alphanumeric values, '_', '@' and '.' are allowed")]
    InvalidUsername(String),

    #[error("one of '--text' or '--file' is required")]
    MissingDocument,

    #[error("only one of '--text' or '--file' should be used")]
    ConflictingDocument,

    #[error("document is empty")]
    EmptyDocument,

    #[error("unsupported language {0:?}")]
    UnsupportedLanguage(String),

    #[error("missing query")]
    MissingQuery,

    #[error("unknown query term: {0:?}")]
    UnknownTerm(String),

    #[error("too many query terms: {given} given, at most {max} allowed")]
    TooManyTerms { given: usize, max: usize },
}

impl CoreError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CoreError::Validation(_) | CoreError::BadServerUrl(_) | CoreError::Config(_) => {
                EXIT_INVALID_ARGS
            }
            CoreError::NotRegistered => EXIT_NOT_REGISTERED,
            CoreError::Transport(_) | CoreError::Status { .. } => EXIT_SERVER_UNAVAILABLE,
            CoreError::Io(_) | CoreError::Decode(_) => EXIT_INTERNAL_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
