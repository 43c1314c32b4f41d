//! Per-process state shared by every command: configuration, the API client
//! and the registered user, loaded once when the session opens.

use crate::config::Config;
use crate::profile::ProfileStore;
use crate::query::QueryBuilder;
use crate::transport::ApiClient;
use crate::utils::{validate_language, validate_username};
use crate::{CoreError, Result, ValidationError};
use repustate_protocol::{IndexResult, SearchResult};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Where the text of a document to index comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Text(String),
    File(PathBuf),
}

impl DocumentSource {
    /// Exactly one of `text` or `file` must be given; an empty `text` counts
    /// as not given.
    pub fn from_args(
        text: Option<String>,
        file: Option<PathBuf>,
    ) -> std::result::Result<Self, ValidationError> {
        let text = text.filter(|t| !t.is_empty());
        match (text, file) {
            (Some(_), Some(_)) => Err(ValidationError::ConflictingDocument),
            (Some(text), None) => Ok(DocumentSource::Text(text)),
            (None, Some(file)) => Ok(DocumentSource::File(file)),
            (None, None) => Err(ValidationError::MissingDocument),
        }
    }

    pub fn read(&self) -> Result<String> {
        let text = match self {
            DocumentSource::Text(text) => text.clone(),
            DocumentSource::File(path) => String::from_utf8_lossy(&std::fs::read(path)?).into_owned(),
        };
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyDocument.into());
        }
        Ok(text)
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user: String,
    /// The previously stored user, when it differs from `user`.
    pub replaced: Option<String>,
}

pub struct Session {
    config: Config,
    client: ApiClient,
    profile: ProfileStore,
    user: Option<String>,
}

impl Session {
    pub fn open(config: Config) -> Result<Self> {
        let client = ApiClient::from_config(&config)?;
        let profile = ProfileStore::new(config.profile_path()?);
        Self::with_parts(config, client, profile)
    }

    pub fn with_parts(config: Config, client: ApiClient, profile: ProfileStore) -> Result<Self> {
        let user = profile.load()?;
        debug!("session user: {:?}", user);
        Ok(Self {
            config,
            client,
            profile,
            user,
        })
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn require_user(&self) -> Result<&str> {
        self.user().ok_or(CoreError::NotRegistered)
    }

    pub async fn register(&mut self, username: &str) -> Result<Registration> {
        validate_username(username)?;
        self.client.register(username).await?;
        self.remember(username)
    }

    /// Registers a freshly generated UUID instead of a chosen name.
    pub async fn register_anonymous(&mut self) -> Result<Registration> {
        let id = Uuid::new_v4().to_string();
        self.client.register(&id).await?;
        self.remember(&id)
    }

    fn remember(&mut self, user: &str) -> Result<Registration> {
        self.profile.store(user)?;
        let previous = self.user.replace(user.to_string());
        Ok(Registration {
            user: user.to_string(),
            replaced: previous.filter(|p| p != user),
        })
    }

    pub async fn index(&self, source: &DocumentSource, lang: Option<&str>) -> Result<IndexResult> {
        let user = self.require_user()?;
        let lang = self.effective_lang(lang)?;
        let text = source.read()?;
        self.client.index(&text, lang, user).await
    }

    pub fn build_query<S: AsRef<str>>(&self, terms: &[S]) -> Result<String> {
        if terms.is_empty() {
            return Err(ValidationError::MissingQuery.into());
        }
        let max = self.config.max_query_terms;
        if terms.len() > max {
            return Err(ValidationError::TooManyTerms {
                given: terms.len(),
                max,
            }
            .into());
        }
        Ok(QueryBuilder::new()
            .wildcard_classifications(self.config.wildcard_classifications)
            .build(terms)?)
    }

    pub async fn search<S: AsRef<str>>(&self, terms: &[S], lang: Option<&str>) -> Result<SearchResult> {
        let user = self.require_user()?;
        let query = self.build_query(terms)?;
        let lang = self.effective_lang(lang)?;
        self.client.search(&query, lang, user).await
    }

    fn effective_lang<'a>(&'a self, lang: Option<&'a str>) -> Result<Option<&'a str>> {
        let lang = lang.or(self.config.default_lang.as_deref());
        Ok(validate_language(lang)?)
    }
}
