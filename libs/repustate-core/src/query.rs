//! Search-term mini-language.
//!
//! Every raw argument of `search` is classified as a theme, a sentiment or a
//! classification path, rendered as a query fragment, and the fragments are
//! joined with [`CONJUNCTION`]:
//!
//! ```
//! use repustate_core::query;
//!
//! let q = query::build(&["pos", "sports", "Location.city"]).unwrap();
//! assert_eq!(q, "sentiment:pos AND theme:sports AND Location.city");
//! ```

use crate::ValidationError;
use std::fmt;

pub const CONJUNCTION: &str = " AND ";

pub const THEMES: &[&str] = &[
    "arts",
    "automotive",
    "business",
    "education",
    "energy",
    "entertainment",
    "fashion",
    "finance",
    "food",
    "genders",
    "health",
    "law",
    "media",
    "military",
    "music",
    "politics",
    "religion",
    "science",
    "sex",
    "space",
    "sports",
    "technology",
    "transportation",
    "weather",
];

/// Accepted spellings, in listing order, with their short code.
const SENTIMENTS: &[(&str, &str)] = &[
    ("positive", "pos"),
    ("pos", "pos"),
    ("negative", "neg"),
    ("neg", "neg"),
    ("neutral", "neu"),
    ("neu", "neu"),
];

/// Classification paths are open-ended; nothing to enumerate.
pub const CLASSIFICATIONS: &[&str] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Theme,
    Sentiment,
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term<'a> {
    Theme(&'a str),
    /// Holds the short code (`pos`, `neg`, `neu`).
    Sentiment(&'static str),
    Classification(&'a str),
}

impl<'a> Term<'a> {
    /// First match wins: theme, then sentiment, then classification path.
    pub fn parse(token: &'a str) -> Option<Self> {
        if THEMES.iter().any(|t| *t == token) {
            Some(Term::Theme(token))
        } else if let Some(code) = sentiment_code(token) {
            Some(Term::Sentiment(code))
        } else if is_classification_path(token) {
            Some(Term::Classification(token))
        } else {
            None
        }
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Theme(_) => TermKind::Theme,
            Term::Sentiment(_) => TermKind::Sentiment,
            Term::Classification(_) => TermKind::Classification,
        }
    }

    pub fn render(&self, wildcard_classifications: bool) -> String {
        match self {
            Term::Classification(path) if wildcard_classifications && !path.ends_with('*') => {
                format!("{}*", path)
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Theme(name) => write!(f, "theme:{}", name),
            Term::Sentiment(code) => write!(f, "sentiment:{}", code),
            Term::Classification(path) => f.write_str(path),
        }
    }
}

pub fn classify(token: &str) -> Option<TermKind> {
    Term::parse(token).map(|t| t.kind())
}

pub fn sentiment_code(token: &str) -> Option<&'static str> {
    SENTIMENTS
        .iter()
        .find(|(spelling, _)| *spelling == token)
        .map(|(_, code)| *code)
}

/// Long display name for a sentiment short code; unknown codes pass through.
pub fn sentiment_name(code: &str) -> &str {
    match code {
        "pos" => "positive",
        "neg" => "negative",
        "neu" => "neutral",
        other => other,
    }
}

/// `Segment.segment[.segment...]`, the last segment may be `*`.
pub fn is_classification_path(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 {
        return false;
    }
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, seg)| {
        (i == last && *seg == "*")
            || (!seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'))
    })
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    wildcard_classifications: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render classification paths with a trailing `*` so sub-categories match.
    pub fn wildcard_classifications(mut self, enabled: bool) -> Self {
        self.wildcard_classifications = enabled;
        self
    }

    pub fn build<S: AsRef<str>>(&self, tokens: &[S]) -> Result<String, ValidationError> {
        let fragments = tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                Term::parse(token)
                    .map(|term| term.render(self.wildcard_classifications))
                    .ok_or_else(|| ValidationError::UnknownTerm(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(fragments.join(CONJUNCTION))
    }
}

pub fn build<S: AsRef<str>>(tokens: &[S]) -> Result<String, ValidationError> {
    QueryBuilder::new().build(tokens)
}

pub fn list_terms(
    themes: bool,
    sentiments: bool,
    classifications: bool,
    prefix: &str,
) -> Vec<&'static str> {
    let mut res = Vec::new();

    if themes {
        res.extend(filter(THEMES.iter().copied(), prefix));
    }
    if sentiments {
        res.extend(filter(SENTIMENTS.iter().map(|(spelling, _)| *spelling), prefix));
    }
    if classifications {
        res.extend(filter(CLASSIFICATIONS.iter().copied(), prefix));
    }

    res
}

/// Suggestions for the word being typed, skipping every catalog an earlier
/// token on the line already drew from.
pub fn completion_candidates<S: AsRef<str>>(previous: &[S], prefix: &str) -> Vec<&'static str> {
    let used: Vec<TermKind> = previous.iter().filter_map(|t| classify(t.as_ref())).collect();
    list_terms(
        !used.contains(&TermKind::Theme),
        !used.contains(&TermKind::Sentiment),
        !used.contains(&TermKind::Classification),
        prefix,
    )
}

fn filter<'a>(
    terms: impl Iterator<Item = &'static str> + 'a,
    prefix: &'a str,
) -> impl Iterator<Item = &'static str> + 'a {
    terms.filter(move |t| t.starts_with(prefix))
}
