use crate::ValidationError;
use regex::Regex;
use std::sync::OnceLock;

/// Language codes the demo server analyzes.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar", "da", "de", "en", "es", "fi", "fr", "he", "id", "it", "ja", "ko", "nl", "no", "pl",
    "pt", "ru", "sv", "th", "tr", "ur", "vi", "zh",
];

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]*[a-zA-Z][a-zA-Z0-9_@.]*$").expect("username pattern is valid")
    })
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername(username.to_string()))
    }
}

/// `None` means "let the server pick"; a given code must be supported.
pub fn validate_language(lang: Option<&str>) -> Result<Option<&str>, ValidationError> {
    match lang {
        None => Ok(None),
        Some(code) if SUPPORTED_LANGUAGES.iter().any(|l| *l == code) => Ok(Some(code)),
        Some(code) => Err(ValidationError::UnsupportedLanguage(code.to_string())),
    }
}

pub fn format_exit_code(code: u8) -> String {
    match code {
        0 => "ok".to_string(),
        2 => "invalid args".to_string(),
        3 => "not registered".to_string(),
        4 => "server unavailable".to_string(),
        6 => "internal error".to_string(),
        _ => format!("unknown ({})", code),
    }
}

pub const EXIT_OK: u8 = 0;
pub const EXIT_INVALID_ARGS: u8 = 2;
pub const EXIT_NOT_REGISTERED: u8 = 3;
pub const EXIT_SERVER_UNAVAILABLE: u8 = 4;
pub const EXIT_INTERNAL_ERROR: u8 = 6;
