//! Session configuration

use crate::error::{Error, Result};
use std::env;

/// Knobs for a session and its command issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub tag_prefix: String,
    pub root_separator: char,
    pub list_reference: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "A".to_string(),
            root_separator: '.',
            list_reference: String::new(),
        }
    }
}

impl SessionConfig {
    /// Load session configuration from environment variables
    ///
    /// Reads from `.env` file if present. All variables are optional:
    /// - `IMAP_TAG_PREFIX` (default: `A`)
    /// - `IMAP_SEPARATOR` (default: `.`)
    /// - `IMAP_LIST_REFERENCE` (default: empty)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            tag_prefix: env::var("IMAP_TAG_PREFIX").unwrap_or(defaults.tag_prefix),
            root_separator: match env::var("IMAP_SEPARATOR") {
                Ok(value) => parse_separator(&value)?,
                Err(_) => defaults.root_separator,
            },
            list_reference: env::var("IMAP_LIST_REFERENCE").unwrap_or(defaults.list_reference),
        })
    }
}

fn parse_separator(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) => Ok(sep),
        _ => Err(Error::Config(format!(
            "Invalid IMAP_SEPARATOR: expected one character, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.tag_prefix, "A");
        assert_eq!(config.root_separator, '.');
        assert!(config.list_reference.is_empty());
    }

    #[test]
    fn separator_must_be_one_char() {
        assert_eq!(parse_separator("/").unwrap(), '/');
        assert!(matches!(parse_separator(""), Err(Error::Config(_))));
        assert!(matches!(parse_separator("::"), Err(Error::Config(_))));
    }
}
