//! In-memory command issuer
//!
//! Hands out sequential tags (`A1`, `A2`, ...) and records every
//! command instead of writing it to a socket. Used for transcript
//! replay and as the issuer in tests.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::response::Tag;
use crate::source::CommandIssuer;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCommand {
    pub tag: Tag,
    pub reference: String,
    pub pattern: String,
}

impl fmt::Display for IssuedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} LIST \"{}\" \"{}\"",
            self.tag, self.reference, self.pattern
        )
    }
}

#[derive(Debug, Clone)]
pub struct SequentialIssuer {
    prefix: String,
    next: u32,
    issued: Vec<IssuedCommand>,
}

impl SequentialIssuer {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
            issued: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.tag_prefix.clone())
    }

    /// Every command sent so far, oldest first.
    #[must_use]
    pub fn issued(&self) -> &[IssuedCommand] {
        &self.issued
    }
}

impl Default for SequentialIssuer {
    fn default() -> Self {
        Self::new("A")
    }
}

impl CommandIssuer for SequentialIssuer {
    fn list(&mut self, reference: &str, pattern: &str) -> Result<Tag> {
        let tag = Tag::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        let command = IssuedCommand {
            tag: tag.clone(),
            reference: reference.to_string(),
            pattern: pattern.to_string(),
        };
        debug!(">>> {command}");
        self.issued.push(command);
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_sequential() {
        let mut issuer = SequentialIssuer::default();
        assert_eq!(issuer.list("", "%").unwrap(), Tag::from("A1"));
        assert_eq!(issuer.list("", "INBOX.%").unwrap(), Tag::from("A2"));
        assert_eq!(issuer.issued().len(), 2);
    }

    #[test]
    fn records_wire_form() {
        let mut issuer = SequentialIssuer::new("x");
        issuer.list("", "Work/%").unwrap();
        assert_eq!(issuer.issued()[0].to_string(), "x1 LIST \"\" \"Work/%\"");
    }
}
