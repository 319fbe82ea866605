//! IMAP message flags
//!
//! Typed flags as announced by the server in an untagged `FLAGS`
//! response while a mailbox is being selected. System flags are
//! matched case-insensitively; anything else is kept verbatim as a
//! keyword.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A flag announced for a mailbox.
///
/// # Examples
///
/// ```
/// use mailbox_session::Flag;
///
/// assert_eq!(Flag::from("\\seen"), Flag::Seen);
/// assert_eq!(Flag::from("$Junk"), Flag::Keyword("$Junk".to_string()));
/// assert_eq!(Flag::Recent.to_string(), "\\Recent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Flag {
    Seen,
    Answered,
    Flagged,
    Deleted,
    Draft,
    /// Session-only flag, never settable by the client.
    Recent,
    /// `\*` in PERMANENTFLAGS: new keywords may be created.
    MayCreate,
    Keyword(String),
}

impl Flag {
    /// The IMAP wire representation of this flag.
    #[must_use]
    pub fn as_imap_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::MayCreate => "\\*",
            Self::Keyword(kw) => kw,
        }
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        !matches!(self, Self::Keyword(_))
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_imap_str())
    }
}

impl From<&str> for Flag {
    fn from(s: &str) -> Self {
        let Some(system) = s.strip_prefix('\\') else {
            return Self::Keyword(s.to_string());
        };
        match system.to_ascii_lowercase().as_str() {
            "seen" => Self::Seen,
            "answered" => Self::Answered,
            "flagged" => Self::Flagged,
            "deleted" => Self::Deleted,
            "draft" => Self::Draft,
            "recent" => Self::Recent,
            "*" => Self::MayCreate,
            _ => Self::Keyword(s.to_string()),
        }
    }
}

impl From<String> for Flag {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Flag> for String {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Keyword(kw) => kw,
            other => other.as_imap_str().to_string(),
        }
    }
}
