//! Parsed server responses
//!
//! These are the structured objects handed over by the wire parser.
//! Every variant is immutable once built; the session takes ownership
//! of one response per dispatch call and drops it afterwards.
//!
//! `Display` renders a response roughly the way it looked on the wire,
//! which is what ends up in logs and error messages.

use crate::flag::Flag;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Correlation handle of an issued command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Status of the initial server greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreetingKind {
    Ok,
    Preauth,
    Bye,
}

/// Status of a state reply (RFC 3501 section 7.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Ok,
    No,
    Bad,
    Preauth,
    Bye,
}

impl StateKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::No => "NO",
            Self::Bad => "BAD",
            Self::Preauth => "PREAUTH",
            Self::Bye => "BYE",
        }
    }
}

impl From<GreetingKind> for StateKind {
    fn from(kind: GreetingKind) -> Self {
        match kind {
            GreetingKind::Ok => Self::Ok,
            GreetingKind::Preauth => Self::Preauth,
            GreetingKind::Bye => Self::Bye,
        }
    }
}

/// Bracketed response code attached to a state reply or greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCode {
    Alert(String),
    Capabilities(Vec<String>),
    /// Any code the session core does not act on, kept by name.
    Other(String),
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert(text) => write!(f, "[ALERT] {text}"),
            Self::Capabilities(caps) => write!(f, "[CAPABILITY {}]", caps.join(" ")),
            Self::Other(name) => write!(f, "[{name}]"),
        }
    }
}

/// One untagged `LIST` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Full mailbox name, including the parent's path.
    pub mailbox: String,
    pub separator: char,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl ListEntry {
    #[must_use]
    pub fn new(mailbox: impl Into<String>, separator: char) -> Self {
        Self {
            mailbox: mailbox.into(),
            separator,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    Exists,
    Recent,
    Expunge,
}

impl NumberKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "EXISTS",
            Self::Recent => "RECENT",
            Self::Expunge => "EXPUNGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub prefix: String,
    pub separator: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerResponse {
    /// The very first response on a connection.
    Greeting {
        kind: GreetingKind,
        #[serde(default)]
        code: Option<ResponseCode>,
    },
    /// OK/NO/BAD/PREAUTH/BYE, tagged or untagged.
    StateReply {
        #[serde(default)]
        tag: Option<Tag>,
        kind: StateKind,
        #[serde(default)]
        code: Option<ResponseCode>,
        #[serde(default)]
        text: String,
    },
    Capability(Vec<String>),
    List(ListEntry),
    Flags(Vec<Flag>),
    NumberResponse { kind: NumberKind, number: u32 },
    Search(Vec<u32>),
    Status {
        mailbox: String,
        items: BTreeMap<String, u64>,
    },
    Fetch {
        number: u32,
        items: BTreeMap<String, String>,
    },
    Namespace {
        personal: Vec<NamespaceEntry>,
        other: Vec<NamespaceEntry>,
        shared: Vec<NamespaceEntry>,
    },
}

impl ServerResponse {
    #[must_use]
    pub const fn greeting(kind: GreetingKind) -> Self {
        Self::Greeting { kind, code: None }
    }

    #[must_use]
    pub fn tagged(tag: impl Into<Tag>, kind: StateKind) -> Self {
        Self::StateReply {
            tag: Some(tag.into()),
            kind,
            code: None,
            text: String::new(),
        }
    }

    #[must_use]
    pub const fn untagged(kind: StateKind) -> Self {
        Self::StateReply {
            tag: None,
            kind,
            code: None,
            text: String::new(),
        }
    }

    #[must_use]
    pub fn list(mailbox: impl Into<String>, separator: char) -> Self {
        Self::List(ListEntry::new(mailbox, separator))
    }

    /// Attach a response code to a greeting or state reply. Other
    /// variants are returned unchanged.
    #[must_use]
    pub fn with_code(mut self, new_code: ResponseCode) -> Self {
        if let Self::Greeting { code, .. } | Self::StateReply { code, .. } = &mut self {
            *code = Some(new_code);
        }
        self
    }

    /// The response code, if this variant can carry one and does.
    #[must_use]
    pub const fn code(&self) -> Option<&ResponseCode> {
        match self {
            Self::Greeting { code, .. } | Self::StateReply { code, .. } => code.as_ref(),
            _ => None,
        }
    }

    /// The tag of a tagged completion. An empty tag counts as untagged.
    #[must_use]
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Self::StateReply { tag: Some(tag), .. } if !tag.is_empty() => Some(tag),
            _ => None,
        }
    }

    /// Short name of the response kind, as used on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Greeting { .. } => "greeting",
            Self::StateReply { kind, .. } => kind.as_str(),
            Self::Capability(_) => "CAPABILITY",
            Self::List(_) => "LIST",
            Self::Flags(_) => "FLAGS",
            Self::NumberResponse { kind, .. } => kind.as_str(),
            Self::Search(_) => "SEARCH",
            Self::Status { .. } => "STATUS",
            Self::Fetch { .. } => "FETCH",
            Self::Namespace { .. } => "NAMESPACE",
        }
    }
}

fn write_namespaces(f: &mut fmt::Formatter<'_>, entries: &[NamespaceEntry]) -> fmt::Result {
    if entries.is_empty() {
        return f.write_str("NIL");
    }
    f.write_str("(")?;
    for entry in entries {
        match entry.separator {
            Some(sep) => write!(f, "(\"{}\" \"{sep}\")", entry.prefix)?,
            None => write!(f, "(\"{}\" NIL)", entry.prefix)?,
        }
    }
    f.write_str(")")
}

impl fmt::Display for ServerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greeting { kind, code } => {
                write!(f, "* {}", StateKind::from(*kind).as_str())?;
                if let Some(code) = code {
                    write!(f, " {code}")?;
                }
                Ok(())
            }
            Self::StateReply {
                tag,
                kind,
                code,
                text,
            } => {
                match tag {
                    Some(tag) if !tag.is_empty() => write!(f, "{tag} {}", kind.as_str())?,
                    _ => write!(f, "* {}", kind.as_str())?,
                }
                if let Some(code) = code {
                    write!(f, " {code}")?;
                }
                if !text.is_empty() {
                    write!(f, " {text}")?;
                }
                Ok(())
            }
            Self::Capability(caps) => write!(f, "* CAPABILITY {}", caps.join(" ")),
            Self::List(entry) => write!(
                f,
                "* LIST ({}) \"{}\" \"{}\"",
                entry.attributes.join(" "),
                entry.separator,
                entry.mailbox
            ),
            Self::Flags(flags) => {
                let flags: Vec<&str> = flags.iter().map(Flag::as_imap_str).collect();
                write!(f, "* FLAGS ({})", flags.join(" "))
            }
            Self::NumberResponse { kind, number } => write!(f, "* {number} {}", kind.as_str()),
            Self::Search(numbers) => {
                f.write_str("* SEARCH")?;
                for n in numbers {
                    write!(f, " {n}")?;
                }
                Ok(())
            }
            Self::Status { mailbox, items } => {
                let items: Vec<String> = items.iter().map(|(k, v)| format!("{k} {v}")).collect();
                write!(f, "* STATUS \"{mailbox}\" ({})", items.join(" "))
            }
            Self::Fetch { number, items } => {
                let items: Vec<String> = items.iter().map(|(k, v)| format!("{k} {v}")).collect();
                write!(f, "* {number} FETCH ({})", items.join(" "))
            }
            Self::Namespace {
                personal,
                other,
                shared,
            } => {
                f.write_str("* NAMESPACE ")?;
                write_namespaces(f, personal)?;
                f.write_str(" ")?;
                write_namespaces(f, other)?;
                f.write_str(" ")?;
                write_namespaces(f, shared)
            }
        }
    }
}
