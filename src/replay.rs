//! Transcript replay
//!
//! A transcript is a JSON-lines file, one [`Step`] per line. Blank lines
//! and lines starting with `#` are skipped:
//!
//! ```text
//! # greeting, then list the top level
//! {"response": {"greeting": {"kind": "preauth"}}}
//! {"request_children": {"mailbox": null}}
//! {"response": {"list": {"mailbox": "INBOX", "separator": "."}}}
//! {"response": {"state_reply": {"tag": "A1", "kind": "ok"}}}
//! ```

use crate::error::{Error, Result};
use crate::response::ServerResponse;
use crate::session::Session;
use crate::source::CommandIssuer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Feed one response to the session.
    Response(ServerResponse),
    /// Issue a LIST for the named mailbox, or the root when `None`.
    RequestChildren {
        #[serde(default)]
        mailbox: Option<String>,
    },
    Authenticated,
    BeginSelect,
}

/// Parse a JSON-lines transcript.
///
/// # Errors
///
/// Returns [`Error::Script`] naming the first line that does not parse.
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| Error::Script(format!("line {}: {e}", n + 1)))
        })
        .collect()
}

/// Read and parse a transcript file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub async fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_script(&text)
}

/// Run `steps` against `session`, stopping at the first error.
///
/// # Errors
///
/// Returns the first session error, or [`Error::Script`] if a step names
/// a mailbox that is not in the tree.
pub fn run_script<I>(
    session: &mut Session,
    issuer: &mut I,
    steps: impl IntoIterator<Item = Step>,
) -> Result<()>
where
    I: CommandIssuer + ?Sized,
{
    for step in steps {
        debug!("Replaying {:?}", step);
        match step {
            Step::Response(response) => session.dispatch(response)?,
            Step::RequestChildren { mailbox } => {
                let node = match mailbox {
                    None => session.tree().root(),
                    Some(name) => session
                        .tree()
                        .find(&name)
                        .ok_or_else(|| Error::Script(format!("unknown mailbox {name:?}")))?,
                };
                session.request_children(issuer, node)?;
            }
            Step::Authenticated => session.authenticated()?,
            Step::BeginSelect => session.begin_select()?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::SequentialIssuer;
    use crate::state::ConnectionState;

    const SCRIPT: &str = r#"
# top level first
{"response": {"greeting": {"kind": "ok"}}}
"authenticated"
{"request_children": {"mailbox": null}}
{"response": {"list": {"mailbox": "INBOX", "separator": "."}}}
{"response": {"state_reply": {"tag": "A1", "kind": "ok"}}}

{"request_children": {"mailbox": "INBOX"}}
{"response": {"list": {"mailbox": "INBOX.", "separator": "."}}}
{"response": {"list": {"mailbox": "INBOX.Drafts", "separator": "."}}}
{"response": {"state_reply": {"tag": "A2", "kind": "ok"}}}
"#;

    #[test]
    fn parses_steps_and_skips_comments() {
        let steps = parse_script(SCRIPT).unwrap();
        assert_eq!(steps.len(), 9);
        assert_eq!(steps[1], Step::Authenticated);
        assert_eq!(steps[2], Step::RequestChildren { mailbox: None });
    }

    #[test]
    fn reports_the_failing_line() {
        let err = parse_script("\n{\"bogus\": 1}").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn replays_into_a_tree() {
        let mut session = Session::new();
        let mut issuer = SequentialIssuer::default();
        run_script(&mut session, &mut issuer, parse_script(SCRIPT).unwrap()).unwrap();

        assert_eq!(session.state(), ConnectionState::Authenticated);
        let inbox = session.tree().find("INBOX").unwrap();
        let kids = session.tree().children_of(inbox).unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(
            session.tree().node(kids[0]).unwrap().name(),
            Some("INBOX.Drafts")
        );
        assert_eq!(issuer.issued()[1].pattern, "INBOX.%");
    }

    #[test]
    fn unknown_mailbox_is_a_script_error() {
        let mut session = Session::new();
        let mut issuer = SequentialIssuer::default();
        let steps = vec![
            Step::Response(ServerResponse::greeting(crate::response::GreetingKind::Preauth)),
            Step::RequestChildren {
                mailbox: Some("Nope".into()),
            },
        ];
        let err = run_script(&mut session, &mut issuer, steps).unwrap_err();
        assert!(matches!(err, Error::Script(_)));
    }
}
