//! Collaborator interfaces
//!
//! The session core neither reads the socket nor writes commands itself.
//! The transport layer hands parsed responses in through a
//! [`ResponseSource`], sends LIST commands through a [`CommandIssuer`],
//! and gets told about tree changes and alerts through a
//! [`SessionObserver`].

use crate::error::{Error, Result};
use crate::response::{ServerResponse, Tag};
use std::collections::VecDeque;
use tracing::warn;

/// FIFO of parsed responses, fed by the wire parser.
pub trait ResponseSource {
    fn has_next(&self) -> bool;

    /// # Errors
    ///
    /// Returns [`Error::SourceExhausted`] when called while
    /// [`has_next`](Self::has_next) is `false`.
    fn take_next(&mut self) -> Result<ServerResponse>;
}

impl ResponseSource for VecDeque<ServerResponse> {
    fn has_next(&self) -> bool {
        !self.is_empty()
    }

    fn take_next(&mut self) -> Result<ServerResponse> {
        self.pop_front().ok_or(Error::SourceExhausted)
    }
}

/// Sends commands to the server and hands back their tags.
pub trait CommandIssuer {
    /// Send `LIST <reference> <pattern>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be sent.
    fn list(&mut self, reference: &str, pattern: &str) -> Result<Tag>;
}

/// Presentation-side notifications. None of these may fail.
///
/// Between [`on_tree_about_to_change`](Self::on_tree_about_to_change)
/// and [`on_tree_changed`](Self::on_tree_changed) every node id below
/// the refreshed node must be considered invalid.
pub trait SessionObserver: Send {
    fn on_tree_about_to_change(&mut self) {}

    fn on_tree_changed(&mut self) {}

    /// An `[ALERT]` the user has to see. Observers that cannot display
    /// alerts yet fall back to reporting that as a warning.
    fn on_alert(&mut self, text: &str) {
        warn!(alert = text, "Server alert not displayed");
        self.on_warning(&Error::Unimplemented {
            feature: "ALERT display",
        });
    }

    /// A non-fatal condition the session kept going after.
    fn on_warning(&mut self, warning: &Error) {
        warn!("{warning}");
    }
}

/// Observer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::StateKind;

    #[test]
    fn deque_is_fifo() {
        let mut source: VecDeque<ServerResponse> = VecDeque::new();
        source.push_back(ServerResponse::tagged("A1", StateKind::Ok));
        source.push_back(ServerResponse::tagged("A2", StateKind::Ok));

        assert!(source.has_next());
        assert_eq!(source.take_next().unwrap().tag(), Some(&Tag::from("A1")));
        assert_eq!(source.take_next().unwrap().tag(), Some(&Tag::from("A2")));
        assert!(!source.has_next());
    }

    #[test]
    fn empty_deque_fails() {
        let mut source: VecDeque<ServerResponse> = VecDeque::new();
        assert!(matches!(source.take_next(), Err(Error::SourceExhausted)));
    }

    #[derive(Default)]
    struct WarningSink(Vec<String>);

    impl SessionObserver for WarningSink {
        fn on_warning(&mut self, warning: &Error) {
            self.0.push(warning.to_string());
        }
    }

    #[test]
    fn default_alert_handling_surfaces_a_warning() {
        let mut sink = WarningSink::default();
        sink.on_alert("Server going down");
        assert_eq!(sink.0, vec!["Not implemented: ALERT display".to_string()]);
    }
}
