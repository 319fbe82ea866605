//! Observer that records notifications
//!
//! The session owns its observer, so the recording is shared through an
//! `Arc<Mutex<_>>`: keep a clone in the test and hand the other to the
//! session.

use mailbox_session::{Error, SessionObserver};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AboutToChange,
    Changed,
    Alert(String),
    Warning(String),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<Event>>>,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl SessionObserver for RecordingObserver {
    fn on_tree_about_to_change(&mut self) {
        self.push(Event::AboutToChange);
    }

    fn on_tree_changed(&mut self) {
        self.push(Event::Changed);
    }

    fn on_alert(&mut self, text: &str) {
        self.push(Event::Alert(text.to_string()));
    }

    fn on_warning(&mut self, warning: &Error) {
        self.push(Event::Warning(warning.to_string()));
    }
}
