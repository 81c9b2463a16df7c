#![forbid(unsafe_code)]

//! Narration sink: where announcements go.
//!
//! The engine never speaks. It hands finished strings to a [`NarrationSink`]
//! (a screen-reader live region, a speech bridge, a log). Several observers
//! and the controller share one sink through [`SharedNarration`].

use std::cell::RefCell;
use std::rc::Rc;

/// Receives announcement strings.
pub trait NarrationSink {
    fn announce(&mut self, message: &str);
}

/// Sink shared by every announcer on the UI thread.
pub type SharedNarration = Rc<RefCell<dyn NarrationSink>>;

/// Keeps every announcement in order.
#[derive(Debug, Default, Clone)]
pub struct BufferedNarration {
    messages: Vec<String>,
}

impl BufferedNarration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer wrapped for sharing.
    #[must_use]
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// Take every buffered message.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl NarrationSink for BufferedNarration {
    fn announce(&mut self, message: &str) {
        tracing::trace!(message, "announce");
        self.messages.push(message.to_owned());
    }
}

/// Announce through a shared sink, skipping empty messages.
///
/// A sink that is already borrowed (re-entrant announce) drops the message
/// with a warning.
pub fn announce(sink: &SharedNarration, message: &str) {
    if message.is_empty() {
        return;
    }
    match sink.try_borrow_mut() {
        Ok(mut sink) => sink.announce(message),
        Err(_) => tracing::warn!(message, "narration sink busy; message dropped"),
    }
}
