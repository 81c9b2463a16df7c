#![forbid(unsafe_code)]

//! Bookmarks: ten numbered slots per figure.
//!
//! A mark pins a trace position together with its description in both text
//! styles, so it can be replayed without moving. Marks are written to
//! [`Storage`](crate::storage::Storage) after every change and read back when
//! the book is opened.
//!
//! # Failure Modes
//!
//! Storage errors never reach the user: a failed load starts an empty book
//! and a failed save keeps the in-memory marks. Both are logged at `warn`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::MarksConfig;
use crate::storage::SharedStorage;

/// Number of slots; valid slots are `0..SLOTS`.
pub const SLOTS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub trace_id: String,
    pub row: usize,
    pub col: usize,
    #[serde(rename = "terseText")]
    pub terse: String,
    #[serde(rename = "verboseText")]
    pub verbose: String,
}

/// Persisted document: the marks of one figure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FigureMarks {
    figure_id: String,
    marks: BTreeMap<u8, Mark>,
}

/// Whether [`MarkBook::set`] filled an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Marked,
    Replaced,
}

impl SetOutcome {
    #[must_use]
    pub fn message(self, slot: u8) -> String {
        match self {
            Self::Marked => format!("Marked position {slot}"),
            Self::Replaced => format!("Replaced mark {slot}"),
        }
    }
}

pub struct MarkBook {
    figure_id: String,
    key: String,
    persist: bool,
    marks: BTreeMap<u8, Mark>,
    storage: SharedStorage,
}

impl std::fmt::Debug for MarkBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkBook")
            .field("figure_id", &self.figure_id)
            .field("key", &self.key)
            .field("marks", &self.marks.len())
            .finish_non_exhaustive()
    }
}

impl MarkBook {
    /// Open the book of `figure_id`, loading saved marks when persistence is
    /// on. Marks for another figure or outside the slot range are dropped.
    pub fn open(figure_id: &str, config: &MarksConfig, storage: SharedStorage) -> Self {
        let key = config.key(figure_id);
        let mut marks = BTreeMap::new();
        if config.persist {
            let loaded = storage.borrow().load(&key);
            match loaded {
                Ok(Some(doc)) => match serde_json::from_value::<FigureMarks>(doc) {
                    Ok(saved) if saved.figure_id == figure_id => {
                        marks = saved.marks;
                        marks.retain(|slot, _| *slot < SLOTS);
                    }
                    Ok(saved) => {
                        tracing::warn!(%key, stored = %saved.figure_id, "marks belong to another figure");
                    }
                    Err(err) => tracing::warn!(%key, %err, "unreadable marks"),
                },
                Ok(None) => {}
                Err(err) => tracing::warn!(%key, %err, "failed to load marks"),
            }
        }
        tracing::debug!(figure_id, count = marks.len(), "mark book opened");
        Self {
            figure_id: figure_id.to_owned(),
            key,
            persist: config.persist,
            marks,
            storage,
        }
    }

    #[must_use]
    pub fn is_valid_slot(slot: u8) -> bool {
        slot < SLOTS
    }

    #[must_use]
    pub fn get(&self, slot: u8) -> Option<&Mark> {
        self.marks.get(&slot)
    }

    /// Occupied slots in ascending order.
    pub fn marks(&self) -> impl Iterator<Item = (u8, &Mark)> {
        self.marks.iter().map(|(slot, mark)| (*slot, mark))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Store `mark` in `slot`. `None` for a slot outside `0..SLOTS`.
    pub fn set(&mut self, slot: u8, mark: Mark) -> Option<SetOutcome> {
        if !Self::is_valid_slot(slot) {
            return None;
        }
        let outcome = match self.marks.insert(slot, mark) {
            Some(_) => SetOutcome::Replaced,
            None => SetOutcome::Marked,
        };
        tracing::info!(figure_id = %self.figure_id, slot, ?outcome, "mark set");
        self.save();
        Some(outcome)
    }

    pub fn remove(&mut self, slot: u8) -> Option<Mark> {
        let removed = self.marks.remove(&slot);
        if removed.is_some() {
            self.save();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.marks.clear();
        if !self.persist {
            return;
        }
        if let Err(err) = self.storage.borrow_mut().remove(&self.key) {
            tracing::warn!(key = %self.key, %err, "failed to remove marks");
        }
    }

    fn save(&self) {
        if !self.persist {
            return;
        }
        let doc = FigureMarks {
            figure_id: self.figure_id.clone(),
            marks: self.marks.clone(),
        };
        let result = serde_json::to_value(&doc)
            .map_err(crate::error::EngineError::from)
            .and_then(|json| self.storage.borrow_mut().save(&self.key, &json));
        if let Err(err) = result {
            tracing::warn!(key = %self.key, %err, "failed to save marks");
        }
    }
}
