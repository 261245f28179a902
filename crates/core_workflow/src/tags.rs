use core_types::{Notification, Tag, TagCorpus};
use indexmap::IndexSet;
use thiserror::Error;

pub const MAX_SELECTED_TAGS: usize = 5;
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TagSelectionError {
    #[error("a question can carry at most {MAX_SELECTED_TAGS} tags")]
    LimitReached,
}

impl TagSelectionError {
    pub fn notification(self) -> Notification {
        match self {
            TagSelectionError::LimitReached => Notification::destructive(
                "Tag limit reached",
                "You can only add up to 5 tags per question.",
            ),
        }
    }
}

/// In-progress tag selection for a question draft.
///
/// Identity is the stored tag name, case sensitive; insertion order is
/// preserved for display. The synthetic ids handed out at submission time
/// play no part in matching or dedup.
#[derive(Debug, Clone, Default)]
pub struct TagSelector {
    selected: IndexSet<String>,
    input: String,
}

impl TagSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Up to five corpus tags whose name contains the current buffer,
    /// case-insensitively, in corpus order, skipping names already
    /// selected. An empty buffer suggests nothing.
    pub fn suggest<'a>(&'a self, corpus: &'a TagCorpus) -> impl Iterator<Item = &'a Tag> + 'a {
        let needle = self.input.to_lowercase();
        corpus
            .iter()
            .filter(move |tag| !needle.is_empty() && tag.name.to_lowercase().contains(&needle))
            .filter(|tag| !self.selected.contains(tag.name.as_str()))
            .take(MAX_SUGGESTIONS)
    }

    /// Adds a tag by name and clears the input buffer. A duplicate add is
    /// a no-op that still clears the buffer. A full selection refuses the
    /// add and leaves selection and buffer untouched.
    pub fn add(&mut self, name: impl Into<String>) -> Result<(), TagSelectionError> {
        if self.selected.len() >= MAX_SELECTED_TAGS {
            return Err(TagSelectionError::LimitReached);
        }
        self.selected.insert(name.into());
        self.input.clear();
        Ok(())
    }

    /// Removes a selected tag; unknown names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.selected.shift_remove(name);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.input.clear();
    }

    /// Selected names with their synthetic per-session ids, in insertion
    /// order, as they appear on a candidate question.
    pub fn to_pending_tags(&self) -> Vec<Tag> {
        self.selected
            .iter()
            .enumerate()
            .map(|(index, name)| Tag::pending(index, name.clone()))
            .collect()
    }
}
