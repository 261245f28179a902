use core_types::{Author, Question, SessionUser};
use thiserror::Error;

use crate::tags::TagSelector;
use crate::validate::{self, ValidationError};

pub const MAX_TITLE_CHARS: usize = 150;

/// Why a submission attempt could not enter flight.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SubmitBlocked {
    #[error("a submission is already in flight for this form")]
    AlreadyInFlight,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Ask-question form state.
///
/// An explicit finite state record, mutated only through the transition
/// methods below and independent of any rendering layer. One instance per
/// form; discarded values come back on the next mount as a fresh default.
#[derive(Debug, Clone, Default)]
pub struct QuestionForm {
    title: String,
    content: String,
    tags: TagSelector,
    status: MutationStatus,
}

impl QuestionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tags(&self) -> &TagSelector {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagSelector {
        &mut self.tags
    }

    pub fn status(&self) -> MutationStatus {
        self.status
    }

    /// Replaces the title, hard-truncated to 150 characters.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let mut title = title.into();
        if let Some((cut, _)) = title.char_indices().nth(MAX_TITLE_CHARS) {
            title.truncate(cut);
        }
        self.title = title;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Validates the form and, when it passes, assembles the candidate
    /// question and moves the form into flight. Rules run in fixed order;
    /// a rejected attempt leaves every field untouched and the form idle.
    pub fn begin_submit(&mut self, user: Option<&SessionUser>) -> Result<Question, SubmitBlocked> {
        if self.status == MutationStatus::Submitting {
            return Err(SubmitBlocked::AlreadyInFlight);
        }

        validate::validate_submission(&self.title, &self.content, &self.tags, user)?;
        let Some(user) = user else {
            // unreachable past validation, but kept as a transition guard
            return Err(ValidationError::NotAuthenticated.into());
        };

        let candidate = Question::candidate(
            self.title.clone(),
            self.content.clone(),
            self.tags.to_pending_tags(),
            Author::snapshot(user),
        );
        self.status = MutationStatus::Submitting;
        Ok(candidate)
    }

    /// Records a persisted create call: the draft is discarded.
    pub fn complete_success(&mut self) {
        self.title.clear();
        self.content.clear();
        self.tags.clear();
        self.status = MutationStatus::Succeeded;
    }

    /// Records a failed create call: every field survives for retry.
    pub fn complete_failure(&mut self) {
        self.status = MutationStatus::Failed;
    }

    /// Returns the form to rest once the caller has surfaced the outcome.
    pub fn settle(&mut self) {
        if matches!(
            self.status,
            MutationStatus::Succeeded | MutationStatus::Failed
        ) {
            self.status = MutationStatus::Idle;
        }
    }

    /// Drops the draft entirely, e.g. on navigation away from the form.
    pub fn reset(&mut self) {
        self.title.clear();
        self.content.clear();
        self.tags.clear();
        self.status = MutationStatus::Idle;
    }
}
