use core_types::{Notification, SessionUser};
use thiserror::Error;

use crate::tags::TagSelector;

pub const MIN_TITLE_CHARS: usize = 15;
pub const MIN_CONTENT_CHARS: usize = 30;

/// First violated submission rule. Rules run in a fixed order and
/// evaluation stops at the first failure; nothing is aggregated.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("question title is shorter than {MIN_TITLE_CHARS} characters")]
    TitleTooShort,
    #[error("question details are shorter than {MIN_CONTENT_CHARS} characters")]
    ContentTooShort,
    #[error("question carries no tags")]
    NoTags,
    #[error("no authenticated user")]
    NotAuthenticated,
}

impl ValidationError {
    /// The toast surfaced for the violated rule.
    pub fn notification(self) -> Notification {
        match self {
            ValidationError::TitleTooShort => Notification::destructive(
                "Title too short",
                "Your question title must be at least 15 characters long.",
            ),
            ValidationError::ContentTooShort => Notification::destructive(
                "Question details too short",
                "Please provide more details about your question (at least 30 characters).",
            ),
            ValidationError::NoTags => Notification::destructive(
                "Tags required",
                "Please add at least one tag to your question.",
            ),
            ValidationError::NotAuthenticated => Notification::destructive(
                "Authentication required",
                "You must be logged in to submit a question.",
            ),
        }
    }
}

/// Checks a submission attempt against the fixed rule order: title length,
/// content length, tag presence, authentication. Pure check, no side
/// effects; lengths count characters of the trimmed text.
pub fn validate_submission(
    title: &str,
    content: &str,
    tags: &TagSelector,
    user: Option<&SessionUser>,
) -> Result<(), ValidationError> {
    if title.trim().chars().count() < MIN_TITLE_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    if content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ValidationError::ContentTooShort);
    }
    if tags.is_empty() {
        return Err(ValidationError::NoTags);
    }
    if user.is_none() {
        return Err(ValidationError::NotAuthenticated);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use core_types::SessionUser;
    use uuid::Uuid;

    use super::*;

    fn selector_with(names: &[&str]) -> TagSelector {
        let mut tags = TagSelector::new();
        for name in names {
            tags.add(*name).expect("within tag limit");
        }
        tags
    }

    fn user() -> SessionUser {
        SessionUser::new(Uuid::new_v4(), "lena")
    }

    const VALID_TITLE: &str = "How to center a div";
    const VALID_CONTENT: &str = "I tried margin auto but the child stays in the corner.";

    #[test]
    fn accepts_a_valid_submission() {
        let user = user();
        let tags = selector_with(&["css"]);
        assert_eq!(
            validate_submission(VALID_TITLE, VALID_CONTENT, &tags, Some(&user)),
            Ok(())
        );
    }

    #[test]
    fn first_violation_wins() {
        let tags = TagSelector::new();
        // everything is wrong at once, but the title rule reports first
        assert_eq!(
            validate_submission("short", "", &tags, None),
            Err(ValidationError::TitleTooShort)
        );
    }

    #[test]
    fn title_is_trimmed_before_counting() {
        let user = user();
        let tags = selector_with(&["css"]);
        let padded = format!("   {}   ", "x".repeat(14));
        assert_eq!(
            validate_submission(&padded, VALID_CONTENT, &tags, Some(&user)),
            Err(ValidationError::TitleTooShort)
        );
    }

    #[test]
    fn exactly_fifteen_title_chars_pass() {
        let user = user();
        let tags = selector_with(&["css"]);
        let title = "x".repeat(MIN_TITLE_CHARS);
        assert_eq!(
            validate_submission(&title, VALID_CONTENT, &tags, Some(&user)),
            Ok(())
        );
    }

    #[test]
    fn short_content_is_rejected_after_title() {
        let user = user();
        let tags = selector_with(&["css"]);
        assert_eq!(
            validate_submission(VALID_TITLE, "too little detail", &tags, Some(&user)),
            Err(ValidationError::ContentTooShort)
        );
    }

    #[test]
    fn missing_tags_are_rejected() {
        let user = user();
        let tags = TagSelector::new();
        assert_eq!(
            validate_submission(VALID_TITLE, VALID_CONTENT, &tags, Some(&user)),
            Err(ValidationError::NoTags)
        );
    }

    #[test]
    fn anonymous_users_are_rejected_last() {
        let tags = selector_with(&["css"]);
        assert_eq!(
            validate_submission(VALID_TITLE, VALID_CONTENT, &tags, None),
            Err(ValidationError::NotAuthenticated)
        );
    }

    #[test]
    fn notifications_carry_rule_specific_text() {
        let toast = ValidationError::NoTags.notification();
        assert_eq!(toast.title, "Tags required");
        assert_eq!(
            toast.severity,
            core_types::Severity::Destructive
        );
    }
}
