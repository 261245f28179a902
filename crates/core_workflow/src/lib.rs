pub mod form;
pub mod navbar;
pub mod pipeline;
pub mod tags;
pub mod validate;

pub use form::{MAX_TITLE_CHARS, MutationStatus, QuestionForm, SubmitBlocked};
pub use navbar::{Navbar, PRIMARY_LINKS};
pub use pipeline::{
    QUESTIONS_CACHE_KEY, QuestionListCache, SubmissionPipeline, SubmitOutcome,
};
pub use tags::{MAX_SELECTED_TAGS, MAX_SUGGESTIONS, TagSelectionError, TagSelector};
pub use validate::{MIN_CONTENT_CHARS, MIN_TITLE_CHARS, ValidationError, validate_submission};
