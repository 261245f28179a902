use std::sync::Arc;

use anyhow::Result;
use core_types::{
    Navigator, Notification, Notifier, Question, QuestionStore, Route, SessionUser,
};
use query_cache::ListCache;
use tracing::{error, info};

use crate::form::{QuestionForm, SubmitBlocked};
use crate::validate::ValidationError;

/// Key the listing views cache the question list under.
pub const QUESTIONS_CACHE_KEY: &str = "questions";

/// Shared handle to the cached question list.
pub type QuestionListCache = ListCache<&'static str, Vec<Question>>;

/// Outcome of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The candidate was persisted: the cached list was invalidated, the
    /// form reset, and navigation to the forum home requested.
    Submitted(Question),
    /// A validation rule rejected the attempt before any network call.
    Rejected(ValidationError),
    /// The remote create call failed; the draft survives for retry.
    Failed,
    /// A submission was already in flight for this form; nothing happened.
    Ignored,
}

/// Orchestrates the question-submission workflow: read form state,
/// validate, build the candidate, run the create call, then reconcile the
/// shared list cache and the form with the outcome.
pub struct SubmissionPipeline {
    store: Arc<dyn QuestionStore>,
    cache: Arc<QuestionListCache>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn QuestionStore>,
        cache: Arc<QuestionListCache>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
            navigator,
        }
    }

    /// Runs the whole workflow for `form`. Validation failures never reach
    /// the store; a remote failure leaves the form and the cached list
    /// exactly as they were.
    pub async fn submit(
        &self,
        form: &mut QuestionForm,
        user: Option<&SessionUser>,
    ) -> SubmitOutcome {
        let candidate = match form.begin_submit(user) {
            Ok(candidate) => candidate,
            Err(SubmitBlocked::AlreadyInFlight) => return SubmitOutcome::Ignored,
            Err(SubmitBlocked::Invalid(rule)) => {
                self.notifier.notify(rule.notification());
                return SubmitOutcome::Rejected(rule);
            }
        };

        match self.store.save_question(&candidate).await {
            Ok(saved) => {
                // the next read refetches the authoritative list; the new
                // record is never spliced into the cache locally
                self.cache.invalidate(&QUESTIONS_CACHE_KEY);
                form.complete_success();
                self.notifier.notify(Notification::normal(
                    "Question submitted",
                    "Your question has been posted successfully.",
                ));
                form.settle();
                info!(question_id = %saved.id, "question submitted");
                self.navigator.navigate(Route::Home);
                SubmitOutcome::Submitted(saved)
            }
            Err(error) => {
                error!(%error, "failed to save question");
                form.complete_failure();
                self.notifier.notify(Notification::destructive(
                    "Error submitting question",
                    "There was an error posting your question. Please try again.",
                ));
                form.settle();
                SubmitOutcome::Failed
            }
        }
    }

    /// Cached question list, fetching from the store when stale.
    pub async fn questions(&self) -> Result<Arc<Vec<Question>>> {
        self.cache
            .get_with(QUESTIONS_CACHE_KEY, || self.store.fetch_questions())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use anyhow::bail;
    use async_trait::async_trait;
    use core_types::Severity;
    use parking_lot::Mutex;
    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    struct StubStore {
        saved: Mutex<Vec<Question>>,
        fetches: AtomicUsize,
        saves: AtomicUsize,
        fail_saves: AtomicBool,
    }

    #[async_trait]
    impl QuestionStore for StubStore {
        async fn fetch_questions(&self) -> Result<Vec<Question>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.saved.lock().clone())
        }

        async fn save_question(&self, question: &Question) -> Result<Question> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves.load(Ordering::SeqCst) {
                bail!("create endpoint returned 503");
            }
            self.saved.lock().push(question.clone());
            Ok(question.clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().push(notification);
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<Route>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.visited.lock().push(route);
        }
    }

    struct Harness {
        store: Arc<StubStore>,
        cache: Arc<QuestionListCache>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
        pipeline: SubmissionPipeline,
    }

    fn harness() -> Harness {
        let store = Arc::new(StubStore::default());
        let cache = Arc::new(QuestionListCache::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let pipeline = SubmissionPipeline::new(
            Arc::clone(&store) as Arc<dyn QuestionStore>,
            Arc::clone(&cache),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );
        Harness {
            store,
            cache,
            notifier,
            navigator,
            pipeline,
        }
    }

    fn filled_form() -> QuestionForm {
        let mut form = QuestionForm::new();
        form.set_title("How to center a div with Flexbox?");
        form.set_content("I tried margin auto but the child keeps hugging the top left corner.");
        form.tags_mut().add("css").expect("add tag");
        form
    }

    fn user() -> SessionUser {
        SessionUser::new(Uuid::new_v4(), "lena")
    }

    #[tokio::test]
    async fn successful_submission_resets_invalidates_and_navigates() {
        let h = harness();
        let user = user();
        // warm the cache so the invalidation is observable
        h.pipeline.questions().await.expect("warm cache");
        assert_eq!(h.store.fetches.load(Ordering::SeqCst), 1);

        let mut form = filled_form();
        let outcome = h.pipeline.submit(&mut form, Some(&user)).await;

        let saved = match outcome {
            SubmitOutcome::Submitted(question) => question,
            other => panic!("expected Submitted, got {other:?}"),
        };
        assert_eq!(saved.tags[0].id, "temp-0");

        // form discarded the draft and settled
        assert_eq!(form.title(), "");
        assert_eq!(form.content(), "");
        assert!(form.tags().is_empty());
        assert_eq!(form.status(), crate::form::MutationStatus::Idle);

        // cache was invalidated exactly once: the warmed entry is gone and
        // the next read refetches
        assert!(h.cache.peek(&QUESTIONS_CACHE_KEY).is_none());
        let questions = h.pipeline.questions().await.expect("refetch");
        assert_eq!(h.store.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(questions.len(), 1);

        assert_eq!(h.navigator.visited.lock().as_slice(), [Route::Home]);

        let toasts = h.notifier.seen.lock();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "Question submitted");
        assert_eq!(toasts[0].severity, Severity::Normal);
    }

    #[tokio::test]
    async fn short_title_is_rejected_before_any_network_call() {
        let h = harness();
        let user = user();
        let mut form = filled_form();
        form.set_title("short");

        let outcome = h.pipeline.submit(&mut form, Some(&user)).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::TitleTooShort)
        ));
        assert_eq!(h.store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(form.title(), "short");

        let toasts = h.notifier.seen.lock();
        assert_eq!(toasts[0].title, "Title too short");
        assert_eq!(toasts[0].severity, Severity::Destructive);
    }

    #[tokio::test]
    async fn zero_tags_is_rejected_before_any_network_call() {
        let h = harness();
        let user = user();
        let mut form = filled_form();
        form.tags_mut().remove("css");

        let outcome = h.pipeline.submit(&mut form, Some(&user)).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::NoTags)
        ));
        assert_eq!(h.store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_fields_without_a_user_are_rejected() {
        let h = harness();
        let mut form = filled_form();

        let outcome = h.pipeline.submit(&mut form, None).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::NotAuthenticated)
        ));
        assert_eq!(h.store.saves.load(Ordering::SeqCst), 0);
        assert!(h.navigator.visited.lock().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_preserves_form_and_cache() {
        let h = harness();
        let user = user();
        h.pipeline.questions().await.expect("warm cache");
        h.store.fail_saves.store(true, Ordering::SeqCst);

        let mut form = filled_form();
        let outcome = h.pipeline.submit(&mut form, Some(&user)).await;
        assert!(matches!(outcome, SubmitOutcome::Failed));

        // the draft survives for retry and the form is idle again
        assert_eq!(form.title(), "How to center a div with Flexbox?");
        assert_eq!(form.tags().len(), 1);
        assert_eq!(form.status(), crate::form::MutationStatus::Idle);

        // the warmed cache entry was left alone
        assert!(h.cache.peek(&QUESTIONS_CACHE_KEY).is_some());
        assert!(h.navigator.visited.lock().is_empty());

        let toasts = h.notifier.seen.lock();
        assert_eq!(toasts[0].title, "Error submitting question");
        assert_eq!(toasts[0].severity, Severity::Destructive);

        // a retry after the outage goes through
        drop(toasts);
        h.store.fail_saves.store(false, Ordering::SeqCst);
        let outcome = h.pipeline.submit(&mut form, Some(&user)).await;
        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn questions_reads_through_the_cache() {
        let h = harness();
        h.pipeline.questions().await.expect("first read");
        h.pipeline.questions().await.expect("second read");
        assert_eq!(h.store.fetches.load(Ordering::SeqCst), 1);
    }
}
