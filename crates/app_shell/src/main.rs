use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use auth_session::AuthSession;
use config::{AppConfig, ConfigStore};
use core_types::{
    Navigator, Notification, Notifier, QuestionStore, Route, Severity, TagCorpus,
};
use core_workflow::{Navbar, QuestionForm, SubmissionPipeline, SubmitOutcome};
use parking_lot::Mutex;
use storage_sqlite::SqliteQuestionStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Surfaces pipeline toasts on the log; a widget toolkit would render
/// these as transient toasts instead.
struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Normal => {
                info!(title = %notification.title, "{}", notification.message);
            }
            Severity::Destructive => {
                warn!(title = %notification.title, "{}", notification.message);
            }
        }
    }
}

/// Routes pipeline navigation requests into the navbar state.
struct NavbarNavigator(Arc<Mutex<Navbar>>);

impl Navigator for NavbarNavigator {
    fn navigate(&self, route: Route) {
        self.0.lock().navigate(route);
    }
}

fn main() {
    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    data_dir.push("circle");
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let config_store = ConfigStore::from_dir(data_dir.join("config"));
    let config = match config_store.load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err}");
            AppConfig::default()
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to create tokio runtime: {err}");
            return;
        }
    };

    if let Err(err) = runtime.block_on(run(config, &data_dir)) {
        error!("shell run failed: {err:#}");
        eprintln!("shell run failed: {err:#}");
    }
}

async fn run(config: AppConfig, data_dir: &Path) -> Result<()> {
    let store = SqliteQuestionStore::connect(data_dir.join(&config.database_file))
        .await
        .context("failed to open question database")?;
    let auth = AuthSession::restore(data_dir.join("session"))
        .context("failed to restore auth session")?;
    let corpus = config.tag_corpus();

    let navbar = Arc::new(Mutex::new(Navbar::new()));
    let cache = Arc::new(core_workflow::QuestionListCache::new());
    let pipeline = SubmissionPipeline::new(
        Arc::new(store) as Arc<dyn QuestionStore>,
        Arc::clone(&cache),
        Arc::new(LogNotifier),
        Arc::new(NavbarNavigator(Arc::clone(&navbar))),
    );

    // the demo shell signs in a local user; a real deployment would get
    // the signal from the auth provider
    if !auth.is_authenticated() {
        auth.sign_in(Uuid::new_v4(), "demo")?;
    }
    let user = auth.current_user();

    info!(
        links = navbar.lock().primary_links().len(),
        authenticated = auth.is_authenticated(),
        "navbar ready"
    );

    navbar.lock().navigate(Route::Ask);
    let mut form = QuestionForm::new();
    form.set_title("How do I keep a flexbox child centered on resize?");
    form.set_content(
        "The child div is centered on load but drifts once the viewport \
         shrinks below 600px. I expected align-items to keep it in place.",
    );
    pick_tag(&mut form, &corpus, "flex");
    pick_tag(&mut form, &corpus, "css");

    match pipeline.submit(&mut form, user.as_ref()).await {
        SubmitOutcome::Submitted(question) => {
            info!(question_id = %question.id, tags = question.tags.len(), "demo question stored");
        }
        outcome => {
            warn!(?outcome, "demo submission did not go through");
        }
    }

    let questions = pipeline.questions().await?;
    info!(
        count = questions.len(),
        route = navbar.lock().active().path(),
        "forum home refreshed"
    );

    Ok(())
}

/// Takes the first suggestion for `input`, falling back to the raw input
/// when the corpus has no match.
fn pick_tag(form: &mut QuestionForm, corpus: &TagCorpus, input: &str) {
    form.tags_mut().set_input(input);
    let suggestion = form
        .tags()
        .suggest(corpus)
        .next()
        .map(|tag| tag.name.clone());
    let choice = suggestion.unwrap_or_else(|| input.to_owned());
    if let Err(err) = form.tags_mut().add(choice) {
        warn!("tag not added: {err}");
    }
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "circle.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,app_shell=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
