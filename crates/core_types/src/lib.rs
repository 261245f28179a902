use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type QuestionId = Uuid;
pub type AnswerId = Uuid;
pub type UserId = Uuid;
pub type TagId = String;

/// Catalog entry. `count` is the corpus usage frequency and is
/// informational only; suggestion order follows the corpus itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub count: u32,
}

impl Tag {
    pub fn corpus(id: impl Into<TagId>, name: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            count,
        }
    }

    /// Synthetic per-session tag assigned to a selected name when the
    /// candidate question is assembled.
    pub fn pending(index: usize, name: impl Into<String>) -> Self {
        Self {
            id: format!("temp-{index}"),
            name: name.into(),
            count: 1,
        }
    }
}

/// The static catalog of known tags available for selection.
#[derive(Debug, Clone, Default)]
pub struct TagCorpus {
    tags: Vec<Tag>,
}

impl TagCorpus {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

/// Snapshot of a user as it appears on a question or answer. Captured by
/// value at submission time; later profile changes do not flow back into
/// records built from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub reputation: u32,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub join_date: DateTime<Utc>,
}

impl Author {
    pub fn snapshot(user: &SessionUser) -> Self {
        let username = user.metadata.username.clone();
        Self {
            id: user.id,
            name: username.clone().unwrap_or_else(|| "Anonymous".to_owned()),
            username: username.unwrap_or_else(|| "anonymous".to_owned()),
            reputation: 1,
            avatar: None,
            role: UserRole::User,
            join_date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub content: String,
    pub author: Author,
    pub votes: i64,
    pub is_best: bool,
    pub created_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(question_id: QuestionId, author: Author, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_id,
            content: content.into(),
            author,
            votes: 0,
            is_best: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub content: String,
    pub tags: Vec<Tag>,
    pub author: Author,
    pub votes: i64,
    pub answer_count: u32,
    pub views: u64,
    pub has_best_answer: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Question {
    /// Candidate record assembled from form state immediately before the
    /// create call. Counters start at zero, the answer list empty, and the
    /// id is assigned client-side so the stored row can be matched back.
    pub fn candidate(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<Tag>,
        author: Author,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            tags,
            author,
            votes: 0,
            answer_count: 0,
            views: 0,
            has_best_answer: false,
            created_at: Utc::now(),
            answers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// The signal the external auth collaborator provides: who is signed in,
/// if anyone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub metadata: UserMetadata,
}

impl SessionUser {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            metadata: UserMetadata {
                username: Some(username.into()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Questions,
    Tags,
    Users,
    Ask,
    Login,
    Signup,
    Profile,
    Settings,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Questions => "/questions",
            Route::Tags => "/tags",
            Route::Users => "/users/popular",
            Route::Ask => "/ask",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Profile => "/profile",
            Route::Settings => "/settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Questions => "Questions",
            Route::Tags => "Tags",
            Route::Users => "Users",
            Route::Ask => "Ask Question",
            Route::Login => "Log in",
            Route::Signup => "Sign up",
            Route::Profile => "Your Profile",
            Route::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Destructive,
}

/// Transient user-facing toast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn normal(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Normal,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn destructive(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Destructive,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// External data-access boundary for the question list.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Authoritative question list used to (re)populate the shared cache.
    async fn fetch_questions(&self) -> Result<Vec<Question>>;

    /// Persists a candidate and returns the stored record. Any failure
    /// (network, validation, auth) must surface as `Err` so the caller can
    /// route to its failed state instead of succeeded.
    async fn save_question(&self, question: &Question) -> Result<Question>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
