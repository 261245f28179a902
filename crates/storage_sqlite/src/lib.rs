use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{Answer, AnswerId, Author, Question, QuestionId, QuestionStore, Tag};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub const CURRENT_DB_SCHEMA_VERSION: u32 = 1;

/// SQLite-backed question persistence. Nested models (author, tags) are
/// kept as JSON columns; answers live in their own table and the
/// denormalized counters on the question row are maintained here.
#[derive(Debug, Clone)]
pub struct SqliteQuestionStore {
    pool: SqlitePool,
}

impl SqliteQuestionStore {
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            path.as_ref().to_string_lossy()
        ))?
        .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author_json TEXT NOT NULL,
                tags_json TEXT NOT NULL,
                votes INTEGER NOT NULL DEFAULT 0,
                answer_count INTEGER NOT NULL DEFAULT 0,
                views INTEGER NOT NULL DEFAULT 0,
                has_best_answer INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS answers (
                id TEXT PRIMARY KEY,
                question_id TEXT NOT NULL,
                content TEXT NOT NULL,
                author_json TEXT NOT NULL,
                votes INTEGER NOT NULL DEFAULT 0,
                is_best INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(question_id) REFERENCES questions(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO metadata(key, value)
            VALUES ('schema_version', ?1)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(CURRENT_DB_SCHEMA_VERSION.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn schema_version(&self) -> Result<u32> {
        let row = sqlx::query("SELECT value FROM metadata WHERE key = 'schema_version'")
            .fetch_one(&self.pool)
            .await?;
        let version = row.get::<String, _>("value").parse::<u32>()?;
        Ok(version)
    }

    pub async fn insert_question(&self, question: &Question) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO questions(
                id, title, content, author_json, tags_json,
                votes, answer_count, views, has_best_answer, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(question.id.to_string())
        .bind(&question.title)
        .bind(&question.content)
        .bind(serde_json::to_string(&question.author)?)
        .bind(serde_json::to_string(&question.tags)?)
        .bind(question.votes)
        .bind(i64::from(question.answer_count))
        .bind(i64::try_from(question.views)?)
        .bind(question.has_best_answer)
        .bind(question.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        for answer in &question.answers {
            self.insert_answer_row(answer).await?;
        }

        Ok(())
    }

    pub async fn get_question(&self, id: QuestionId) -> Result<Option<Question>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, author_json, tags_json,
                   votes, answer_count, views, has_best_answer, created_at
            FROM questions
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let answers = self.list_answers(id).await?;
        Ok(Some(map_question_row(&row, answers)?))
    }

    /// Newest questions first, answers attached in creation order.
    pub async fn list_questions(&self) -> Result<Vec<Question>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, author_json, tags_json,
                   votes, answer_count, views, has_best_answer, created_at
            FROM questions
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let answer_rows = sqlx::query(
            r#"
            SELECT id, question_id, content, author_json, votes, is_best, created_at
            FROM answers
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<QuestionId, Vec<Answer>> = HashMap::new();
        for row in answer_rows {
            let answer = map_answer_row(&row)?;
            by_question.entry(answer.question_id).or_default().push(answer);
        }

        rows.iter()
            .map(|row| {
                let id = parse_uuid(row.get::<String, _>("id"))?;
                map_question_row(row, by_question.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    pub async fn list_answers(&self, question_id: QuestionId) -> Result<Vec<Answer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, question_id, content, author_json, votes, is_best, created_at
            FROM answers
            WHERE question_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(question_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_answer_row).collect()
    }

    /// Stores an answer and bumps the question's answer counter.
    pub async fn append_answer(&self, answer: &Answer) -> Result<()> {
        self.insert_answer_row(answer).await?;

        sqlx::query(r#"UPDATE questions SET answer_count = answer_count + 1 WHERE id = ?1"#)
            .bind(answer.question_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Marks one answer as the accepted one; any previous best answer on
    /// the question is demoted.
    pub async fn mark_best_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<()> {
        sqlx::query(r#"UPDATE answers SET is_best = 0 WHERE question_id = ?1"#)
            .bind(question_id.to_string())
            .execute(&self.pool)
            .await?;

        let updated = sqlx::query(
            r#"UPDATE answers SET is_best = 1 WHERE id = ?1 AND question_id = ?2"#,
        )
        .bind(answer_id.to_string())
        .bind(question_id.to_string())
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(anyhow!(
                "answer {answer_id} not found on question {question_id}"
            ));
        }

        sqlx::query(r#"UPDATE questions SET has_best_answer = 1 WHERE id = ?1"#)
            .bind(question_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn record_view(&self, question_id: QuestionId) -> Result<()> {
        sqlx::query(r#"UPDATE questions SET views = views + 1 WHERE id = ?1"#)
            .bind(question_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Adjusts the question score; `delta` is negative for downvotes.
    pub async fn apply_vote(&self, question_id: QuestionId, delta: i64) -> Result<()> {
        sqlx::query(r#"UPDATE questions SET votes = votes + ?2 WHERE id = ?1"#)
            .bind(question_id.to_string())
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_answer_row(&self, answer: &Answer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO answers(id, question_id, content, author_json, votes, is_best, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(answer.id.to_string())
        .bind(answer.question_id.to_string())
        .bind(&answer.content)
        .bind(serde_json::to_string(&answer.author)?)
        .bind(answer.votes)
        .bind(answer.is_best)
        .bind(answer.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for SqliteQuestionStore {
    async fn fetch_questions(&self) -> Result<Vec<Question>> {
        self.list_questions().await
    }

    async fn save_question(&self, question: &Question) -> Result<Question> {
        self.insert_question(question).await?;
        self.get_question(question.id)
            .await?
            .ok_or_else(|| anyhow!("question {} missing after insert", question.id))
    }
}

fn map_question_row(row: &SqliteRow, answers: Vec<Answer>) -> Result<Question> {
    let author: Author = serde_json::from_str(&row.get::<String, _>("author_json"))
        .context("invalid author json in database")?;
    let tags: Vec<Tag> = serde_json::from_str(&row.get::<String, _>("tags_json"))
        .context("invalid tags json in database")?;

    Ok(Question {
        id: parse_uuid(row.get::<String, _>("id"))?,
        title: row.get("title"),
        content: row.get("content"),
        tags,
        author,
        votes: row.get("votes"),
        answer_count: u32::try_from(row.get::<i64, _>("answer_count"))
            .context("negative answer count in database")?,
        views: u64::try_from(row.get::<i64, _>("views"))
            .context("negative view count in database")?,
        has_best_answer: row.get("has_best_answer"),
        created_at: parse_rfc3339(row.get::<String, _>("created_at"))?,
        answers,
    })
}

fn map_answer_row(row: &SqliteRow) -> Result<Answer> {
    let author: Author = serde_json::from_str(&row.get::<String, _>("author_json"))
        .context("invalid author json in database")?;

    Ok(Answer {
        id: parse_uuid(row.get::<String, _>("id"))?,
        question_id: parse_uuid(row.get::<String, _>("question_id"))?,
        content: row.get("content"),
        author,
        votes: row.get("votes"),
        is_best: row.get("is_best"),
        created_at: parse_rfc3339(row.get::<String, _>("created_at"))?,
    })
}

fn parse_uuid(value: String) -> Result<Uuid> {
    Uuid::parse_str(&value).with_context(|| format!("invalid uuid in database: {value}"))
}

fn parse_rfc3339(value: String) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&value)?.with_timezone(&Utc))
}
