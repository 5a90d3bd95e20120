use std::{borrow::Cow, future::Future};

use sqlx::{migrate::MigrateError, postgres::PgPool};

use super::quiz::{AnswerSubmission, Question};
use crate::parser::AnswerLetter;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Handle to the quiz database. Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Connection {
    pool: PgPool,
}

impl Connection {
    pub async fn connect(connection_string: Cow<'_, str>) -> StoreResult<Self> {
        let pool = PgPool::connect(&connection_string).await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        log::debug!("Applying pending migrations");
        sqlx::migrate!().run(&self.pool).await
    }
}

pub trait RetrieveQuestion {
    fn retrieve_question(
        &self,
        id: i32,
    ) -> impl Future<Output = StoreResult<Option<Question>>> + Send;

    fn retrieve_all_questions(&self) -> impl Future<Output = StoreResult<Vec<Question>>> + Send;
}

pub trait CreateAnswer {
    /// Stores one answer. The question id is not checked against `questions`.
    fn create_answer(
        &self,
        number: &str,
        question: i32,
        answer: AnswerLetter,
    ) -> impl Future<Output = StoreResult<AnswerSubmission>> + Send;
}

impl RetrieveQuestion for Connection {
    async fn retrieve_question(&self, id: i32) -> StoreResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, question, answer_a, answer_b, answer_c, answer_d, correct_answer FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        match question {
            Ok(question) => Ok(Some(question)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn retrieve_all_questions(&self) -> StoreResult<Vec<Question>> {
        sqlx::query_as::<_, Question>(
            "SELECT id, question, answer_a, answer_b, answer_c, answer_d, correct_answer FROM questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }
}

impl CreateAnswer for Connection {
    async fn create_answer(
        &self,
        number: &str,
        question: i32,
        answer: AnswerLetter,
    ) -> StoreResult<AnswerSubmission> {
        log::debug!("Adding answer '{}' to question {} from {}", answer, question, number);
        sqlx::query_as::<_, AnswerSubmission>(
            "INSERT INTO answers (number, question, answer) VALUES ($1, $2, $3) RETURNING id, number, question, answer, created_at",
        )
        .bind(number)
        .bind(question)
        .bind(answer.as_str())
        .fetch_one(&self.pool)
        .await
    }
}
