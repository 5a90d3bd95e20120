use std::fmt;

use chrono::{DateTime, Utc};

/// Option labels in the order they are shown to the participant.
pub const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Question {
    id: i32,
    question: String,
    answer_a: String,
    answer_b: String,
    answer_c: String,
    answer_d: String,
    correct_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AnswerSubmission {
    id: i32,
    number: String,
    question: i32,
    answer: String,
    created_at: DateTime<Utc>,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question:\n{}\n\nAnswers:", self.question())?;
        for (letter, text) in self.options() {
            write!(f, "\n{}) {}", letter, text)?;
        }
        Ok(())
    }
}

impl Question {
    pub fn new(
        id: i32,
        question: impl Into<String>,
        answers: [&str; 4],
        correct_answer: Option<char>,
    ) -> Self {
        let [a, b, c, d] = answers;
        Self {
            id,
            question: question.into(),
            answer_a: a.to_owned(),
            answer_b: b.to_owned(),
            answer_c: c.to_owned(),
            answer_d: d.to_owned(),
            correct_answer: correct_answer.map(|c| c.to_string()),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// The four options paired with their labels, A to D.
    pub fn options(&self) -> [(char, &str); 4] {
        [
            (LETTERS[0], self.answer_a.as_str()),
            (LETTERS[1], self.answer_b.as_str()),
            (LETTERS[2], self.answer_c.as_str()),
            (LETTERS[3], self.answer_d.as_str()),
        ]
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }
}

impl AnswerSubmission {
    pub fn retreive(
        id: i32,
        number: String,
        question: i32,
        answer: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            number,
            question,
            answer,
            created_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn question(&self) -> i32 {
        self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}
