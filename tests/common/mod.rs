#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use smsquiz::database::connection::{CreateAnswer, RetrieveQuestion, StoreResult};
use smsquiz::database::quiz::{AnswerSubmission, Question};
use smsquiz::dispatcher::{Dispatcher, InboundMessage};
use smsquiz::parser::AnswerLetter;
use smsquiz::routes;
use smsquiz::sms::{SendError, SendMessage};
use tokio::sync::Notify;

pub const PARTICIPANT: &str = "447700900000";
pub const VIRTUAL_NUMBER: &str = "447700900001";

/// In-memory quiz store. Optionally blocks inserts until released, or fails every call.
#[derive(Default)]
pub struct MemoryStore {
    questions: Vec<Question>,
    answers: Mutex<Vec<AnswerSubmission>>,
    gate: Option<Arc<Notify>>,
    failing: bool,
}

impl MemoryStore {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Default::default()
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn answers(&self) -> Vec<AnswerSubmission> {
        self.answers.lock().unwrap().clone()
    }
}

impl RetrieveQuestion for MemoryStore {
    async fn retrieve_question(&self, id: i32) -> StoreResult<Option<Question>> {
        if self.failing {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self.questions.iter().find(|q| q.id() == id).cloned())
    }

    async fn retrieve_all_questions(&self) -> StoreResult<Vec<Question>> {
        if self.failing {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self.questions.clone())
    }
}

impl CreateAnswer for MemoryStore {
    async fn create_answer(
        &self,
        number: &str,
        question: i32,
        answer: AnswerLetter,
    ) -> StoreResult<AnswerSubmission> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let mut answers = self.answers.lock().unwrap();
        let saved = AnswerSubmission::retreive(
            answers.len() as i32 + 1,
            number.to_owned(),
            question,
            answer.as_str().to_owned(),
            Utc::now(),
        );
        answers.push(saved.clone());
        Ok(saved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Records every outbound message instead of delivering it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    failing: bool,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl SendMessage for RecordingSender {
    async fn send_message(&self, from: &str, to: &str, body: &str) -> Result<(), SendError> {
        if self.failing {
            return Err(SendError::Rejected {
                status: "1".into(),
                text: "Throttled".into(),
            });
        }
        self.sent.lock().unwrap().push(Sent {
            from: from.to_owned(),
            to: to.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}

pub fn dispatcher(
    store: MemoryStore,
    sender: RecordingSender,
) -> (
    Dispatcher<MemoryStore, RecordingSender>,
    Arc<MemoryStore>,
    Arc<RecordingSender>,
) {
    let store = Arc::new(store);
    let sender = Arc::new(sender);
    (
        Dispatcher::new(Arc::clone(&store), Arc::clone(&sender)),
        store,
        sender,
    )
}

pub fn inbound(text: &str) -> InboundMessage {
    InboundMessage {
        text: text.to_owned(),
        msisdn: PARTICIPANT.to_owned(),
        to: VIRTUAL_NUMBER.to_owned(),
    }
}

pub fn two_plus_two() -> Question {
    Question::new(7, "What is 2+2?", ["3", "4", "5", "6"], Some('B'))
}

/// Polls `condition` until it holds, failing the test after a few seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Serves the real router on an ephemeral port and returns its base URL.
pub async fn serve(dispatcher: Dispatcher<MemoryStore, RecordingSender>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::router(dispatcher))
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}
