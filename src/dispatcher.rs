use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::{
    database::connection::{CreateAnswer, RetrieveQuestion},
    parser::{self, Command},
    reply::Reply,
    sms::{SendError, SendMessage},
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification error: {0}")]
    Send(#[from] SendError),
}

/// One inbound SMS as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Raw message body.
    pub text: String,
    /// Participant's phone number; replies go here.
    pub msisdn: String,
    /// Our virtual number the participant wrote to; replies come from here.
    pub to: String,
}

/// Turns inbound messages into stored answers and outbound replies.
pub struct Dispatcher<Store, Sender> {
    store: Arc<Store>,
    sender: Arc<Sender>,
}

impl<Store, Sender> Clone for Dispatcher<Store, Sender> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<Store, Sender> Dispatcher<Store, Sender>
where
    Store: RetrieveQuestion + CreateAnswer + Send + Sync + 'static,
    Sender: SendMessage + Send + Sync + 'static,
{
    pub fn new(store: Arc<Store>, sender: Arc<Sender>) -> Self {
        Self { store, sender }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Handles `message` on a background task and returns immediately.
    ///
    /// The handle may be dropped; failures are logged from inside the task.
    pub fn dispatch(&self, message: InboundMessage) -> JoinHandle<Result<Reply, DispatchError>> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let result = dispatcher.respond(&message).await;
            if let Err(e) = &result {
                log::error!("Failed to handle message from {}: {}", message.msisdn, e);
            }
            result
        })
    }

    /// Builds the reply for `message` and sends it back to the participant.
    #[instrument(level = "info", skip(self), fields(msisdn = %message.msisdn))]
    pub async fn respond(&self, message: &InboundMessage) -> Result<Reply, DispatchError> {
        let reply = self.compose(message).await;

        self.sender
            .send_message(&message.to, &message.msisdn, &reply.to_string())
            .await?;
        log::debug!("Reply sent to {}", message.msisdn);

        Ok(reply)
    }

    /// Parses the message and performs the store work it asks for.
    ///
    /// An answer is fully stored before this returns. Store failures are logged
    /// and fall back to the help text, never to a thank-you.
    pub async fn compose(&self, message: &InboundMessage) -> Reply {
        match parser::parse(&message.text) {
            None => {
                log::info!(
                    "{}: unrecognised message {:?}",
                    message.msisdn,
                    message.text
                );
                Reply::Help
            }
            Some(Command {
                question,
                answer: None,
            }) => match self.store.retrieve_question(question).await {
                Ok(Some(found)) => {
                    log::info!("{} asks for question {}", message.msisdn, question);
                    Reply::Question(found)
                }
                Ok(None) => {
                    log::info!(
                        "{} asks for question {}: not found",
                        message.msisdn,
                        question
                    );
                    Reply::NotFound(question)
                }
                Err(e) => {
                    log::error!("Database error looking up question {}: {}", question, e);
                    Reply::Help
                }
            },
            Some(Command {
                question,
                answer: Some(letter),
            }) => match self
                .store
                .create_answer(&message.msisdn, question, letter)
                .await
            {
                Ok(saved) => {
                    log::info!(
                        "{} answers '{}' to question {} (answer #{} at {})",
                        saved.number(),
                        saved.answer(),
                        saved.question(),
                        saved.id(),
                        saved.created_at()
                    );
                    Reply::Thanks
                }
                Err(e) => {
                    log::error!(
                        "Database error storing answer '{}' to question {} from {}: {}",
                        letter,
                        question,
                        message.msisdn,
                        e
                    );
                    Reply::Help
                }
            },
        }
    }
}
