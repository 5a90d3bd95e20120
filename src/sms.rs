use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed provider response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("message rejected with status {status}: {text}")]
    Rejected { status: String, text: String },
}

/// Outbound SMS channel.
pub trait SendMessage {
    fn send_message(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}

#[derive(Serialize)]
struct SmsRequest<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsResponse {
    #[serde(default)]
    messages: Vec<MessageStatus>,
}

#[derive(Debug, Deserialize)]
struct MessageStatus {
    status: String,
    #[serde(rename = "error-text", default)]
    error_text: Option<String>,
}

/// Nexmo (Vonage) SMS REST client.
#[derive(Debug, Clone)]
pub struct NexmoClient {
    api_key: String,
    api_secret: String,
    endpoint: Url,
    http: reqwest::Client,
}

impl NexmoClient {
    pub fn new(api_key: String, api_secret: String, endpoint: Url) -> Self {
        Self {
            api_key,
            api_secret,
            endpoint,
            http: reqwest::Client::new(),
        }
    }
}

impl SendMessage for NexmoClient {
    async fn send_message(&self, from: &str, to: &str, body: &str) -> Result<(), SendError> {
        let request = SmsRequest {
            api_key: &self.api_key,
            api_secret: &self.api_secret,
            from,
            to,
            text: body,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        check_response(&body)
    }
}

/// Every message part must carry status `"0"`.
fn check_response(body: &str) -> Result<(), SendError> {
    let response: SmsResponse = serde_json::from_str(body)?;

    match response.messages.into_iter().find(|m| m.status != "0") {
        Some(failed) => Err(SendError::Rejected {
            status: failed.status,
            text: failed.error_text.unwrap_or_default(),
        }),
        None => Ok(()),
    }
}
