use std::fmt;

use axum::{
    async_trait,
    extract::{Form, FromRequest, Query, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    database::{
        connection::{CreateAnswer, RetrieveQuestion},
        quiz::Question,
    },
    dispatcher::{Dispatcher, InboundMessage},
    sms::SendMessage,
};

pub fn router<Store, Sender>(dispatcher: Dispatcher<Store, Sender>) -> Router
where
    Store: RetrieveQuestion + CreateAnswer + Send + Sync + 'static,
    Sender: SendMessage + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_questions::<Store, Sender>))
        .route(
            "/nexmo-webhook",
            get(webhook::<Store, Sender>).post(webhook::<Store, Sender>),
        )
        .route("/healthz", get(healthz))
        .with_state(dispatcher)
}

/// Webhook parameters. Nexmo sends them in the query string, a form body or JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundParams {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub msisdn: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl InboundParams {
    fn or(self, other: InboundParams) -> InboundParams {
        InboundParams {
            text: self.text.or(other.text),
            msisdn: self.msisdn.or(other.msisdn),
            to: self.to.or(other.to),
        }
    }

    /// `None` when there is nobody to reply to.
    fn into_message(self) -> Option<InboundMessage> {
        Some(InboundMessage {
            text: self.text.unwrap_or_default(),
            msisdn: self.msisdn.filter(|m| !m.is_empty())?,
            to: self.to.filter(|t| !t.is_empty())?,
        })
    }
}

/// Webhook body: an urlencoded form, or JSON when the provider is set to POST-JSON.
///
/// Never rejects; an unreadable body is logged and treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundBody(pub InboundParams);

#[async_trait]
impl<S> FromRequest<S> for InboundBody
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let is_json = content_type
            .as_deref()
            .is_some_and(|value| value.starts_with("application/json"));

        let params = if is_json {
            Json::<InboundParams>::from_request(req, state)
                .await
                .map(|Json(params)| params)
                .map_err(|e| e.body_text())
        } else {
            Form::<InboundParams>::from_request(req, state)
                .await
                .map(|Form(params)| params)
                .map_err(|e| e.body_text())
        };

        match params {
            Ok(params) => Ok(InboundBody(params)),
            Err(e) => {
                match content_type {
                    Some(content_type) => {
                        log::warn!("Unsupported webhook body ({}): {}", content_type, e)
                    }
                    None => log::debug!("No webhook body: {}", e),
                }
                Ok(InboundBody::default())
            }
        }
    }
}

/// Always acknowledges with an empty `200`; the work happens in the background.
#[instrument(level = "info", skip_all)]
pub async fn webhook<Store, Sender>(
    State(dispatcher): State<Dispatcher<Store, Sender>>,
    query: Option<Query<InboundParams>>,
    InboundBody(body): InboundBody,
) -> StatusCode
where
    Store: RetrieveQuestion + CreateAnswer + Send + Sync + 'static,
    Sender: SendMessage + Send + Sync + 'static,
{
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let params = query.or(body);
    log::debug!("Inbound webhook: {:?}", params);

    match params.into_message() {
        Some(message) => {
            dispatcher.dispatch(message);
        }
        None => log::warn!(
            "Ignoring inbound message without msisdn or recipient; expected query, form or JSON parameters"
        ),
    }

    StatusCode::OK
}

#[instrument(level = "info", skip_all)]
pub async fn list_questions<Store, Sender>(
    State(dispatcher): State<Dispatcher<Store, Sender>>,
) -> Response
where
    Store: RetrieveQuestion + CreateAnswer + Send + Sync + 'static,
    Sender: SendMessage + Send + Sync + 'static,
{
    match dispatcher.store().retrieve_all_questions().await {
        Ok(questions) => Html(QuestionListing(&questions).to_string()).into_response(),
        Err(e) => {
            log::error!("Database error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load questions.").into_response()
        }
    }
}

pub async fn healthz() -> &'static str {
    "Ok"
}

/// HTML page with every question and its lettered options.
pub struct QuestionListing<'a>(pub &'a [Question]);

impl fmt::Display for QuestionListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Hackference conference quiz!</title></head>\n<body>\n<h1>Hackference conference quiz!</h1>\n")?;
        if self.0.is_empty() {
            f.write_str("<p>No questions yet.</p>\n")?;
        }
        for question in self.0 {
            write!(
                f,
                "<section>\n<h2>{}. {}</h2>\n<ol type=\"A\">\n",
                question.id(),
                Escaped(question.question())
            )?;
            for (letter, text) in question.options() {
                writeln!(f, "<li>{}) {}</li>", letter, Escaped(text))?;
            }
            f.write_str("</ol>\n</section>\n")?;
        }
        f.write_str("</body>\n</html>\n")
    }
}

struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '&' => f.write_str("&amp;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}
