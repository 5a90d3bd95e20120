pub mod config;
pub mod database;
pub mod dispatcher;
pub mod parser;
pub mod reply;
pub mod routes;
pub mod sms;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
