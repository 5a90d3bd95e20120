use std::borrow::Cow;
use std::sync::Arc;

use dotenvy::dotenv;
use smsquiz::config::Config;
use smsquiz::database::connection::Connection;
use smsquiz::dispatcher::Dispatcher;
use smsquiz::routes;
use smsquiz::sms::NexmoClient;
use smsquiz::BoxError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from_level(config.log_level))
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    let connection = Arc::new(Connection::connect(Cow::Borrowed(&config.database_url)).await?);
    connection.run_migrations().await?;

    let sender = Arc::new(NexmoClient::new(
        config.nexmo_api_key.clone(),
        config.nexmo_api_secret.clone(),
        config.nexmo_sms_url.clone(),
    ));

    let app = routes::router(Dispatcher::new(connection, sender));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    log::info!("Server running at: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
