use bill_estimator::billing::BillCalculator;
use bill_estimator::configuration::Context;
use bill_estimator::core::HttpServer;
use bill_estimator::{tariff_resolver, AppError};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let config_file = env::var("BILL_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let context =
        Context::new(&config_file).map_err(|e| AppError::ConfigError(e.to_string()))?;

    let log_level = Level::from_str(&context.config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(log_level.to_string()))
        .init();
    tracing::info!(
        source = ?context.config.tariff_source,
        "Starting Bill Estimator"
    );

    let resolver = tariff_resolver(&context.config)?;
    let calculator = Arc::new(BillCalculator::new(resolver));

    HttpServer::start(context.config.http.port, calculator)
        .await
        .map_err(|e| AppError::ServiceError(e.to_string()))
}
