use crate::billing::{map_billing_error_to_user_message, BillCalculator, BillResult, BillingError, BillingRequest};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<BillCalculator>,
}

/// Bill plus any caveats the portal should display with it.
#[derive(Debug, Serialize)]
pub struct BillResponse {
    #[serde(flatten)]
    pub bill: BillResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub struct HttpServer;

impl HttpServer {
    pub fn router(calculator: Arc<BillCalculator>) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/bill/calculate", post(calculate_bill))
            .layer(CorsLayer::permissive())
            .with_state(AppState { calculator })
    }

    pub async fn start(
        port: u16,
        calculator: Arc<BillCalculator>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let app = Self::router(calculator);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        info!("HTTP server running on port {}", port);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn calculate_bill(
    State(state): State<AppState>,
    Json(request): Json<BillingRequest>,
) -> Result<Json<BillResponse>, (StatusCode, Json<Value>)> {
    match state.calculator.calculate(&request).await {
        Ok(bill) => {
            let warnings = bill.caveat().map(str::to_string).into_iter().collect();
            Ok(Json(BillResponse { bill, warnings }))
        }
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!(provider = %request.provider_code, "Bill calculation failed: {}", e);
            }
            Err((
                status,
                Json(json!({ "error": map_billing_error_to_user_message(&e) })),
            ))
        }
    }
}

fn status_for(error: &BillingError) -> StatusCode {
    match error {
        e if e.is_validation() => StatusCode::BAD_REQUEST,
        BillingError::ProviderNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}
