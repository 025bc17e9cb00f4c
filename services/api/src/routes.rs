use crate::calculate::{CalculationOutput, HouseholdInput};
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use unterhalt::error::AppError;
use unterhalt::support::{AgeBand, SupportCalculator, TableConstants};

#[derive(Debug, Serialize)]
pub(crate) struct TableResponse {
    pub(crate) year: u16,
    pub(crate) constants: TableConstants,
    pub(crate) age_bands: Vec<AgeBandView>,
    pub(crate) brackets: Vec<BracketView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AgeBandView {
    pub(crate) band: AgeBand,
    pub(crate) label: &'static str,
    pub(crate) min_age: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct BracketView {
    pub(crate) index: u8,
    pub(crate) net_income_ceiling: Decimal,
    pub(crate) percent_of_base: u16,
    pub(crate) amounts: Vec<BandAmount>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BandAmount {
    pub(crate) band: AgeBand,
    pub(crate) amount: Decimal,
}

pub(crate) fn with_support_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/support/calculate",
            axum::routing::post(calculate_endpoint),
        )
        .route("/api/v1/support/table", axum::routing::get(table_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn calculate_endpoint(
    Extension(calculator): Extension<SupportCalculator>,
    Json(payload): Json<HouseholdInput>,
) -> Result<Json<CalculationOutput>, AppError> {
    let (obligor, context) = payload.into_parts(Local::now().date_naive());
    let calculation = calculator.calculate(&obligor, &context)?;
    Ok(Json(CalculationOutput::from(calculation)))
}

pub(crate) async fn table_endpoint(
    Extension(calculator): Extension<SupportCalculator>,
) -> Json<TableResponse> {
    let table = calculator.table();
    let bands = AgeBand::ordered();

    Json(TableResponse {
        year: table.year(),
        constants: table.constants(),
        age_bands: bands
            .iter()
            .map(|&band| AgeBandView {
                band,
                label: band.label(),
                min_age: table.age_threshold(band),
            })
            .collect(),
        brackets: table
            .brackets()
            .iter()
            .map(|bracket| BracketView {
                index: bracket.index,
                net_income_ceiling: bracket.net_income_ceiling,
                percent_of_base: bracket.percent_of_base,
                amounts: bands
                    .iter()
                    .map(|&band| BandAmount {
                        band,
                        amount: bracket.minimum_for(band),
                    })
                    .collect(),
            })
            .collect(),
    })
}
