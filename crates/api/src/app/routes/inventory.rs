use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use stockwise_intel::{
    AnomalyParams, ForecastParams, ForecastSort, ReorderParams, parse_days, parse_store_id,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new()
        .route("/forecast", get(demand_forecast))
        .route("/reorder", get(reorder_suggestions))
        .route("/anomalies", get(anomaly_scan))
        .route("/overview", get(overview))
}

pub async fn demand_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(store_id): Path<String>,
    Query(q): Query<dto::ForecastQuery>,
) -> Response {
    let store_id = match parse_store_id(&store_id) {
        Ok(v) => v,
        Err(e) => return errors::intel_error_to_response(e),
    };
    let params = ForecastParams::new(parse_days(q.days.as_deref()));
    let sort = ForecastSort::parse(q.sort.as_deref());

    match services
        .intel
        .demand_forecast(tenant.tenant_id(), store_id, params, sort)
        .await
    {
        Ok(report) => Json(dto::ForecastResponse::from(report)).into_response(),
        Err(e) => errors::intel_error_to_response(e),
    }
}

pub async fn reorder_suggestions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(store_id): Path<String>,
    Query(q): Query<dto::ReorderQuery>,
) -> Response {
    let store_id = match parse_store_id(&store_id) {
        Ok(v) => v,
        Err(e) => return errors::intel_error_to_response(e),
    };
    let params = ReorderParams::new(parse_days(q.threshold_days.as_deref()));

    match services
        .intel
        .reorder_suggestions(tenant.tenant_id(), store_id, params)
        .await
    {
        Ok(report) => Json(dto::ReorderResponse::from(report)).into_response(),
        Err(e) => errors::intel_error_to_response(e),
    }
}

pub async fn anomaly_scan(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(store_id): Path<String>,
    Query(q): Query<dto::AnomalyQuery>,
) -> Response {
    let store_id = match parse_store_id(&store_id) {
        Ok(v) => v,
        Err(e) => return errors::intel_error_to_response(e),
    };
    let params = AnomalyParams::new(parse_days(q.days.as_deref()));

    match services
        .intel
        .anomaly_scan(tenant.tenant_id(), store_id, params)
        .await
    {
        Ok(report) => Json(dto::AnomalyResponse::from(report)).into_response(),
        Err(e) => errors::intel_error_to_response(e),
    }
}

/// `days` drives both the forecast and the anomaly window (each clamped to its own range).
pub async fn overview(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(store_id): Path<String>,
    Query(q): Query<dto::OverviewQuery>,
) -> Response {
    let store_id = match parse_store_id(&store_id) {
        Ok(v) => v,
        Err(e) => return errors::intel_error_to_response(e),
    };
    let days = parse_days(q.days.as_deref());
    let threshold_days = parse_days(q.threshold_days.as_deref());

    match services
        .intel
        .overview(
            tenant.tenant_id(),
            store_id,
            ForecastParams::new(days),
            ReorderParams::new(threshold_days),
            AnomalyParams::new(days),
        )
        .await
    {
        Ok(overview) => Json(dto::OverviewResponse::from(overview)).into_response(),
        Err(e) => errors::intel_error_to_response(e),
    }
}
