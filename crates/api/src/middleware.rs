use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use stockwise_core::TenantId;

use crate::app::errors::json_error;
use crate::context::TenantContext;

/// Header carrying the tenant, set by the authenticating gateway in front of this service.
pub const TENANT_HEADER: &str = "x-tenant-id";

pub async fn tenant_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let tenant_id = extract_tenant(req.headers()).map_err(|msg| {
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg, false)
    })?;

    req.extensions_mut().insert(TenantContext::new(tenant_id));
    Ok(next.run(req).await)
}

fn extract_tenant(headers: &HeaderMap) -> Result<TenantId, &'static str> {
    let header = headers
        .get(TENANT_HEADER)
        .ok_or("missing X-Tenant-Id header")?;

    let value = header.to_str().map_err(|_| "X-Tenant-Id is not valid text")?;
    if value.trim().is_empty() {
        return Err("missing X-Tenant-Id header");
    }

    value.parse().map_err(|_| "X-Tenant-Id is not a valid tenant id")
}
