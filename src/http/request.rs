//! Request inspection.
//!
//! # Responsibilities
//! - Build a `RequestDescriptor` from an HTTP request
//! - Expose the admitted tenant to handlers as an extractor
//!
//! # Design Decisions
//! - Host comes from the `Host` header, falling back to the URI authority
//!   (HTTP/2 requests carry `:authority` instead)
//! - The principal is only read from extensions set by the auth layer, never
//!   from client-controlled headers

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, Method, Uri},
};
use std::sync::Arc;

use crate::error::TenancyError;
use crate::tenancy::{AuthenticatedPrincipal, RequestDescriptor, TenantContext};

/// Describe a request for the tenant pipeline.
pub fn describe_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    principal: Option<&AuthenticatedPrincipal>,
    tenant_header: &str,
) -> RequestDescriptor {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()));

    let tenant = headers
        .get(tenant_header)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    RequestDescriptor {
        host,
        tenant_header: tenant,
        principal: principal.cloned(),
        method: Some(method.as_str().to_string()),
        path: uri.path().to_string(),
    }
}

/// The tenant admitted for this request.
///
/// Rejects with `TenantNotIdentified` on routes that ran without a tenant.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Arc<TenantContext>);

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = TenancyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<TenantContext>>()
            .cloned()
            .map(CurrentTenant)
            .ok_or(TenancyError::TenantNotIdentified)
    }
}
