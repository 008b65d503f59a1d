//! Ambient tenant context.
//!
//! # Responsibilities
//! - Install a `TenantContext` for the dynamic extent of a future or closure
//! - Expose read accessors usable anywhere inside that extent
//! - Carry the context into explicitly spawned tasks
//!
//! # Design Decisions
//! - Backed by a Tokio task-local: each task sees only the scopes it entered,
//!   so concurrent requests never share mutable state here and need no locks
//! - Nested scopes shadow; the outer value is restored when the inner scope
//!   returns, panics, or its future is dropped
//! - Accessors return `None` outside a scope instead of panicking

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::{TenancyError, TenancyResult};
use crate::plans::PlanType;
use crate::tenancy::types::TenantContext;

tokio::task_local! {
    static CURRENT_TENANT: Arc<TenantContext>;
}

/// Run `future` with `context` as the current tenant.
pub async fn enter_scope<C, F>(context: C, future: F) -> F::Output
where
    C: Into<Arc<TenantContext>>,
    F: Future,
{
    CURRENT_TENANT.scope(context.into(), future).await
}

/// Synchronous counterpart of [`enter_scope`].
pub fn enter_scope_sync<C, F, R>(context: C, f: F) -> R
where
    C: Into<Arc<TenantContext>>,
    F: FnOnce() -> R,
{
    CURRENT_TENANT.sync_scope(context.into(), f)
}

/// The innermost active context, if any.
pub fn current_context() -> Option<Arc<TenantContext>> {
    CURRENT_TENANT.try_with(Arc::clone).ok()
}

/// The current context, or `TenantNotIdentified` outside a scope.
pub fn require_context() -> TenancyResult<Arc<TenantContext>> {
    current_context().ok_or(TenancyError::TenantNotIdentified)
}

pub fn has_tenant_context() -> bool {
    CURRENT_TENANT.try_with(|_| ()).is_ok()
}

pub fn current_tenant_id() -> Option<String> {
    CURRENT_TENANT.try_with(|ctx| ctx.tenant_id.clone()).ok()
}

pub fn current_tenant_slug() -> Option<String> {
    CURRENT_TENANT.try_with(|ctx| ctx.slug.clone()).ok().flatten()
}

pub fn current_plan_type() -> Option<PlanType> {
    CURRENT_TENANT.try_with(|ctx| ctx.plan_type).ok()
}

pub fn current_features() -> Option<BTreeSet<String>> {
    CURRENT_TENANT.try_with(|ctx| ctx.features.clone()).ok()
}

/// Whether the current tenant has `name`; `false` outside a scope.
pub fn has_feature(name: &str) -> bool {
    CURRENT_TENANT
        .try_with(|ctx| ctx.has_feature(name))
        .unwrap_or(false)
}

/// Spawn a task that runs inside the caller's current scope.
///
/// Task-locals are not inherited by `tokio::spawn`; without a scope the
/// task runs unscoped.
pub fn spawn_scoped<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match current_context() {
        Some(ctx) => tokio::spawn(CURRENT_TENANT.scope(ctx, future)),
        None => tokio::spawn(future),
    }
}
