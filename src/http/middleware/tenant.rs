//! Tenant admission middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::describe_request;
use crate::http::server::AppState;
use crate::tenancy::{context, Admission, AuthenticatedPrincipal};

/// Admit the request and run the rest of the stack inside the tenant scope.
///
/// The admitted context is also inserted into request extensions so
/// handlers can take it with the `CurrentTenant` extractor. The pipeline
/// snapshot goes there too, so the guard enforces markers from the same
/// route table admission classified with.
pub async fn tenant_context_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let pipeline = state.pipeline.load_full();
    let descriptor = describe_request(
        req.method(),
        req.uri(),
        req.headers(),
        req.extensions().get::<AuthenticatedPrincipal>(),
        pipeline.tenant_header(),
    );

    let admission = pipeline.admit(&descriptor).await;
    req.extensions_mut().insert(pipeline);

    match admission {
        Ok(Admission::Scoped(ctx)) => {
            req.extensions_mut().insert(ctx.clone());
            context::enter_scope(ctx, next.run(req)).await
        }
        Ok(Admission::Bypass | Admission::Anonymous) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}
