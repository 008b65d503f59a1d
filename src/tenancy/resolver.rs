//! Tenant resolution.
//!
//! # Responsibilities
//! - Derive a candidate tenant id from a `RequestDescriptor`
//! - Apply the fixed precedence: subdomain > header > principal claim
//!
//! # Design Decisions
//! - First match wins; a strategy that yields nothing falls through
//! - Only the subdomain strategy touches the store (slug → id); header and
//!   principal ids are checked later by the validator
//! - A tenant header is ignored outright once a principal is authenticated,
//!   so a caller cannot point its own session at another tenant

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ResolutionConfig;
use crate::error::RepositoryError;
use crate::observability::metrics;
use crate::tenancy::repository::TenantRepository;
use crate::tenancy::types::{RequestDescriptor, ResolutionSource, TenantCandidate};

/// Resolves requests to candidate tenant ids.
#[derive(Clone)]
pub struct TenantResolver {
    /// Lowercase, longest first.
    base_domains: Vec<String>,
    reserved: HashSet<String>,
    repository: Arc<dyn TenantRepository>,
}

impl TenantResolver {
    pub fn new(config: &ResolutionConfig, repository: Arc<dyn TenantRepository>) -> Self {
        let mut base_domains: Vec<String> = config
            .base_domains
            .iter()
            .map(|d| d.trim().trim_end_matches('.').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        base_domains.sort_by(|a, b| b.len().cmp(&a.len()));

        let reserved = config
            .reserved_subdomains
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        Self {
            base_domains,
            reserved,
            repository,
        }
    }

    /// Pick a candidate tenant, or `None` when no strategy matches.
    ///
    /// Store failures propagate unchanged.
    pub async fn resolve(
        &self,
        request: &RequestDescriptor,
    ) -> Result<Option<TenantCandidate>, RepositoryError> {
        if let Some(candidate) = self.from_subdomain(request).await? {
            return Ok(Some(self.found(request, candidate)));
        }
        if let Some(candidate) = self.from_header(request) {
            return Ok(Some(self.found(request, candidate)));
        }
        if let Some(candidate) = self.from_principal(request) {
            return Ok(Some(self.found(request, candidate)));
        }

        tracing::debug!(path = %request.path, "No tenant strategy matched");
        Ok(None)
    }

    fn found(&self, request: &RequestDescriptor, candidate: TenantCandidate) -> TenantCandidate {
        tracing::debug!(
            tenant_id = %candidate.tenant_id,
            source = %candidate.source,
            path = %request.path,
            "Tenant candidate resolved"
        );
        metrics::record_resolution(candidate.source.as_str());
        candidate
    }

    async fn from_subdomain(
        &self,
        request: &RequestDescriptor,
    ) -> Result<Option<TenantCandidate>, RepositoryError> {
        let Some(host) = request.host.as_deref() else {
            return Ok(None);
        };
        let Some(slug) = self.subdomain_slug(host) else {
            return Ok(None);
        };

        match self.repository.find_by_slug(&slug).await? {
            Some(tenant) => {
                if let Some(claim) = principal_claim(request) {
                    if claim != tenant.id {
                        tracing::warn!(
                            subdomain_tenant = %tenant.id,
                            principal_tenant = %claim,
                            "Principal tenant differs from subdomain tenant"
                        );
                    }
                }
                Ok(Some(TenantCandidate {
                    tenant_id: tenant.id,
                    source: ResolutionSource::Subdomain,
                }))
            }
            None => {
                tracing::debug!(slug = %slug, "Unknown subdomain slug");
                Ok(None)
            }
        }
    }

    fn from_header(&self, request: &RequestDescriptor) -> Option<TenantCandidate> {
        let value = request.tenant_header.as_deref()?;
        if request.principal.is_some() {
            tracing::debug!(header_tenant = %value, "Tenant header ignored for authenticated principal");
            return None;
        }
        if value.is_empty() {
            return None;
        }
        Some(TenantCandidate {
            tenant_id: value.to_string(),
            source: ResolutionSource::Header,
        })
    }

    fn from_principal(&self, request: &RequestDescriptor) -> Option<TenantCandidate> {
        principal_claim(request).map(|claim| TenantCandidate {
            tenant_id: claim.to_string(),
            source: ResolutionSource::Principal,
        })
    }

    /// Extract the tenant slug from a host, if the host is a tenant subdomain.
    pub fn subdomain_slug(&self, host: &str) -> Option<String> {
        let host = strip_port(host.trim()).trim_end_matches('.').to_lowercase();

        for base in &self.base_domains {
            if host == *base || host == format!("www.{base}") {
                return None;
            }
            let Some(prefix) = host.strip_suffix(base.as_str()).and_then(|p| p.strip_suffix('.'))
            else {
                continue;
            };
            let label = prefix.split('.').next().unwrap_or_default();
            if label.is_empty() || self.reserved.contains(label) {
                return None;
            }
            return Some(label.to_string());
        }
        None
    }
}

fn principal_claim(request: &RequestDescriptor) -> Option<&str> {
    request
        .principal
        .as_ref()
        .and_then(|p| p.tenant_id.as_deref())
        .filter(|claim| !claim.is_empty())
}

/// Remove a trailing `:port`, leaving bracketed IPv6 literals intact.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map(|end| &host[..=end]).unwrap_or(host);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
