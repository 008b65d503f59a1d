//! Tenant store and usage counter collaborators.
//!
//! # Responsibilities
//! - Define the read-only `TenantRepository` seam
//! - Define the `UsageCounter` seam used by limit guards
//! - Provide DashMap-backed in-memory implementations, optionally seeded
//!   from a JSON file
//!
//! # Design Decisions
//! - Read-only from this crate's point of view; tenant status and plan are
//!   written by administrative flows elsewhere
//! - Concurrent reads without a global lock (DashMap shards)

use async_trait::async_trait;
use dashmap::DashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::tenancy::types::Tenant;

/// Lookup of persisted tenants.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, RepositoryError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError>;
}

/// Current usage of plan-limited resources, owned by domain counting logic.
#[async_trait]
pub trait UsageCounter: Send + Sync {
    async fn current_usage(&self, tenant_id: &str, resource: &str) -> Result<u64, RepositoryError>;
}

/// Thread-safe in-memory tenant store.
#[derive(Clone, Default)]
pub struct InMemoryTenantRepository {
    by_id: Arc<DashMap<String, Tenant>>,
    /// slug -> id
    slugs: Arc<DashMap<String, String>>,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON array of tenant records.
    pub fn load_from_file(path: &Path) -> Result<Self, RepositoryError> {
        let file = File::open(path)?;
        let tenants: Vec<Tenant> = serde_json::from_reader(BufReader::new(file))?;

        let repo = Self::new();
        for tenant in tenants {
            repo.insert(tenant);
        }
        tracing::info!(path = ?path, tenants = repo.len(), "Loaded tenant seed file");
        Ok(repo)
    }

    /// Insert or replace a tenant.
    pub fn insert(&self, tenant: Tenant) {
        if let Some(previous) = self.by_id.get(&tenant.id) {
            if previous.slug != tenant.slug {
                self.slugs.remove(&previous.slug.to_lowercase());
            }
        }
        if !tenant.slug.is_empty() {
            self.slugs
                .insert(tenant.slug.to_lowercase(), tenant.id.clone());
        }
        self.by_id.insert(tenant.id.clone(), tenant);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, RepositoryError> {
        Ok(self.by_id.get(id).map(|r| r.value().clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError> {
        let id = match self.slugs.get(&slug.to_lowercase()) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        Ok(self.by_id.get(&id).map(|r| r.value().clone()))
    }
}

/// In-memory usage counts keyed by (tenant, resource).
#[derive(Clone, Default)]
pub struct InMemoryUsageCounter {
    counts: Arc<DashMap<(String, String), u64>>,
}

impl InMemoryUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, tenant_id: &str, resource: &str, value: u64) {
        self.counts
            .insert((tenant_id.to_string(), resource.to_string()), value);
    }

    pub fn get(&self, tenant_id: &str, resource: &str) -> u64 {
        self.counts
            .get(&(tenant_id.to_string(), resource.to_string()))
            .map(|r| *r.value())
            .unwrap_or(0)
    }

    /// Add one and return the new count.
    pub fn increment(&self, tenant_id: &str, resource: &str) -> u64 {
        let mut entry = self
            .counts
            .entry((tenant_id.to_string(), resource.to_string()))
            .or_insert(0);
        *entry += 1;
        *entry
    }
}

#[async_trait]
impl UsageCounter for InMemoryUsageCounter {
    async fn current_usage(&self, tenant_id: &str, resource: &str) -> Result<u64, RepositoryError> {
        Ok(self.get(tenant_id, resource))
    }
}
