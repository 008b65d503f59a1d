//! Path matching logic.
//!
//! # Responsibilities
//! - Match a request path against a configured prefix
//! - Respect segment boundaries
//!
//! # Design Decisions
//! - Case-sensitive (paths are)
//! - `/health` matches `/health` and `/health/live`, never `/healthz`
//! - A prefix of `/` matches everything
//! - No regex to guarantee O(n) matching

/// Matches paths by segment-aware prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new matcher. A trailing slash on the prefix is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Whether any matcher in the list matches the path.
pub fn any_matches(matchers: &[PathPrefixMatcher], path: &str) -> bool {
    matchers.iter().any(|m| m.matches(path))
}
