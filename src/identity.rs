//! Session identities: proxy endpoints, storage scopes, and the rotation pool

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// An isolated persistent-state bucket (browser profile directory) bound to
/// one identity.
///
/// Scopes are discarded via `SessionProvider::discard_storage` when their
/// identity is rotated out after a fault, so a compromised profile cannot
/// taint the next identity's fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageScope(PathBuf);

impl StorageScope {
    /// Scope for the identity at the given pool slot
    pub fn for_slot(root: &Path, slot: usize) -> Self {
        Self(root.join(format!("identity-{slot}")))
    }

    /// Directory backing this scope
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for StorageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A (proxy endpoint, storage scope) pair used for exactly one render session
/// at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Proxy endpoint, or `None` for a direct connection
    pub proxy: Option<Url>,

    /// Isolated persistent-state bucket for this identity
    pub storage_scope: StorageScope,
}

/// Round-robin pool of session identities.
///
/// Built from the proxy list; an empty or absent list yields a pool with
/// exactly one direct (proxy-less) identity, so rotation always has somewhere
/// to go.
#[derive(Clone, Debug)]
pub struct IdentityPool {
    identities: Vec<SessionIdentity>,
    cursor: usize,
    served: usize,
}

impl IdentityPool {
    /// Build the pool from the proxy list file (missing file = no proxies)
    pub fn load(proxy_list: &Path, storage_root: &Path) -> Self {
        let proxies = match std::fs::read_to_string(proxy_list) {
            Ok(text) => parse_proxy_lines(&text),
            Err(e) => {
                tracing::info!(
                    path = %proxy_list.display(),
                    reason = %e,
                    "proxy list not readable, using direct connection only"
                );
                Vec::new()
            }
        };
        Self::from_proxies(proxies, storage_root)
    }

    /// Build the pool from already-parsed proxy endpoints
    pub fn from_proxies(proxies: Vec<Url>, storage_root: &Path) -> Self {
        let identities: Vec<SessionIdentity> = if proxies.is_empty() {
            vec![SessionIdentity {
                proxy: None,
                storage_scope: StorageScope::for_slot(storage_root, 0),
            }]
        } else {
            proxies
                .into_iter()
                .enumerate()
                .map(|(slot, proxy)| SessionIdentity {
                    proxy: Some(proxy),
                    storage_scope: StorageScope::for_slot(storage_root, slot),
                })
                .collect()
        };

        tracing::info!(identities = identities.len(), "identity pool ready");
        Self {
            identities,
            cursor: 0,
            served: 0,
        }
    }

    /// Number of identities in the pool
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// The pool is never empty; a direct identity is always present
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Hand out the next identity, round-robin
    pub fn next(&mut self) -> SessionIdentity {
        let identity = self.identities[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.identities.len();
        self.served += 1;
        identity
    }

    /// True once every identity in the pool has been handed out at least once
    /// this run; used to insert the extended cooldown before wrapping around
    pub fn has_cycled(&self) -> bool {
        self.served >= self.identities.len()
    }
}

/// Parse newline-delimited proxy endpoints.
///
/// Blank lines and `#` comments are ignored; entries without a scheme are
/// assumed `http://`; entries that still fail to parse are skipped with a
/// warning rather than aborting the run.
pub fn parse_proxy_lines(text: &str) -> Vec<Url> {
    let mut proxies = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let candidate = if line.contains("://") {
            line.to_string()
        } else {
            format!("http://{line}")
        };
        match Url::parse(&candidate) {
            Ok(url) => proxies.push(url),
            Err(e) => {
                tracing::warn!(entry = line, error = %e, "skipping unparseable proxy entry");
            }
        }
    }
    proxies
}
