//! Service catalog: which services exist and which API versions each has.
//!
//! Built once (from an SDK library checkout or from a cache directory) and
//! then shared read-only with the strategy and the assembly engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::request::LATEST;

/// Immutable map of `ServiceName → ordered set of VersionTokens`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    /// SDK release the catalog was read from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdk_version: Option<String>,

    services: BTreeMap<String, BTreeSet<String>>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = Some(version.into());
        self
    }

    pub fn sdk_version(&self) -> Option<&str> {
        self.sdk_version.as_deref()
    }

    /// Register a service with no versions yet.
    pub fn insert_service(&mut self, service: impl Into<String>) {
        self.services.entry(service.into()).or_default();
    }

    /// Register one API version of a service.
    pub fn insert_version(&mut self, service: impl Into<String>, version: impl Into<String>) {
        self.services
            .entry(service.into())
            .or_default()
            .insert(version.into());
    }

    pub fn contains(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// All service names, sorted.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Known versions of a service, oldest first.
    pub fn versions(&self, service: &str) -> Option<impl Iterator<Item = &str>> {
        self.services
            .get(service)
            .map(|versions| versions.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// The current version of a service: the newest stable version, or the
    /// newest prerelease when the service has nothing else.
    pub fn latest(&self, service: &str) -> Option<&str> {
        let versions = self.services.get(service)?;
        versions
            .iter()
            .rev()
            .find(|v| !is_prerelease(v))
            .or_else(|| versions.iter().next_back())
            .map(String::as_str)
    }

    /// Map a requested version token onto a concrete known version.
    ///
    /// `latest` resolves through [`latest`](Self::latest); any other token
    /// must be listed for the service.
    pub fn resolve_version(&self, service: &str, requested: &str) -> Option<&str> {
        if requested == LATEST {
            return self.latest(service);
        }
        self.services
            .get(service)?
            .get(requested)
            .map(String::as_str)
    }

    /// Every `(service, version)` pair, with its prerelease flag, in
    /// service-then-version order. This is what the `all` token expands to.
    pub fn pairs(&self) -> Vec<(&str, &str, bool)> {
        self.services
            .iter()
            .flat_map(|(service, versions)| {
                versions
                    .iter()
                    .map(move |v| (service.as_str(), v.as_str(), is_prerelease(v)))
            })
            .collect()
    }
}

/// A version is stable only when it is a plain `YYYY-MM-DD` date. Anything
/// else (`2014-06-30-preview`, `2012-08-10*`) counts as prerelease.
pub fn is_prerelease(version: &str) -> bool {
    let bytes = version.as_bytes();
    if bytes.len() != 10 {
        return true;
    }
    !bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}
