//! Fragments: the independently cacheable pieces of an assembled bundle.
//!
//! A service contributes two fragment classes: a *header* (glue code shared
//! by every API version of the service) and one *definition* per API
//! version. The core runtime is a third, reserved fragment.

use std::collections::HashSet;
use std::fmt;

/// File stem of the reserved core runtime fragment.
///
/// Starts with `_`, which the request grammar never produces, so it cannot
/// collide with a service name.
pub const CORE_STEM: &str = "_core";

const MIN_SUFFIX: &str = ".min.js";
const PLAIN_SUFFIX: &str = ".js";

/// Identifies one fragment of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FragmentId {
    /// The service-independent runtime every bundle starts with.
    Core,
    /// Per-service shared glue, emitted at most once per bundle.
    Header { service: String },
    /// One API version's definition payload.
    Definition { service: String, version: String },
}

impl FragmentId {
    pub fn header(service: impl Into<String>) -> Self {
        Self::Header {
            service: service.into(),
        }
    }

    pub fn definition(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Definition {
            service: service.into(),
            version: version.into(),
        }
    }

    /// The service this fragment belongs to (`None` for the core).
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::Core => None,
            Self::Header { service } | Self::Definition { service, .. } => Some(service),
        }
    }

    /// Cache file stem: `_core`, `s3`, or `s3-2006-03-01`.
    pub fn stem(&self) -> String {
        match self {
            Self::Core => CORE_STEM.to_string(),
            Self::Header { service } => service.clone(),
            Self::Definition { service, version } => format!("{service}-{version}"),
        }
    }

    /// Cache file name for this fragment in the given flavour.
    pub fn file_name(&self, minified: bool) -> String {
        let suffix = if minified { MIN_SUFFIX } else { PLAIN_SUFFIX };
        format!("{}{suffix}", self.stem())
    }

    /// Inverse of [`file_name`](Self::file_name).
    ///
    /// Returns the fragment and whether the file holds the minified flavour.
    /// Anything that is not a fragment file (temp files, stray names) yields
    /// `None`.
    pub fn parse_file_name(name: &str) -> Option<(Self, bool)> {
        let (stem, minified) = match name.strip_suffix(MIN_SUFFIX) {
            Some(stem) => (stem, true),
            None => (name.strip_suffix(PLAIN_SUFFIX)?, false),
        };

        if stem == CORE_STEM {
            return Some((Self::Core, minified));
        }
        if stem.is_empty() || stem.starts_with(['_', '-', '.']) || stem.contains('.') {
            return None;
        }

        let id = match stem.split_once('-') {
            Some((service, version)) if !version.is_empty() => Self::definition(service, version),
            Some(_) => return None,
            None => Self::header(stem),
        };
        Some((id, minified))
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

/// The de-duplication ledger of one assembly call.
///
/// Invariants: a fragment is recorded at most once, so a service's header
/// is emitted once no matter how many of its versions were requested.
#[derive(Debug, Default, Clone)]
pub struct BuildSet {
    emitted: HashSet<FragmentId>,
    order: Vec<FragmentId>,
}

impl BuildSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &FragmentId) -> bool {
        self.emitted.contains(id)
    }

    /// Record a fragment. Returns `false` if it was already present.
    pub fn insert(&mut self, id: FragmentId) -> bool {
        if self.emitted.contains(&id) {
            return false;
        }
        self.emitted.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Whether the service's header has been emitted.
    pub fn has_service(&self, service: &str) -> bool {
        self.emitted.contains(&FragmentId::header(service))
    }

    /// Fragments in the order they were emitted.
    pub fn emitted(&self) -> &[FragmentId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
