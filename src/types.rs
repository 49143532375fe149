//! Shared types: the error taxonomy and the two identifier spaces.
//!
//! The engine crosses two disjoint identifier spaces: local record ids from
//! the connector's HATEOAS API and fully-qualified IRIs from JSON-LD broker
//! documents. The newtypes here keep the two from being interchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type Result<T> = std::result::Result<T, GangwayError>;

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum GangwayError {
    /// Network-level failure (unreachable host, timeout, connection reset)
    #[error("network error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response; the status code stays visible to the caller
    #[error("HTTP {status} from {context}")]
    Status { status: u16, context: String },

    /// Response body could not be decoded
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A catalog batch was requested for a connector whose access URL never
    /// resolved
    #[error("no resolved access URL for connector {0}")]
    AccessUrlUnavailable(Iri),
}

/// Identifier of a record in the local connector API.
///
/// Always derived from the final path segment of a record's `self` link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the identifier from a `_links.self.href` value.
    pub fn from_self_href(href: &str) -> Option<Self> {
        href.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(|segment| Self(segment.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully-qualified IRI in the broker / JSON-LD identifier space.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Self::new(iri)
    }
}
