//! JSON-LD graph primitives.
//!
//! Element-scoped broker responses carry a `@graph` array mixing node types;
//! nodes are discriminated by `@type` and identified by `@id`. Property keys
//! inside these nodes are unprefixed (`title`, `sameAs`, `accessURL`), unlike
//! the `ids:`-prefixed self-description documents.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::Iri;

pub const TYPE_BASE_CONNECTOR: &str = "ids:BaseConnector";
pub const TYPE_RESOURCE_CATALOG: &str = "ids:ResourceCatalog";
pub const TYPE_CONNECTOR_ENDPOINT: &str = "ids:ConnectorEndpoint";

/// Sentinel rendered for an access URL that never resolved.
pub const ACCESS_URL_UNAVAILABLE: &str = "N/A";

/// A localized `{"@value": ...}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedValue {
    #[serde(rename = "@value", default)]
    pub value: String,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

impl LocalizedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            value_type: None,
        }
    }
}

/// First `@value` of a localized array, if any.
pub fn first_value(values: &[LocalizedValue]) -> Option<&str> {
    values.first().map(|v| v.value.as_str())
}

/// An `{"@id": ...}` reference to another node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(rename = "@id")]
    pub id: Iri,
}

impl IdRef {
    pub fn new(id: impl Into<Iri>) -> Self {
        Self { id: id.into() }
    }
}

/// An element-scoped JSON-LD document: a flat `@graph` array of typed nodes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDocument {
    #[serde(rename = "@graph", default)]
    pub graph: Vec<serde_json::Value>,
}

impl GraphDocument {
    /// All nodes carrying the given `@type`, decoded as `T`.
    /// Nodes that fail to decode are skipped.
    pub fn nodes_of_type<T: DeserializeOwned>(&self, node_type: &str) -> Vec<T> {
        self.graph
            .iter()
            .filter(|node| node.get("@type").and_then(|t| t.as_str()) == Some(node_type))
            .filter_map(|node| serde_json::from_value(node.clone()).ok())
            .collect()
    }

    /// First node carrying the given `@type`, decoded as `T`.
    pub fn first_of_type<T: DeserializeOwned>(&self, node_type: &str) -> Option<T> {
        self.nodes_of_type(node_type).into_iter().next()
    }
}

/// An `ids:BaseConnector` node in an element-scoped graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorNode {
    #[serde(rename = "@id")]
    pub id: Iri,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub curator: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "securityProfile", default)]
    pub security_profile: Option<String>,
    /// `@id`s of the catalogs this connector declares.
    #[serde(rename = "resourceCatalog", default)]
    pub resource_catalog: Vec<Iri>,
}

/// An `ids:ResourceCatalog` node in an element-scoped graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogNode {
    #[serde(rename = "@id")]
    pub id: Iri,
    #[serde(rename = "@type", default)]
    pub node_type: Option<String>,
    /// Canonical URL of the catalog on its home connector.
    #[serde(rename = "sameAs", default)]
    pub same_as: Option<String>,
}

/// An `ids:ConnectorEndpoint` node in an element-scoped graph.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointNode {
    #[serde(rename = "@id", default)]
    pub id: Option<Iri>,
    #[serde(rename = "accessURL", default)]
    pub access_url: Option<String>,
}

/// Resolved network address of a connector, or the sentinel for a lookup
/// that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessUrl {
    Resolved(String),
    Unavailable,
}

impl AccessUrl {
    pub fn as_str(&self) -> &str {
        match self {
            AccessUrl::Resolved(url) => url,
            AccessUrl::Unavailable => ACCESS_URL_UNAVAILABLE,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AccessUrl::Resolved(_))
    }

    /// The resolved URL, or `None` for the sentinel.
    pub fn resolved(&self) -> Option<&str> {
        match self {
            AccessUrl::Resolved(url) => Some(url),
            AccessUrl::Unavailable => None,
        }
    }
}

impl fmt::Display for AccessUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AccessUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccessUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == ACCESS_URL_UNAVAILABLE {
            Ok(AccessUrl::Unavailable)
        } else {
            Ok(AccessUrl::Resolved(raw))
        }
    }
}
