//! Broker self-description documents.
//!
//! The broker answers an unscoped description request with a nested document
//! describing itself, its endpoints, and the catalogs it aggregates. Artifact
//! IRIs live at the leaves of the fixed nesting
//! `ids:resourceCatalog → ids:offeredResource → ids:representation →
//! ids:instance`; no flattened or alternate shape is assumed.

use serde::{Deserialize, Serialize};

use super::graph::{first_value, IdRef, LocalizedValue};
use crate::types::Iri;

/// Self-description returned by the broker for an unscoped request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfDescription {
    #[serde(rename = "@id", default)]
    pub id: Option<Iri>,
    #[serde(rename = "@type", default)]
    pub document_type: Option<String>,
    #[serde(rename = "ids:title", default)]
    pub title: Vec<LocalizedValue>,
    #[serde(rename = "ids:description", default)]
    pub description: Vec<LocalizedValue>,
    #[serde(rename = "ids:hasDefaultEndpoint", default)]
    pub default_endpoint: Option<DescribedEndpoint>,
    #[serde(rename = "ids:hasEndpoint", default)]
    pub endpoints: Vec<DescribedEndpoint>,
    #[serde(rename = "ids:resourceCatalog", default)]
    pub resource_catalog: Vec<BrokerCatalog>,
}

impl SelfDescription {
    pub fn title_text(&self) -> Option<&str> {
        first_value(&self.title)
    }

    pub fn description_text(&self) -> Option<&str> {
        first_value(&self.description)
    }

    /// Access URL of the default endpoint, if described.
    pub fn default_access_url(&self) -> Option<&str> {
        self.default_endpoint
            .as_ref()
            .and_then(|endpoint| endpoint.access_url.as_ref())
            .map(|access| access.id.as_str())
    }

    /// Every artifact IRI reachable through the catalog nesting, in document
    /// order. Duplicates are preserved.
    pub fn artifact_iris(&self) -> Vec<Iri> {
        let mut artifacts = Vec::new();
        for catalog in &self.resource_catalog {
            for resource in &catalog.offered_resource {
                for representation in &resource.representation {
                    for instance in &representation.instance {
                        artifacts.push(instance.id.clone());
                    }
                }
            }
        }
        artifacts
    }
}

/// An endpoint listed in a self-description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribedEndpoint {
    #[serde(rename = "@id", default)]
    pub id: Option<Iri>,
    #[serde(rename = "@type", default)]
    pub endpoint_type: Option<String>,
    #[serde(rename = "ids:path", default)]
    pub path: Option<String>,
    #[serde(rename = "ids:accessURL", default)]
    pub access_url: Option<IdRef>,
    #[serde(rename = "ids:endpointInformation", default)]
    pub information: Vec<LocalizedValue>,
}

/// A catalog aggregated by the broker, or the root of an element-scoped
/// catalog fetch (both carry `ids:offeredResource`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerCatalog {
    #[serde(rename = "@id", default)]
    pub id: Option<Iri>,
    #[serde(rename = "@type", default)]
    pub catalog_type: Option<String>,
    #[serde(rename = "ids:offeredResource", default)]
    pub offered_resource: Vec<OfferedResource>,
}

/// A resource offered in a catalog, as described by the broker or a remote
/// connector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferedResource {
    #[serde(rename = "@id", default)]
    pub id: Iri,
    #[serde(rename = "@type", default)]
    pub resource_type: Option<String>,
    #[serde(rename = "ids:title", default)]
    pub title: Vec<LocalizedValue>,
    #[serde(rename = "ids:description", default)]
    pub description: Vec<LocalizedValue>,
    #[serde(rename = "ids:keyword", default)]
    pub keyword: Vec<LocalizedValue>,
    #[serde(rename = "ids:language", default)]
    pub language: Vec<IdRef>,
    #[serde(rename = "ids:publisher", default)]
    pub publisher: Option<IdRef>,
    #[serde(rename = "ids:created", default)]
    pub created: Option<LocalizedValue>,
    #[serde(rename = "ids:modified", default)]
    pub modified: Option<LocalizedValue>,
    #[serde(rename = "ids:representation", default)]
    pub representation: Vec<BrokerRepresentation>,
    #[serde(rename = "ids:contractOffer", default)]
    pub contract_offer: Vec<IdRef>,
}

impl OfferedResource {
    pub fn title_text(&self) -> Option<&str> {
        first_value(&self.title)
    }

    pub fn description_text(&self) -> Option<&str> {
        first_value(&self.description)
    }

    /// First artifact instance of the first representation — the default
    /// negotiation target for this resource.
    pub fn first_artifact(&self) -> Option<&Iri> {
        self.representation
            .first()
            .and_then(|representation| representation.instance.first())
            .map(|instance| &instance.id)
    }

    /// Rule IRI of the first contract offer, used to prefill negotiation
    /// forms.
    pub fn recommended_rule(&self) -> Option<&Iri> {
        self.contract_offer.first().map(|offer| &offer.id)
    }
}

/// A representation of an offered resource; its `ids:instance` entries are
/// artifacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerRepresentation {
    #[serde(rename = "@id", default)]
    pub id: Option<Iri>,
    #[serde(rename = "@type", default)]
    pub representation_type: Option<String>,
    #[serde(rename = "ids:instance", default)]
    pub instance: Vec<IdRef>,
}
