//! Record model for the connector's HATEOAS management API.
//!
//! Every record carries `_links.self.href`; the final path segment of that
//! href is the record's local identifier. Collections arrive wrapped as
//! `{"_embedded": {"<key>": [...]}}` — the offers collection embeds under
//! `resources`, every other collection under its own name. An absent
//! `_embedded` block is an empty collection, not an error.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{GangwayError, LocalId, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfLink {
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default)]
    pub self_link: SelfLink,
}

/// Any record addressable through its `self` link.
pub trait SelfLinked {
    fn links(&self) -> &Links;

    /// Local identifier derived from the final segment of the self href.
    fn local_id(&self) -> Option<LocalId> {
        LocalId::from_self_href(&self.links().self_link.href)
    }

    fn self_href(&self) -> &str {
        &self.links().self_link.href
    }
}

macro_rules! impl_self_linked {
    ($($record:ty),+ $(,)?) => {
        $(impl SelfLinked for $record {
            fn links(&self) -> &Links {
                &self.links
            }
        })+
    };
}

/// Pull the embedded array under `key` out of a collection response.
pub(crate) fn embedded<T: serde::de::DeserializeOwned>(doc: &Value, key: &str) -> Result<Vec<T>> {
    match doc.get("_embedded").and_then(|e| e.get(key)) {
        Some(items) => {
            serde_json::from_value(items.clone()).map_err(|e| GangwayError::Parse(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

/// Timestamps arrive in the connector's offset format; tolerate both RFC 3339
/// and the compact `+0100`-style offset.
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub title: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Offer {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub sovereign: Option<String>,
    pub payment_modality: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl Offer {
    pub fn creation_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.creation_date.as_deref().and_then(parse_timestamp)
    }
}

/// Sort offers newest-first by creation date; offers without a parseable
/// timestamp sink to the end.
pub fn newest_first(offers: &mut [Offer]) {
    offers.sort_by(|a, b| b.creation_timestamp().cmp(&a.creation_timestamp()));
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Representation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_type: Option<String>,
    pub language: Option<String>,
    pub standard: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artifact {
    pub title: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contract {
    pub title: Option<String>,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub consumer: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rule {
    pub title: Option<String>,
    pub description: Option<String>,
    /// JSON-LD permission text, stored verbatim by the connector.
    pub value: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Agreement {
    /// Contract agreement payload, as stored by the consuming connector.
    pub value: Option<String>,
    pub remote_id: Option<String>,
    pub confirmed: Option<bool>,
    pub creation_date: Option<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl_self_linked!(Catalog, Offer, Representation, Artifact, Contract, Rule, Agreement);

// --- Creation payloads --------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCatalog {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub publisher: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub sovereign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_documentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_modality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepresentation {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtifact {
    pub title: String,
    pub description: String,
    /// Inline payload or reference the artifact serves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    pub title: String,
    pub description: String,
    pub provider: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
    pub title: String,
    pub description: String,
    /// JSON-LD permission text.
    pub value: String,
}
