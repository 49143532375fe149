//! Broker graph resolution.
//!
//! Walks the broker's self-description down to its artifact leaves, resolves
//! the connectors advertising a chosen artifact together with their catalogs
//! and access URLs, fetches remote catalog contents through the
//! recipient-addressed description endpoint, and submits contract
//! negotiations.
//!
//! Two failure policies coexist and must stay distinct: per-connector access
//! URL lookups fan out concurrently and degrade to a sentinel on failure,
//! while the catalog batch runs sequentially and aborts whole on the first
//! error.

use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Args;
use crate::ids::{
    AccessUrl, BrokerCatalog, CatalogNode, ConnectorNode, EndpointNode, GraphDocument,
    OfferedResource, SelfDescription, TYPE_BASE_CONNECTOR, TYPE_CONNECTOR_ENDPOINT,
    TYPE_RESOURCE_CATALOG,
};
use crate::services::negotiation::{NegotiationReceipt, NegotiationResponse};
use crate::types::{GangwayError, Iri, Result};

/// Configuration for the broker resolver.
#[derive(Debug, Clone)]
pub struct BrokerResolverConfig {
    /// Base URL of the consuming connector's API, which proxies IDS calls
    pub consumer_api_url: String,
    /// Recipient IRI of the broker's infrastructure endpoint
    pub broker_recipient: Iri,
    /// Host under which provider catalogs publish canonical URLs
    pub provider_default_host: String,
    /// Timeout for HTTP requests
    pub request_timeout: Duration,
}

impl Default for BrokerResolverConfig {
    fn default() -> Self {
        Self {
            consumer_api_url: "http://localhost:8081/api".to_string(),
            broker_recipient: Iri::new("https://broker-reverseproxy/infrastructure"),
            provider_default_host: "https://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Broker self-description plus the artifact IRIs extracted from it.
///
/// An empty artifact list is "nothing to select", not an error.
#[derive(Debug, Clone)]
pub struct BrokerSelfDescription {
    pub document: SelfDescription,
    /// Artifact IRIs in document order, duplicates preserved.
    pub artifact_iris: Vec<Iri>,
}

/// A connector advertising a chosen artifact, with its declared catalogs
/// joined in and its access URL resolved best-effort.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConnector {
    #[serde(flatten)]
    pub connector: ConnectorNode,
    pub catalogs: Vec<CatalogNode>,
    #[serde(rename = "accessURL")]
    pub access_url: AccessUrl,
}

/// Resolver over the broker description and negotiation endpoints.
pub struct BrokerResolver {
    config: BrokerResolverConfig,
    http: Client,
}

impl BrokerResolver {
    pub fn new() -> Self {
        Self::with_config(BrokerResolverConfig::default())
    }

    pub fn with_config(config: BrokerResolverConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::with_config(BrokerResolverConfig {
            consumer_api_url: args.consumer_api_url.clone(),
            broker_recipient: Iri::new(args.broker_recipient.clone()),
            provider_default_host: args.provider_default_host.clone(),
            request_timeout: args.request_timeout(),
        })
    }

    fn description_url(&self, recipient: &str, element_id: Option<&str>) -> String {
        let mut url = format!(
            "{}/ids/description?recipient={}",
            self.config.consumer_api_url.trim_end_matches('/'),
            urlencoding::encode(recipient)
        );
        if let Some(element) = element_id {
            url.push_str("&elementId=");
            url.push_str(&urlencoding::encode(element));
        }
        url
    }

    async fn post_description(
        &self,
        recipient: &str,
        element_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.description_url(recipient, element_id);
        debug!(url = %url, "posting description request");
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| GangwayError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GangwayError::Status {
                status: response.status().as_u16(),
                context: url,
            });
        }
        Ok(response)
    }

    /// Fetch the broker's self-description and extract every artifact IRI
    /// reachable through the catalog nesting, in document order.
    pub async fn fetch_self_description(&self) -> Result<BrokerSelfDescription> {
        let response = self
            .post_description(self.config.broker_recipient.as_str(), None)
            .await?;
        let document: SelfDescription = response
            .json()
            .await
            .map_err(|e| GangwayError::Parse(e.to_string()))?;
        let artifact_iris = document.artifact_iris();
        debug!(artifacts = artifact_iris.len(), "broker self-description fetched");
        Ok(BrokerSelfDescription {
            document,
            artifact_iris,
        })
    }

    /// Resolve the connectors advertising `artifact`, each with its declared
    /// catalogs and a best-effort access URL.
    ///
    /// Catalog IDs without a matching `ResourceCatalog` node are silently
    /// dropped. Access URLs resolve concurrently; one connector's failed
    /// lookup degrades that connector to `AccessUrl::Unavailable` without
    /// affecting the rest.
    pub async fn resolve_connectors_for_artifact(
        &self,
        artifact: &Iri,
    ) -> Result<Vec<ResolvedConnector>> {
        let response = self
            .post_description(self.config.broker_recipient.as_str(), Some(artifact.as_str()))
            .await?;
        let document: GraphDocument = response
            .json()
            .await
            .map_err(|e| GangwayError::Parse(e.to_string()))?;

        let connectors: Vec<ConnectorNode> = document.nodes_of_type(TYPE_BASE_CONNECTOR);
        let catalog_nodes: Vec<CatalogNode> = document.nodes_of_type(TYPE_RESOURCE_CATALOG);
        debug!(
            connectors = connectors.len(),
            catalogs = catalog_nodes.len(),
            artifact = %artifact,
            "resolving connectors for artifact"
        );

        let resolutions = connectors.into_iter().map(|connector| {
            let catalogs: Vec<CatalogNode> = connector
                .resource_catalog
                .iter()
                .filter_map(|catalog_id| {
                    catalog_nodes.iter().find(|c| &c.id == catalog_id).cloned()
                })
                .collect();
            async move {
                let access_url = self.resolve_access_url(&connector.id).await;
                ResolvedConnector {
                    connector,
                    catalogs,
                    access_url,
                }
            }
        });

        Ok(join_all(resolutions).await)
    }

    /// Resolve a connector's network access URL through its
    /// `ConnectorEndpoint` node.
    ///
    /// Best-effort enrichment: any failure (HTTP error, transport error,
    /// absent node) yields `AccessUrl::Unavailable`. This call never fails.
    pub async fn resolve_access_url(&self, element: &Iri) -> AccessUrl {
        let response = match self
            .post_description(self.config.broker_recipient.as_str(), Some(element.as_str()))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(element = %element, error = %e, "access URL lookup failed");
                return AccessUrl::Unavailable;
            }
        };
        let document: GraphDocument = match response.json().await {
            Ok(document) => document,
            Err(e) => {
                warn!(element = %element, error = %e, "access URL document unreadable");
                return AccessUrl::Unavailable;
            }
        };
        match document
            .first_of_type::<EndpointNode>(TYPE_CONNECTOR_ENDPOINT)
            .and_then(|endpoint| endpoint.access_url)
        {
            Some(url) => AccessUrl::Resolved(url),
            None => AccessUrl::Unavailable,
        }
    }

    /// Fetch the offered resources of the selected catalogs, concatenated in
    /// selection order without de-duplication.
    ///
    /// Sequential and fail-fast: each catalog's canonical URL is rewritten to
    /// the connector's resolved access URL and fetched in turn; the first
    /// failure aborts the batch with no partial result.
    pub async fn fetch_catalog_resources(
        &self,
        connector: &ResolvedConnector,
        selected_catalogs: &[CatalogNode],
    ) -> Result<Vec<OfferedResource>> {
        let Some(access_url) = connector.access_url.resolved() else {
            return Err(GangwayError::AccessUrlUnavailable(
                connector.connector.id.clone(),
            ));
        };
        let access_base = access_url.trim_end_matches('/');

        let mut resources = Vec::new();
        for catalog in selected_catalogs {
            let Some(canonical) = catalog.same_as.as_deref() else {
                return Err(GangwayError::Parse(format!(
                    "catalog {} has no canonical URL",
                    catalog.id
                )));
            };
            let catalog_url = canonical.replace(&self.config.provider_default_host, access_base);
            debug!(catalog = %catalog.id, url = %catalog_url, "fetching catalog");
            let response = self
                .post_description(connector.access_url.as_str(), Some(&catalog_url))
                .await?;
            let document: BrokerCatalog = response
                .json()
                .await
                .map_err(|e| GangwayError::Parse(e.to_string()))?;
            resources.extend(document.offered_resource);
        }
        Ok(resources)
    }

    /// Submit a negotiation body to the consuming connector's contract
    /// endpoint, addressed at the chosen connector.
    ///
    /// The response's `value` field is interpreted tolerantly: a payload that
    /// fails to decode yields an unconfirmed receipt, not an error.
    pub async fn submit_negotiation(
        &self,
        connector: &ResolvedConnector,
        resource_id: &Iri,
        artifact: &Iri,
        body: &Value,
    ) -> Result<NegotiationReceipt> {
        let url = format!(
            "{}/ids/contract?recipient={}&resourceIds={}&artifactIds={}&download=false",
            self.config.consumer_api_url.trim_end_matches('/'),
            urlencoding::encode(connector.access_url.as_str()),
            urlencoding::encode(resource_id.as_str()),
            urlencoding::encode(artifact.as_str()),
        );
        debug!(url = %url, "submitting negotiation");
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GangwayError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GangwayError::Status {
                status: response.status().as_u16(),
                context: url,
            });
        }
        let parsed: NegotiationResponse = response
            .json()
            .await
            .map_err(|e| GangwayError::Parse(e.to_string()))?;
        Ok(NegotiationReceipt::from_response(parsed))
    }
}

impl Default for BrokerResolver {
    fn default() -> Self {
        Self::new()
    }
}
