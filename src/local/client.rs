//! Client for the local connector's HATEOAS management API.
//!
//! Stateless: every call issues a fresh request and returns short-lived
//! snapshots. Identifiers passed to the child-relation accessors must come
//! from `self` links of the same API; handing over a broker IRI is a
//! programming error, not a recoverable condition.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::records::{
    embedded, Agreement, Artifact, Catalog, Contract, NewArtifact, NewCatalog, NewContract,
    NewOffer, NewRepresentation, NewRule, Offer, Representation, Rule,
};
use crate::config::Args;
use crate::types::{GangwayError, LocalId, Result};

/// Configuration for the local graph client.
#[derive(Debug, Clone)]
pub struct LocalClientConfig {
    /// Base URL of the connector management API
    pub base_url: String,
    /// Timeout for HTTP requests
    pub request_timeout: Duration,
}

impl Default for LocalClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Typed access to the connector's linked collections.
pub struct LocalGraphClient {
    config: LocalClientConfig,
    http: Client,
}

impl LocalGraphClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(LocalClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn with_config(config: LocalClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::with_config(LocalClientConfig {
            base_url: args.connector_api_url.clone(),
            request_timeout: args.request_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_collection<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>> {
        let url = self.url(path);
        debug!(url = %url, "fetching collection");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GangwayError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GangwayError::Status {
                status: response.status().as_u16(),
                context: url,
            });
        }
        let doc: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GangwayError::Parse(e.to_string()))?;
        embedded(&doc, key)
    }

    async fn post_record<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "creating record");
        let response = self
            .http
            .post(&url)
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
        response
            .json()
            .await
            .map_err(|e| GangwayError::Parse(e.to_string()))
    }

    /// POST an array of child self-hrefs onto a parent relation.
    async fn link_children(&self, path: &str, hrefs: &[String]) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, children = hrefs.len(), "linking children");
        let response = self
            .http
            .post(&url)
            .json(&hrefs)
            .send()
            .await
            .map_err(|e| GangwayError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GangwayError::Status {
                status: response.status().as_u16(),
                context: url,
            });
        }
        Ok(())
    }

    // --- collections ----------------------------------------------------

    pub async fn list_catalogs(&self) -> Result<Vec<Catalog>> {
        self.get_collection("catalogs", "catalogs").await
    }

    /// Offers embed under `resources`, unlike every other collection.
    pub async fn list_offers(&self) -> Result<Vec<Offer>> {
        self.get_collection("offers", "resources").await
    }

    pub async fn list_representations(&self) -> Result<Vec<Representation>> {
        self.get_collection("representations", "representations").await
    }

    pub async fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        self.get_collection("artifacts", "artifacts").await
    }

    pub async fn list_contracts(&self) -> Result<Vec<Contract>> {
        self.get_collection("contracts", "contracts").await
    }

    pub async fn list_rules(&self) -> Result<Vec<Rule>> {
        self.get_collection("rules", "rules").await
    }

    pub async fn list_agreements(&self) -> Result<Vec<Agreement>> {
        self.get_collection("agreements", "agreements").await
    }

    // --- child relations -------------------------------------------------

    pub async fn catalog_offers(&self, catalog: &LocalId) -> Result<Vec<Offer>> {
        self.get_collection(&format!("catalogs/{}/offers", catalog), "resources")
            .await
    }

    pub async fn offer_representations(&self, offer: &LocalId) -> Result<Vec<Representation>> {
        self.get_collection(
            &format!("offers/{}/representations", offer),
            "representations",
        )
        .await
    }

    pub async fn representation_artifacts(
        &self,
        representation: &LocalId,
    ) -> Result<Vec<Artifact>> {
        self.get_collection(
            &format!("representations/{}/artifacts", representation),
            "artifacts",
        )
        .await
    }

    pub async fn offer_contracts(&self, offer: &LocalId) -> Result<Vec<Contract>> {
        self.get_collection(&format!("offers/{}/contracts", offer), "contracts")
            .await
    }

    pub async fn contract_rules(&self, contract: &LocalId) -> Result<Vec<Rule>> {
        self.get_collection(&format!("contracts/{}/rules", contract), "rules")
            .await
    }

    pub async fn agreement_artifacts(&self, agreement: &LocalId) -> Result<Vec<Artifact>> {
        self.get_collection(&format!("agreements/{}/artifacts", agreement), "artifacts")
            .await
    }

    // --- creation ---------------------------------------------------------

    pub async fn create_catalog(&self, form: &NewCatalog) -> Result<Catalog> {
        self.post_record("catalogs", form).await
    }

    pub async fn create_offer(&self, form: &NewOffer) -> Result<Offer> {
        self.post_record("offers", form).await
    }

    pub async fn create_representation(&self, form: &NewRepresentation) -> Result<Representation> {
        self.post_record("representations", form).await
    }

    pub async fn create_artifact(&self, form: &NewArtifact) -> Result<Artifact> {
        self.post_record("artifacts", form).await
    }

    pub async fn create_contract(&self, form: &NewContract) -> Result<Contract> {
        self.post_record("contracts", form).await
    }

    pub async fn create_rule(&self, form: &NewRule) -> Result<Rule> {
        self.post_record("rules", form).await
    }

    // --- linking ----------------------------------------------------------

    pub async fn link_offers_to_catalog(
        &self,
        catalog: &LocalId,
        offer_hrefs: &[String],
    ) -> Result<()> {
        self.link_children(&format!("catalogs/{}/offers", catalog), offer_hrefs)
            .await
    }

    pub async fn link_representations_to_offer(
        &self,
        offer: &LocalId,
        representation_hrefs: &[String],
    ) -> Result<()> {
        self.link_children(
            &format!("offers/{}/representations", offer),
            representation_hrefs,
        )
        .await
    }

    pub async fn link_artifacts_to_representation(
        &self,
        representation: &LocalId,
        artifact_hrefs: &[String],
    ) -> Result<()> {
        self.link_children(
            &format!("representations/{}/artifacts", representation),
            artifact_hrefs,
        )
        .await
    }

    pub async fn link_contracts_to_offer(
        &self,
        offer: &LocalId,
        contract_hrefs: &[String],
    ) -> Result<()> {
        self.link_children(&format!("offers/{}/contracts", offer), contract_hrefs)
            .await
    }

    pub async fn link_rules_to_contract(
        &self,
        contract: &LocalId,
        rule_hrefs: &[String],
    ) -> Result<()> {
        self.link_children(&format!("contracts/{}/rules", contract), rule_hrefs)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LocalClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = LocalGraphClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("offers"), "http://localhost:8080/api/offers");
    }
}
