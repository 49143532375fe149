//! Selection state for the negotiation walk.
//!
//! The dashboard walks artifact → connector → catalogs → resource before a
//! negotiation can be submitted. Selections invalidate forward only: choosing
//! a new artifact discards the connector, catalog, and resource choices;
//! choosing a new connector discards catalogs and resources; changing the
//! catalog selection discards the fetched resource list. Nothing stale
//! survives a reset.

use serde_json::Value;

use crate::ids::{CatalogNode, OfferedResource};
use crate::services::broker::ResolvedConnector;
use crate::services::negotiation::{build_negotiation_body, RuleForm};
use crate::types::Iri;

#[derive(Debug, Default)]
pub struct NegotiationFlow {
    artifact: Option<Iri>,
    connector: Option<ResolvedConnector>,
    catalogs: Vec<CatalogNode>,
    resources: Vec<OfferedResource>,
    resource: Option<OfferedResource>,
    target_artifact: Option<Iri>,
    rule_form: RuleForm,
}

impl NegotiationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the broker artifact; discards every downstream selection.
    pub fn select_artifact(&mut self, artifact: Iri) {
        self.artifact = Some(artifact);
        self.connector = None;
        self.catalogs.clear();
        self.clear_resources();
    }

    /// Choose a connector; discards catalog and resource selections.
    pub fn select_connector(&mut self, connector: ResolvedConnector) {
        self.connector = Some(connector);
        self.catalogs.clear();
        self.clear_resources();
    }

    /// Replace the catalog selection; discards the fetched resource list.
    pub fn select_catalogs(&mut self, catalogs: Vec<CatalogNode>) {
        self.catalogs = catalogs;
        self.clear_resources();
    }

    /// Store the resources fetched for the current catalog selection.
    pub fn set_resources(&mut self, resources: Vec<OfferedResource>) {
        self.resources = resources;
        self.resource = None;
        self.target_artifact = None;
    }

    /// Choose a resource from the fetched list. The target artifact becomes
    /// the resource's first representation instance and the rule form is
    /// recomputed from the resource's first contract offer. Returns false if
    /// the id is not in the fetched list.
    pub fn select_resource(&mut self, resource_id: &Iri) -> bool {
        let Some(resource) = self
            .resources
            .iter()
            .find(|resource| &resource.id == resource_id)
            .cloned()
        else {
            return false;
        };
        self.target_artifact = resource.first_artifact().cloned();
        if let Some(artifact) = &self.target_artifact {
            self.rule_form = RuleForm::recommended(&resource, artifact);
        }
        self.resource = Some(resource);
        true
    }

    fn clear_resources(&mut self) {
        self.resources.clear();
        self.resource = None;
        self.target_artifact = None;
    }

    /// Negotiation body for the current selections, if submittable.
    pub fn build_body(&self) -> Option<Value> {
        build_negotiation_body(
            self.resource.as_ref(),
            self.target_artifact.as_ref(),
            &self.rule_form,
        )
    }

    pub fn artifact(&self) -> Option<&Iri> {
        self.artifact.as_ref()
    }

    pub fn connector(&self) -> Option<&ResolvedConnector> {
        self.connector.as_ref()
    }

    pub fn catalogs(&self) -> &[CatalogNode] {
        &self.catalogs
    }

    pub fn resources(&self) -> &[OfferedResource] {
        &self.resources
    }

    pub fn resource(&self) -> Option<&OfferedResource> {
        self.resource.as_ref()
    }

    pub fn target_artifact(&self) -> Option<&Iri> {
        self.target_artifact.as_ref()
    }

    pub fn rule_form(&self) -> &RuleForm {
        &self.rule_form
    }

    /// Mutable access for user edits to the rule form.
    pub fn rule_form_mut(&mut self) -> &mut RuleForm {
        &mut self.rule_form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AccessUrl, ConnectorNode};
    use serde_json::json;

    fn connector(id: &str) -> ResolvedConnector {
        let connector: ConnectorNode = serde_json::from_value(json!({ "@id": id })).unwrap();
        ResolvedConnector {
            connector,
            catalogs: vec![CatalogNode {
                id: Iri::new(format!("{id}/catalogs/1")),
                node_type: None,
                same_as: Some("https://localhost:8080/api/catalogs/1".to_string()),
            }],
            access_url: AccessUrl::Resolved(format!("{id}/api/ids/data")),
        }
    }

    fn resource(id: &str) -> OfferedResource {
        serde_json::from_value(json!({
            "@id": id,
            "ids:representation": [{
                "ids:instance": [{ "@id": format!("{id}/artifact") }]
            }],
            "ids:contractOffer": [{ "@id": format!("{id}/rule") }]
        }))
        .unwrap()
    }

    fn populated_flow() -> NegotiationFlow {
        let mut flow = NegotiationFlow::new();
        flow.select_artifact(Iri::new("https://broker/artifacts/1"));
        let conn = connector("https://connectora");
        let catalogs = conn.catalogs.clone();
        flow.select_connector(conn);
        flow.select_catalogs(catalogs);
        flow.set_resources(vec![resource("https://connectora/resources/1")]);
        assert!(flow.select_resource(&Iri::new("https://connectora/resources/1")));
        flow
    }

    #[test]
    fn test_resource_selection_prefills_rule_form() {
        let flow = populated_flow();
        assert_eq!(
            flow.target_artifact().map(Iri::as_str),
            Some("https://connectora/resources/1/artifact")
        );
        assert_eq!(
            flow.rule_form().rule_id.as_ref().map(Iri::as_str),
            Some("https://connectora/resources/1/rule")
        );
        assert!(flow.build_body().is_some());
    }

    #[test]
    fn test_new_artifact_resets_everything_downstream() {
        let mut flow = populated_flow();
        flow.select_artifact(Iri::new("https://broker/artifacts/2"));
        assert!(flow.connector().is_none());
        assert!(flow.catalogs().is_empty());
        assert!(flow.resources().is_empty());
        assert!(flow.resource().is_none());
        assert!(flow.target_artifact().is_none());
        assert!(flow.build_body().is_none());
    }

    #[test]
    fn test_new_connector_resets_catalogs_and_resources() {
        let mut flow = populated_flow();
        flow.select_connector(connector("https://connectorb"));
        assert!(flow.connector().is_some());
        assert!(flow.catalogs().is_empty());
        assert!(flow.resources().is_empty());
        assert!(flow.resource().is_none());
        // The artifact selection upstream survives
        assert_eq!(
            flow.artifact().map(Iri::as_str),
            Some("https://broker/artifacts/1")
        );
    }

    #[test]
    fn test_catalog_change_resets_resource_list() {
        let mut flow = populated_flow();
        flow.select_catalogs(Vec::new());
        assert!(flow.resources().is_empty());
        assert!(flow.resource().is_none());
        assert!(flow.build_body().is_none());
    }

    #[test]
    fn test_select_unknown_resource_is_rejected() {
        let mut flow = populated_flow();
        assert!(!flow.select_resource(&Iri::new("https://connectora/resources/404")));
        // The previous selection stays in place
        assert!(flow.resource().is_some());
    }
}
