//! Contract negotiation: rule form, request body, and receipt parsing.
//!
//! The negotiation body is a single `ids:Permission` wrapped in a one-element
//! array, assembled from user-edited form fields and the selections made
//! during the broker walk. Submission itself lives on `BrokerResolver`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::ids::OfferedResource;
use crate::types::Iri;

pub const DEFAULT_RULE_TITLE: &str = "Example Usage Policy";
pub const DEFAULT_RULE_DESCRIPTION: &str = "Usage policy provide access applied";
pub const DEFAULT_RULE_ACTION: &str = "https://w3id.org/idsa/code/USE";

const CONTRACT_AGREEMENT_TYPE: &str = "ids:ContractAgreement";

/// User-editable permission rule for a negotiation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleForm {
    pub title: String,
    pub description: String,
    /// Action IRI, e.g. the IDS USE code.
    pub action: Iri,
    /// Rule IRI, prefilled from the resource's first contract offer.
    pub rule_id: Option<Iri>,
    /// Target artifact IRI; prefilled from the selected artifact, editable.
    pub target: Option<Iri>,
}

impl Default for RuleForm {
    fn default() -> Self {
        Self {
            title: DEFAULT_RULE_TITLE.to_string(),
            description: DEFAULT_RULE_DESCRIPTION.to_string(),
            action: Iri::new(DEFAULT_RULE_ACTION),
            rule_id: None,
            target: None,
        }
    }
}

impl RuleForm {
    /// Recommended form for a selected resource and artifact: rule IRI from
    /// the resource's first contract offer, target from the artifact.
    pub fn recommended(resource: &OfferedResource, artifact: &Iri) -> Self {
        Self {
            rule_id: resource.recommended_rule().cloned(),
            target: Some(artifact.clone()),
            ..Self::default()
        }
    }
}

/// Build the negotiation body: one `ids:Permission` object in a one-element
/// array.
///
/// Returns `None` when the resource, artifact, or rule IRI is absent — a body
/// must not be submitted in that state.
pub fn build_negotiation_body(
    resource: Option<&OfferedResource>,
    artifact: Option<&Iri>,
    form: &RuleForm,
) -> Option<Value> {
    resource?;
    let artifact = artifact?;
    let rule_id = form.rule_id.as_ref().filter(|id| !id.is_empty())?;
    let target = form.target.as_ref().unwrap_or(artifact);

    Some(json!([
        {
            "@type": "ids:Permission",
            "@id": rule_id,
            "ids:title": [{ "@value": form.title }],
            "ids:description": [{ "@value": form.description }],
            "ids:action": [{ "@id": form.action }],
            "ids:target": target,
        }
    ]))
}

/// Raw response of the negotiation endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NegotiationResponse {
    /// Agreement payload; arrives either JSON-encoded in a string or as an
    /// object.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(rename = "remoteId", default)]
    pub remote_id: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
}

/// Interpreted outcome of a negotiation submission.
#[derive(Debug, Clone, Serialize)]
pub struct NegotiationReceipt {
    /// Agreement IRI, when the remote answered with a contract agreement.
    pub agreement_id: Option<Iri>,
    pub confirmed: bool,
    pub contract_start: Option<String>,
    pub contract_end: Option<String>,
    /// Unaltered endpoint response.
    pub response: NegotiationResponse,
}

impl NegotiationReceipt {
    /// Interpret a negotiation response.
    ///
    /// A string-encoded `value` is decoded as JSON first. A value that fails
    /// to decode yields an unconfirmed receipt; a decoded value of a foreign
    /// `@type` yields an unconfirmed receipt carrying the remote id. Neither
    /// case is an error.
    pub fn from_response(response: NegotiationResponse) -> Self {
        let value = match &response.value {
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(error = %e, "negotiation response value is not valid JSON");
                    None
                }
            },
            Some(other) => Some(other.clone()),
            None => None,
        };

        let Some(value) = value else {
            return Self {
                agreement_id: None,
                confirmed: false,
                contract_start: None,
                contract_end: None,
                response,
            };
        };

        if value.get("@type").and_then(Value::as_str) == Some(CONTRACT_AGREEMENT_TYPE) {
            let agreement_id = value
                .get("@id")
                .and_then(Value::as_str)
                .map(Iri::new)
                .or_else(|| response.remote_id.as_deref().map(Iri::new));
            let contract_start = localized_text(&value, "ids:contractStart");
            let contract_end = localized_text(&value, "ids:contractEnd");
            Self {
                agreement_id,
                confirmed: response.confirmed,
                contract_start,
                contract_end,
                response,
            }
        } else {
            Self {
                agreement_id: response.remote_id.as_deref().map(Iri::new),
                confirmed: false,
                contract_start: None,
                contract_end: None,
                response,
            }
        }
    }
}

fn localized_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.get("@value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource_with_rule() -> OfferedResource {
        serde_json::from_value(json!({
            "@id": "https://connectora/resources/R",
            "ids:contractOffer": [{ "@id": "https://connectora/rules/X" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_body_shape() {
        let resource = resource_with_rule();
        let artifact = Iri::new("https://connectora/artifacts/A");
        let form = RuleForm::recommended(&resource, &artifact);

        let body = build_negotiation_body(Some(&resource), Some(&artifact), &form).unwrap();
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);

        let permission = &entries[0];
        assert_eq!(permission["@type"], "ids:Permission");
        assert_eq!(permission["@id"], "https://connectora/rules/X");
        assert_eq!(permission["ids:target"], "https://connectora/artifacts/A");
        assert_eq!(permission["ids:title"][0]["@value"], DEFAULT_RULE_TITLE);
        assert_eq!(
            permission["ids:action"][0]["@id"],
            "https://w3id.org/idsa/code/USE"
        );
    }

    #[test]
    fn test_body_absent_inputs() {
        let resource = resource_with_rule();
        let artifact = Iri::new("https://connectora/artifacts/A");
        let form = RuleForm::recommended(&resource, &artifact);

        assert!(build_negotiation_body(None, Some(&artifact), &form).is_none());
        assert!(build_negotiation_body(Some(&resource), None, &form).is_none());

        let mut no_rule = form.clone();
        no_rule.rule_id = None;
        assert!(build_negotiation_body(Some(&resource), Some(&artifact), &no_rule).is_none());

        let mut empty_rule = form;
        empty_rule.rule_id = Some(Iri::new(""));
        assert!(build_negotiation_body(Some(&resource), Some(&artifact), &empty_rule).is_none());
    }

    #[test]
    fn test_recommended_prefill() {
        let resource = resource_with_rule();
        let artifact = Iri::new("https://connectora/artifacts/A");
        let form = RuleForm::recommended(&resource, &artifact);
        assert_eq!(
            form.rule_id.as_ref().map(Iri::as_str),
            Some("https://connectora/rules/X")
        );
        assert_eq!(form.target.as_ref(), Some(&artifact));
        assert_eq!(form.title, DEFAULT_RULE_TITLE);
    }

    #[test]
    fn test_receipt_from_string_encoded_agreement() {
        let agreement = json!({
            "@type": "ids:ContractAgreement",
            "@id": "https://connectora/agreements/7",
            "ids:contractStart": { "@value": "2024-01-01T00:00:00Z" },
            "ids:contractEnd": { "@value": "2025-01-01T00:00:00Z" }
        });
        let response = NegotiationResponse {
            value: Some(Value::String(agreement.to_string())),
            remote_id: Some("remote-7".to_string()),
            confirmed: true,
        };

        let receipt = NegotiationReceipt::from_response(response);
        assert_eq!(
            receipt.agreement_id.as_ref().map(Iri::as_str),
            Some("https://connectora/agreements/7")
        );
        assert!(receipt.confirmed);
        assert_eq!(receipt.contract_start.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(receipt.contract_end.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_receipt_from_object_agreement_without_id() {
        let response = NegotiationResponse {
            value: Some(json!({ "@type": "ids:ContractAgreement" })),
            remote_id: Some("remote-9".to_string()),
            confirmed: true,
        };
        let receipt = NegotiationReceipt::from_response(response);
        assert_eq!(receipt.agreement_id.as_ref().map(Iri::as_str), Some("remote-9"));
        assert!(receipt.confirmed);
    }

    #[test]
    fn test_receipt_from_unparseable_value_is_unconfirmed() {
        let response = NegotiationResponse {
            value: Some(Value::String("not json {{".to_string())),
            remote_id: Some("remote-1".to_string()),
            confirmed: true,
        };
        let receipt = NegotiationReceipt::from_response(response);
        assert!(receipt.agreement_id.is_none());
        assert!(!receipt.confirmed);
    }

    #[test]
    fn test_receipt_from_foreign_shape_is_unconfirmed() {
        let response = NegotiationResponse {
            value: Some(json!({ "@type": "ids:RejectionMessage" })),
            remote_id: Some("remote-2".to_string()),
            confirmed: true,
        };
        let receipt = NegotiationReceipt::from_response(response);
        assert_eq!(receipt.agreement_id.as_ref().map(Iri::as_str), Some("remote-2"));
        assert!(!receipt.confirmed);
    }
}
