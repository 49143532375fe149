//! Negotiation submission integration tests against a mocked consumer
//! connector.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gangway::ids::{AccessUrl, OfferedResource};
use gangway::services::broker::{BrokerResolver, BrokerResolverConfig, ResolvedConnector};
use gangway::services::negotiation::{build_negotiation_body, RuleForm};
use gangway::types::{GangwayError, Iri};

fn resolver_for(server: &MockServer) -> BrokerResolver {
    BrokerResolver::with_config(BrokerResolverConfig {
        consumer_api_url: format!("{}/api", server.uri()),
        broker_recipient: Iri::new("https://broker-reverseproxy/infrastructure"),
        provider_default_host: "https://localhost:8080".to_string(),
        request_timeout: Duration::from_secs(5),
    })
}

fn connector() -> ResolvedConnector {
    ResolvedConnector {
        connector: serde_json::from_value(json!({ "@id": "https://connector-one/" })).unwrap(),
        catalogs: Vec::new(),
        access_url: AccessUrl::Resolved("https://connector-one/api/ids/data".to_string()),
    }
}

fn resource() -> OfferedResource {
    serde_json::from_value(json!({
        "@id": "https://connector-one/resources/R",
        "ids:representation": [{
            "ids:instance": [{ "@id": "https://connector-one/artifacts/A" }]
        }],
        "ids:contractOffer": [{ "@id": "https://connector-one/rules/X" }]
    }))
    .unwrap()
}

#[tokio::test]
async fn submission_sends_the_permission_body_and_parses_the_agreement() {
    let server = MockServer::start().await;
    let resource = resource();
    let artifact = Iri::new("https://connector-one/artifacts/A");
    let form = RuleForm::recommended(&resource, &artifact);
    let body = build_negotiation_body(Some(&resource), Some(&artifact), &form).unwrap();

    let agreement = json!({
        "@type": "ids:ContractAgreement",
        "@id": "https://connector-one/agreements/7",
        "ids:contractStart": { "@value": "2024-01-01T00:00:00Z" },
        "ids:contractEnd": { "@value": "2025-01-01T00:00:00Z" }
    });

    Mock::given(method("POST"))
        .and(path("/api/ids/contract"))
        .and(query_param("recipient", "https://connector-one/api/ids/data"))
        .and(query_param("resourceIds", "https://connector-one/resources/R"))
        .and(query_param("artifactIds", "https://connector-one/artifacts/A"))
        .and(query_param("download", "false"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": agreement.to_string(),
            "remoteId": "remote-7",
            "confirmed": true
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let receipt = resolver
        .submit_negotiation(&connector(), &resource.id, &artifact, &body)
        .await
        .unwrap();

    assert!(receipt.confirmed);
    assert_eq!(
        receipt.agreement_id.as_ref().map(Iri::as_str),
        Some("https://connector-one/agreements/7")
    );
    assert_eq!(receipt.contract_start.as_deref(), Some("2024-01-01T00:00:00Z"));
    assert_eq!(receipt.contract_end.as_deref(), Some("2025-01-01T00:00:00Z"));
}

#[tokio::test]
async fn unparseable_agreement_value_is_unconfirmed_not_an_error() {
    let server = MockServer::start().await;
    let resource = resource();
    let artifact = Iri::new("https://connector-one/artifacts/A");
    let form = RuleForm::recommended(&resource, &artifact);
    let body = build_negotiation_body(Some(&resource), Some(&artifact), &form).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/ids/contract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "mangled {{ payload",
            "remoteId": "remote-1",
            "confirmed": true
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let receipt = resolver
        .submit_negotiation(&connector(), &resource.id, &artifact, &body)
        .await
        .unwrap();

    assert!(!receipt.confirmed);
    assert!(receipt.agreement_id.is_none());
    assert_eq!(receipt.response.remote_id.as_deref(), Some("remote-1"));
}

#[tokio::test]
async fn rejected_submission_surfaces_the_status() {
    let server = MockServer::start().await;
    let resource = resource();
    let artifact = Iri::new("https://connector-one/artifacts/A");
    let form = RuleForm::recommended(&resource, &artifact);
    let body = build_negotiation_body(Some(&resource), Some(&artifact), &form).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/ids/contract"))
        .respond_with(ResponseTemplate::new(417))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let err = resolver
        .submit_negotiation(&connector(), &resource.id, &artifact, &body)
        .await
        .unwrap_err();

    match err {
        GangwayError::Status { status, .. } => assert_eq!(status, 417),
        other => panic!("expected status error, got {other}"),
    }
}

#[test]
fn body_round_trips_the_user_edits() {
    let resource = resource();
    let artifact = Iri::new("https://connector-one/artifacts/A");
    let mut form = RuleForm::recommended(&resource, &artifact);
    form.title = "Weekend Access".to_string();
    form.description = "Usage limited to weekends".to_string();

    let body = build_negotiation_body(Some(&resource), Some(&artifact), &form).unwrap();
    let permission = &body.as_array().unwrap()[0];
    assert_eq!(permission["ids:title"][0]["@value"], "Weekend Access");
    assert_eq!(
        permission["ids:description"][0]["@value"],
        "Usage limited to weekends"
    );
    assert_eq!(permission["@id"], "https://connector-one/rules/X");
    assert_eq!(permission["ids:target"], "https://connector-one/artifacts/A");
}

#[test]
fn body_is_absent_without_a_rule() {
    let resource: OfferedResource =
        serde_json::from_value(json!({ "@id": "https://connector-one/resources/bare" })).unwrap();
    let artifact = Iri::new("https://connector-one/artifacts/A");
    let form = RuleForm::recommended(&resource, &artifact);

    assert!(form.rule_id.is_none());
    assert!(build_negotiation_body(Some(&resource), Some(&artifact), &form).is_none());
}

#[test]
fn edited_target_wins_over_the_selected_artifact() {
    let resource = resource();
    let artifact = Iri::new("https://connector-one/artifacts/A");
    let mut form = RuleForm::recommended(&resource, &artifact);
    form.target = Some(Iri::new("https://connector-one/artifacts/B"));

    let body = build_negotiation_body(Some(&resource), Some(&artifact), &form).unwrap();
    let permission = &body.as_array().unwrap()[0];
    assert_eq!(permission["ids:target"], "https://connector-one/artifacts/B");
}
