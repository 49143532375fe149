//! Services layer for gangway
//!
//! Orchestration over the local and broker graph clients:
//!
//! - **completeness**: publish-readiness evaluation of offers
//! - **broker**: broker graph traversal and negotiation submission
//! - **negotiation**: rule form, request body, receipt parsing
//! - **flow**: forward-only selection state for the negotiation walk

pub mod broker;
pub mod completeness;
pub mod flow;
pub mod negotiation;

pub use broker::{BrokerResolver, BrokerResolverConfig, BrokerSelfDescription, ResolvedConnector};
pub use completeness::{evaluate, evaluate_all, Deficiency, OfferStatus};
pub use flow::NegotiationFlow;
pub use negotiation::{
    build_negotiation_body, NegotiationReceipt, NegotiationResponse, RuleForm,
    DEFAULT_RULE_ACTION, DEFAULT_RULE_DESCRIPTION, DEFAULT_RULE_TITLE,
};
