//! Gangway - resource-graph resolution for dataspace connector dashboards
//!
//! Gangway walks the linked-data graphs behind a dataspace connector operator
//! dashboard: the connector's own HATEOAS resource graph and the JSON-LD
//! self-descriptions served by a metadata broker.
//!
//! ## Components
//!
//! - **LocalGraphClient**: typed access to the connector's catalogs, offers,
//!   representations, artifacts, contracts, rules, and agreements
//! - **Completeness**: publish-readiness evaluation of offers with structured
//!   deficiency reports
//! - **BrokerResolver**: broker graph traversal from self-description down to
//!   remote catalog contents, and contract-negotiation submission
//! - **NegotiationFlow**: forward-only selection state for the negotiation
//!   walk

pub mod config;
pub mod ids;
pub mod local;
pub mod services;
pub mod types;

pub use config::Args;
pub use local::LocalGraphClient;
pub use services::{BrokerResolver, NegotiationFlow};
pub use types::{GangwayError, Iri, LocalId, Result};
