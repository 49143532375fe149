//! IDS information-model types
//!
//! The broker and remote connectors speak JSON-LD shaped after the IDS
//! information model. Two document shapes occur:
//!
//! - **Self-descriptions** (`description`): nested documents with
//!   `ids:`-prefixed keys, from the broker root down to artifact instances
//! - **Element-scoped graphs** (`graph`): flat `@graph` arrays of typed nodes
//!   (`ids:BaseConnector`, `ids:ResourceCatalog`, `ids:ConnectorEndpoint`)
//!   whose property keys are unprefixed

pub mod description;
pub mod graph;

pub use description::{
    BrokerCatalog, BrokerRepresentation, DescribedEndpoint, OfferedResource, SelfDescription,
};
pub use graph::{
    first_value, AccessUrl, CatalogNode, ConnectorNode, EndpointNode, GraphDocument, IdRef,
    LocalizedValue, ACCESS_URL_UNAVAILABLE, TYPE_BASE_CONNECTOR, TYPE_CONNECTOR_ENDPOINT,
    TYPE_RESOURCE_CATALOG,
};
