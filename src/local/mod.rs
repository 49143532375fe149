//! Local connector graph: HATEOAS records and their client.

pub mod client;
pub mod records;

pub use client::{LocalClientConfig, LocalGraphClient};
pub use records::{
    newest_first, Agreement, Artifact, Catalog, Contract, Links, NewArtifact, NewCatalog,
    NewContract, NewOffer, NewRepresentation, NewRule, Offer, Representation, Rule, SelfLink,
    SelfLinked,
};
