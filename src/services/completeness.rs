//! Publish-readiness evaluation for offers.
//!
//! An offer is fit to publish once it reaches at least one artifact through a
//! representation and at least one rule through a contract. The evaluator
//! walks those two chains per offer and reports what is missing, in check
//! order.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::local::{LocalGraphClient, Offer, SelfLinked};
use crate::types::{LocalId, Result};

/// A reason an offer is not yet publishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Deficiency {
    /// The offer has no linked representations at all
    NoRepresentation,
    /// No linked representation carries an artifact
    NoArtifactBearingRepresentation,
    /// The offer has no linked contracts at all
    NoContract,
    /// No linked contract carries a rule
    NoRuleBearingContract,
    /// A fetch failed mid-check; the offer could not be fully evaluated
    CheckFailed,
}

impl Deficiency {
    /// Dashboard label for this deficiency.
    pub fn label(&self) -> &'static str {
        match self {
            Deficiency::NoRepresentation => "No linked representation",
            Deficiency::NoArtifactBearingRepresentation => "No representation with artifact",
            Deficiency::NoContract => "No linked contract",
            Deficiency::NoRuleBearingContract => "No contract with rule",
            Deficiency::CheckFailed => "Error checking completeness",
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completeness verdict for one offer. Recomputed whole on every pass, never
/// patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OfferStatus {
    pub complete: bool,
    pub missing: Vec<Deficiency>,
}

/// Evaluate a single offer against the publish-readiness invariant.
///
/// Checks run in order: linked representations, artifacts behind them, linked
/// contracts, rules behind them. The artifact and rule scans stop at the
/// first sibling with a qualifying child but visit every sibling before
/// concluding absence. A fetch failure ends this offer's evaluation with the
/// `CheckFailed` deficiency appended to whatever was already recorded.
pub async fn evaluate(client: &LocalGraphClient, offer_id: &LocalId) -> OfferStatus {
    let mut missing = Vec::new();
    if let Err(e) = run_checks(client, offer_id, &mut missing).await {
        warn!(offer = %offer_id, error = %e, "completeness check aborted");
        missing.push(Deficiency::CheckFailed);
    }
    OfferStatus {
        complete: missing.is_empty(),
        missing,
    }
}

async fn run_checks(
    client: &LocalGraphClient,
    offer_id: &LocalId,
    missing: &mut Vec<Deficiency>,
) -> Result<()> {
    let representations = client.offer_representations(offer_id).await?;
    if representations.is_empty() {
        missing.push(Deficiency::NoRepresentation);
    }

    let mut has_artifact = false;
    for representation in &representations {
        let Some(representation_id) = representation.local_id() else {
            continue;
        };
        if !client
            .representation_artifacts(&representation_id)
            .await?
            .is_empty()
        {
            has_artifact = true;
            break;
        }
    }
    if !has_artifact {
        missing.push(Deficiency::NoArtifactBearingRepresentation);
    }

    let contracts = client.offer_contracts(offer_id).await?;
    if contracts.is_empty() {
        missing.push(Deficiency::NoContract);
    }

    let mut has_rule = false;
    for contract in &contracts {
        let Some(contract_id) = contract.local_id() else {
            continue;
        };
        if !client.contract_rules(&contract_id).await?.is_empty() {
            has_rule = true;
            break;
        }
    }
    if !has_rule {
        missing.push(Deficiency::NoRuleBearingContract);
    }

    Ok(())
}

/// Evaluate every offer in the list, sequentially, one verdict per offer.
///
/// A failure inside one offer's evaluation becomes that offer's `CheckFailed`
/// deficiency and never aborts the rest of the batch.
pub async fn evaluate_all(
    client: &LocalGraphClient,
    offers: &[Offer],
) -> BTreeMap<LocalId, OfferStatus> {
    let mut results = BTreeMap::new();
    for offer in offers {
        let Some(offer_id) = offer.local_id() else {
            warn!(
                title = offer.title.as_deref().unwrap_or("<untitled>"),
                "offer has no usable self link, skipping"
            );
            continue;
        };
        let status = evaluate(client, &offer_id).await;
        debug!(offer = %offer_id, complete = status.complete, "offer evaluated");
        results.insert(offer_id, status);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deficiency_labels_match_dashboard() {
        assert_eq!(
            Deficiency::NoRepresentation.label(),
            "No linked representation"
        );
        assert_eq!(
            Deficiency::NoArtifactBearingRepresentation.label(),
            "No representation with artifact"
        );
        assert_eq!(Deficiency::NoContract.label(), "No linked contract");
        assert_eq!(
            Deficiency::NoRuleBearingContract.label(),
            "No contract with rule"
        );
        assert_eq!(Deficiency::CheckFailed.label(), "Error checking completeness");
    }

    #[test]
    fn test_status_default_is_incomplete() {
        let status = OfferStatus::default();
        assert!(!status.complete);
        assert!(status.missing.is_empty());
    }
}
