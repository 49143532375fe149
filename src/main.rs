//! Gangway CLI - drive the graph-resolution engine from the command line
//!
//! Thin shell over the library: parses configuration, initializes tracing,
//! invokes one engine operation, and prints the result as JSON. All traversal
//! logic lives in the library modules.

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gangway::services::{completeness, negotiation};
use gangway::{Args, BrokerResolver, Iri, LocalGraphClient};

#[derive(Parser, Debug)]
#[command(name = "gangway")]
#[command(about = "Resource-graph resolution and contract negotiation for dataspace connectors")]
struct Cli {
    #[command(flatten)]
    args: Args,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List local offers, newest first, annotated with completeness status
    Offers,
    /// List local catalogs
    Catalogs,
    /// Fetch the broker self-description and the artifact IRIs it exposes
    Broker,
    /// Resolve the connectors advertising an artifact
    Connectors {
        /// Artifact IRI from the broker self-description
        artifact: String,
    },
    /// Fetch the offered resources of a connector's catalogs
    Resources {
        /// Artifact IRI used to resolve the connector
        artifact: String,
        /// IRI of the connector to fetch from
        connector: String,
    },
    /// Build and submit a contract negotiation for a resource
    Negotiate {
        /// Artifact IRI used to resolve the connector
        artifact: String,
        /// IRI of the connector to negotiate with
        connector: String,
        /// IRI of the offered resource
        resource: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let args = cli.args;

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gangway={},warn", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        anyhow::bail!("configuration error: {}", e);
    }

    info!(
        connector_api = %args.connector_api_url,
        consumer_api = %args.consumer_api_url,
        broker = %args.broker_recipient,
        "gangway starting"
    );

    match cli.command {
        Command::Offers => {
            let client = LocalGraphClient::from_args(&args);
            let mut offers = client.list_offers().await?;
            gangway::local::newest_first(&mut offers);
            let statuses = completeness::evaluate_all(&client, &offers).await;
            let report: Vec<_> = statuses
                .iter()
                .map(|(id, status)| {
                    json!({
                        "offer": id,
                        "complete": status.complete,
                        "missing": status.missing.iter().map(|d| d.label()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            print_json(&json!({ "offers": offers, "completeness": report }))?;
        }
        Command::Catalogs => {
            let client = LocalGraphClient::from_args(&args);
            let catalogs = client.list_catalogs().await?;
            print_json(&json!({ "catalogs": catalogs }))?;
        }
        Command::Broker => {
            let resolver = BrokerResolver::from_args(&args);
            let description = resolver.fetch_self_description().await?;
            print_json(&json!({
                "title": description.document.title_text(),
                "accessURL": description.document.default_access_url(),
                "artifacts": description.artifact_iris,
            }))?;
        }
        Command::Connectors { artifact } => {
            let resolver = BrokerResolver::from_args(&args);
            let connectors = resolver
                .resolve_connectors_for_artifact(&Iri::new(artifact))
                .await?;
            print_json(&json!({ "connectors": connectors }))?;
        }
        Command::Resources {
            artifact,
            connector,
        } => {
            let resolver = BrokerResolver::from_args(&args);
            let resolved = find_connector(&resolver, &Iri::new(artifact), &Iri::new(connector)).await?;
            let resources = resolver
                .fetch_catalog_resources(&resolved, &resolved.catalogs)
                .await?;
            print_json(&json!({ "resources": resources }))?;
        }
        Command::Negotiate {
            artifact,
            connector,
            resource,
        } => {
            let resolver = BrokerResolver::from_args(&args);
            let resolved = find_connector(&resolver, &Iri::new(artifact), &Iri::new(connector)).await?;
            let resources = resolver
                .fetch_catalog_resources(&resolved, &resolved.catalogs)
                .await?;
            let resource_iri = Iri::new(resource);
            let selected = resources
                .iter()
                .find(|r| r.id == resource_iri)
                .ok_or_else(|| anyhow::anyhow!("resource {} not in connector catalogs", resource_iri))?;
            let target = selected
                .first_artifact()
                .ok_or_else(|| anyhow::anyhow!("resource {} has no artifact instance", resource_iri))?
                .clone();
            let form = negotiation::RuleForm::recommended(selected, &target);
            let body = negotiation::build_negotiation_body(Some(selected), Some(&target), &form)
                .ok_or_else(|| anyhow::anyhow!("resource {} has no contract offer to base a rule on", resource_iri))?;
            let receipt = resolver
                .submit_negotiation(&resolved, &resource_iri, &target, &body)
                .await?;
            print_json(&json!({ "receipt": receipt }))?;
        }
    }

    Ok(())
}

async fn find_connector(
    resolver: &BrokerResolver,
    artifact: &Iri,
    connector: &Iri,
) -> anyhow::Result<gangway::services::ResolvedConnector> {
    let connectors = resolver.resolve_connectors_for_artifact(artifact).await?;
    connectors
        .into_iter()
        .find(|c| &c.connector.id == connector)
        .ok_or_else(|| anyhow::anyhow!("connector {} does not advertise artifact {}", connector, artifact))
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
