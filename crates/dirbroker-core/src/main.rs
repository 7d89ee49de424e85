//! dirbroker operator binary
//!
//! `run` provisions and binds one instance against an in-memory store;
//! `resolve` shows how a location maps to a store key.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dirbroker_core::prelude::*;
use dirbroker_core::telemetry;
use std::path::PathBuf;

/// Operator tool for directory broker plans
#[derive(Debug, Parser)]
#[command(name = "dirbroker", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Provision an instance, bind it, and print the credentials
    Run {
        /// Service instance UUID
        #[arg(long)]
        instance: String,

        /// Organization UUID
        #[arg(long)]
        org: String,

        /// Directory location to attach
        #[arg(long)]
        uri: String,

        /// Credential field pre-stored for the location, as KEY=VALUE
        #[arg(long = "stored", value_parser = parse_key_val)]
        stored: Vec<(String, String)>,
    },

    /// Show how a location resolves
    Resolve {
        location: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BrokerConfig::load(path)?,
        None => BrokerConfig::default(),
    };
    telemetry::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Run {
            instance,
            org,
            uri,
            stored,
        } => run(&config, ServiceInstance::new(instance, org), uri, stored).await,
        Commands::Resolve { location } => {
            let path = InstancePath::resolve(&location)?;
            println!("canonical:  {path}");
            println!("key:        {}", path.instance_key());
            println!("key source: {}", path.key_source());
            if let Some(org) = path.org_id() {
                println!("org:        {org}");
            }
            Ok(())
        }
    }
}

async fn run(
    config: &BrokerConfig,
    instance: ServiceInstance,
    uri: String,
    stored: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let store = Arc::new(InMemoryCredentialStore::new());
    if !stored.is_empty() {
        let key = InstancePath::resolve(&uri)?.instance_key();
        let seeded: CredentialMap = stored.into_iter().collect();
        store.save(seeded, &key).await?;
    }

    let provider = StaticBindingProvider::from_config(&config.binding)?;
    let registry = PlanRegistry::with_defaults(Arc::new(provider), store);

    let mut params = ProvisionParameters::new();
    params.insert(URI_KEY.to_string(), uri.into());

    registry
        .provision(&config.plan_name, &instance, Some(&params))
        .await
        .context("provision failed")?;
    let credentials = registry
        .bind(&config.plan_name, &instance)
        .await
        .context("bind failed")?;

    println!("{}", serde_json::to_string_pretty(&credentials)?);
    Ok(())
}
