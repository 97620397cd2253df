//! Render service client CLI.
//!
//! Provides the `renderq` binary for talking to the locally running service
//! agent: credential and credit checks, catalog/compatibility queries, and
//! project status polling. Compatibility queries go through the same
//! `renderq_core::Resolver` the library exposes, so answers match what
//! submitting code sees.
//!
//! Connection settings come from flags or the `RENDERQ_URL`,
//! `RENDERQ_EMAIL`, and `RENDERQ_ACCESS_KEY` environment variables.

use std::error::Error;
use std::process;

use clap::{Parser, Subcommand};

use renderq_client::{EnvoyClient, DEFAULT_API_BASE};

/// Render service client and compatibility query tools.
#[derive(Parser)]
#[command(name = "renderq", about = "Render service client and catalog tools")]
struct Cli {
    /// Base URL of the local service agent.
    #[arg(long, env = "RENDERQ_URL", default_value = DEFAULT_API_BASE)]
    url: String,

    /// Account email.
    #[arg(long, env = "RENDERQ_EMAIL")]
    email: String,

    /// Account access key.
    #[arg(long, env = "RENDERQ_ACCESS_KEY")]
    access_key: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate the configured credentials.
    Auth,

    /// Check that the account has credits available.
    Credits,

    /// Dump the full products catalog, grouped by type.
    Products,

    /// List the known versions of one product or plugin type.
    Versions {
        /// Item type, e.g. "hou" or "hou_redshift".
        item_type: String,
    },

    /// Find compatible combinations for one or more query items.
    Compat {
        /// Query items: "type:version" (full or partial) or bare "type".
        #[arg(required = true)]
        query: Vec<String>,

        /// Match versions by exact string equality instead of prefixes.
        #[arg(long)]
        strict: bool,

        /// Keep the queried types themselves in the result.
        #[arg(long)]
        include_query_types: bool,
    },

    /// Fetch the status of a submitted project.
    Status {
        /// Project name as returned by submission.
        name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let client = EnvoyClient::new(cli.email, cli.access_key)?.with_base_url(cli.url);

    match cli.command {
        Commands::Auth => {
            client.validate_auth().await?;
            println!("credentials accepted");
        }
        Commands::Credits => {
            client.validate_credits().await?;
            println!("credit balance ok");
        }
        Commands::Products => {
            let resolver = client.product_resolver().await?;
            print_json(&resolver.get_all_types())?;
        }
        Commands::Versions { item_type } => {
            let resolver = client.product_resolver().await?;
            print_json(&resolver.get_versions_by_type(&item_type))?;
        }
        Commands::Compat {
            query,
            strict,
            include_query_types,
        } => {
            let resolver = client.product_resolver().await?;
            let result = resolver.get_compatible_combinations(&query, strict, include_query_types)?;
            print_json(&result)?;
        }
        Commands::Status { name } => {
            let status = client.project_status(&name).await?;
            print_json(&status)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
