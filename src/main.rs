use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use influx_canary_query::config::QueryCatalog;
use influx_canary_query::{CanaryScope, QueryBuilder};

/// Render InfluxQL queries for the canary metrics in a catalog file.
#[derive(Debug, Parser)]
#[command(name = "influx-query", version)]
struct Cli {
    /// Metric catalog (TOML)
    #[arg(long, env = "INFLUX_QUERY_CONFIG", default_value = "influx-query.toml")]
    config: PathBuf,

    /// Render only this metric; every metric is rendered when omitted
    #[arg(long)]
    metric: Option<String>,

    /// Window start (RFC 3339, inclusive)
    #[arg(long)]
    start: DateTime<Utc>,

    /// Window end (RFC 3339, exclusive)
    #[arg(long)]
    end: DateTime<Utc>,

    /// Scope filter as name:value; defaults to the catalog's scope
    #[arg(long)]
    scope: Option<String>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("influx_canary_query=info")),
        )
        .init();

    let cli = Cli::parse();
    let catalog = QueryCatalog::load(&cli.config)?;

    let mut scope = CanaryScope::new(cli.start, cli.end);
    scope.scope = cli
        .scope
        .or_else(|| catalog.default_scope().map(str::to_string));

    match cli.metric {
        Some(name) => {
            let metric = catalog
                .metric(&name)
                .with_context(|| format!("metric {name} not found in {}", cli.config.display()))?;
            let query = QueryBuilder::new().build(&metric.query, Some(&scope))?;
            println!("{query}");
        }
        None => {
            let mut failed = 0usize;
            for (name, result) in catalog.build_all(&scope) {
                match result {
                    Ok(query) => println!("{name}\t{query}"),
                    Err(e) => {
                        tracing::error!("failed to build query for {name}: {e}");
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} metric queries could not be built");
            }
        }
    }

    Ok(())
}
