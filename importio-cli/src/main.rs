//! Example program: log in, run two queries, wait for both, print the results.

mod cli;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use importio_rs_client::{DataPayload, ImportIoClient, Query, QueryMessage, QueryRunner};
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Connector of the "Integrate Page Example" tile.
const EXAMPLE_CONNECTOR: Uuid = Uuid::from_u128(0xcaff10dc_3bf8_402e_b1b8_c799a77c3e8c);

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit here, before any network activity
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> importio_rs_client::Result<()> {
    let client = ImportIoClient::connect(cli.credential()).await?;

    let runner = QueryRunner::new();
    let queries = example_queries();
    info!(queries = queries.len(), "submitting");
    let report = runner
        .execute_with(client, queries, cli.timeout(), |_, message, _| {
            if let Err(e) = print_message(message) {
                warn!(error = %e, "failed to write message to stdout");
            }
        })
        .await?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "All data received:")?;
    writeln!(out, "{}", Value::Array(report.results))?;
    out.flush()?;
    Ok(())
}

fn example_queries() -> Vec<Query> {
    ["avengers", "avengers 2"]
        .into_iter()
        .map(|term| {
            Query::new()
                .connector(EXAMPLE_CONNECTOR)
                .input("searchterm", term)
        })
        .collect()
}

fn print_message(message: &QueryMessage) -> std::io::Result<()> {
    let heading = match message {
        QueryMessage::Data(DataPayload::Results(_)) => "Got data!",
        QueryMessage::Data(DataPayload::ServiceError { .. }) => "Got an error!",
        QueryMessage::Status { .. } => return Ok(()),
    };
    let mut out = std::io::stdout().lock();
    writeln!(out, "{heading}")?;
    writeln!(out, "{message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_queries_target_the_example_connector() {
        let queries = example_queries();
        assert_eq!(queries.len(), 2);
        for q in &queries {
            assert_eq!(
                q.connector_guids(),
                &[Uuid::parse_str("caff10dc-3bf8-402e-b1b8-c799a77c3e8c").unwrap()]
            );
        }
        assert_eq!(queries[0].inputs()["searchterm"], "avengers");
        assert_eq!(queries[1].inputs()["searchterm"], "avengers 2");
    }
}
