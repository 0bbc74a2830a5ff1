//! Command-line arguments for the example program.

use std::time::Duration;

use clap::Parser;
use importio_rs_protocol::Credential;
use importio_rs_protocol::credential::DEFAULT_HOST;
use uuid::Uuid;

/// Run the two example queries against import.io and print what comes back.
#[derive(Parser, Debug)]
#[command(name = "importio-example")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// User GUID of the account
    #[arg(value_name = "GUID")]
    pub user_guid: Uuid,

    /// API key of the account
    #[arg(value_name = "API_KEY")]
    pub api_key: String,

    /// Service endpoint, `host` or `host:port`
    #[arg(long, env = "IMPORTIO_ENDPOINT", default_value = DEFAULT_HOST)]
    pub endpoint: String,

    /// Give up waiting for results after this many seconds (default: wait indefinitely)
    #[arg(long, env = "IMPORTIO_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    pub fn credential(&self) -> Credential {
        Credential::with_host(self.user_guid, self.api_key.clone(), self.endpoint.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
