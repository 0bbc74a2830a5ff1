//! Integration tests that talk to a live query service.
//!
//! These tests are gated by environment variables:
//! - `IMPORTIO_TEST_ENDPOINT`: `host:port` of a session endpoint
//! - `IMPORTIO_TEST_USER_GUID`: user GUID to log in with
//! - `IMPORTIO_TEST_API_KEY`: API key for that user

use std::time::Duration;

use importio_rs_client::{
    ClientConfig, ClientError, ClientState, Credential, ImportIoClient, Query, QueryRunner,
};
use uuid::Uuid;

const EXAMPLE_CONNECTOR: &str = "caff10dc-3bf8-402e-b1b8-c799a77c3e8c";

fn live_credential() -> Option<Credential> {
    let endpoint = std::env::var("IMPORTIO_TEST_ENDPOINT").ok()?;
    let user = std::env::var("IMPORTIO_TEST_USER_GUID").ok()?;
    let key = std::env::var("IMPORTIO_TEST_API_KEY").ok()?;
    let user = Uuid::parse_str(&user).expect("IMPORTIO_TEST_USER_GUID is not a GUID");
    Some(Credential::with_host(user, key, endpoint))
}

fn config() -> ClientConfig {
    ClientConfig {
        connect_timeout: Duration::from_secs(15),
        read_timeout: Duration::from_secs(30),
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn live_login() {
    let Some(credential) = live_credential() else {
        eprintln!("skipping: IMPORTIO_TEST_* not set");
        return;
    };

    let client = ImportIoClient::connect_with_config(credential, config())
        .await
        .unwrap();
    assert_eq!(client.state(), ClientState::Connected);
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn live_wrong_key_rejected() {
    let Some(credential) = live_credential() else {
        eprintln!("skipping: IMPORTIO_TEST_* not set");
        return;
    };
    let wrong = Credential::with_host(credential.user_guid(), "not-a-key", credential.host());

    let err = ImportIoClient::connect_with_config(wrong, config())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::Authentication(_)));
}

#[tokio::test]
async fn live_two_queries() {
    let Some(credential) = live_credential() else {
        eprintln!("skipping: IMPORTIO_TEST_* not set");
        return;
    };

    let client = ImportIoClient::connect_with_config(credential, config())
        .await
        .unwrap();
    let connector = Uuid::parse_str(EXAMPLE_CONNECTOR).unwrap();
    let queries = vec![
        Query::new()
            .connector(connector)
            .input("searchterm", "avengers"),
        Query::new()
            .connector(connector)
            .input("searchterm", "avengers 2"),
    ];

    let runner = QueryRunner::new();
    let report = runner
        .execute(client, queries, Some(Duration::from_secs(120)))
        .await
        .unwrap();

    eprintln!(
        "results: {}, service errors: {}",
        report.results.len(),
        report.service_errors.len()
    );
    assert_eq!(report.completed, 2);
}
