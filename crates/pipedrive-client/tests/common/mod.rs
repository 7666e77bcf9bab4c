/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for pipedrive-client tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pipedrive_client::{ClientConfig, PipedriveClient, Sleeper};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-api-token";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pipedrive_client=debug")
        .with_test_writer()
        .try_init();
    MockServer::start().await
}

/// Records requested backoffs instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Client pointed at the mock server, with backoffs recorded rather than slept
pub fn mock_client(server: &MockServer) -> (PipedriveClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = PipedriveClient::with_config(ClientConfig::new(server.uri(), TEST_TOKEN))
        .expect("client init")
        .with_sleeper(sleeper.clone());
    (client, sleeper)
}
