//! Common test utilities for client integration tests
//!
//! Starts the real API router over a fresh `MemoryStore` on an ephemeral
//! localhost port, so the client is exercised over actual HTTP including
//! the refresh cookie.

#![allow(dead_code)]

use std::sync::Arc;
use taskflow_api::app::{build_router, AppState};
use taskflow_api::config::Config;
use taskflow_client::api::{ApiClient, AuthSession};
use taskflow_client::config::ClientConfig;
use taskflow_shared::auth::password::HashParams;
use taskflow_shared::store::MemoryStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const TEST_SECRET: &str = "client-test-secret-at-least-32-bytes-long";

pub const PASSWORD: &str = "password123";

/// API server running in the background of the test runtime
pub struct TestServer {
    pub base_url: String,
    pub store: MemoryStore,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let store = MemoryStore::new();
        let state = AppState::with_hash_params(
            Arc::new(store.clone()),
            Config::for_memory(TEST_SECRET),
            HashParams::fast(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            store,
            handle,
        }
    }

    /// A fresh client with its own cookie jar and no token
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig::new(&self.base_url)).unwrap()
    }

    /// Signs up a new account on a fresh client
    pub async fn signed_up(&self, name: &str) -> (ApiClient, AuthSession) {
        let client = self.client();
        let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4());
        let session = client.signup(name, &email, PASSWORD).await.unwrap();
        (client, session)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
