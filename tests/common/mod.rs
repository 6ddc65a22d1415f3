//! Shared fixtures: a scripted transport that records every request

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mlflow_rest_client::entity::EnumPolicy;
use mlflow_rest_client::transport::{ApiRequest, ApiResponse, Transport};
use mlflow_rest_client::{ClientConfig, Result, TrackingClient};
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://mlflow.test";

/// Install a test-writer subscriber once; `RUST_LOG=debug` shows traffic.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<ApiResponse>,
    requests: Vec<ApiRequest>,
}

/// Replays queued responses in order and records what was sent.
///
/// Clones share the script, so a test keeps a handle after giving one to
/// the client. An exhausted script answers 599.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn reply(&self, status: u16, body: Value) -> &Self {
        self.script.lock().unwrap().replies.push_back(ApiResponse::new(status, body));
        self
    }

    /// Queue a 200 reply.
    pub fn ok(&self, body: Value) -> &Self {
        self.reply(200, body)
    }

    /// Queue a server error reply.
    pub fn error(&self, status: u16, code: &str, message: &str) -> &Self {
        self.reply(status, json!({"error_code": code, "message": message}))
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    /// Most recent request.
    pub fn last(&self) -> ApiRequest {
        self.requests().pop().expect("no request sent")
    }

    /// Client over this transport with default settings.
    pub fn client(&self) -> TrackingClient {
        self.client_with(ClientConfig::new(BASE_URL).unwrap())
    }

    /// Client over this transport with the lenient enum policy.
    pub fn lenient_client(&self) -> TrackingClient {
        let config = ClientConfig::builder(BASE_URL)
            .enum_policy(EnumPolicy::Lenient)
            .build()
            .unwrap();
        self.client_with(config)
    }

    pub fn client_with(&self, config: ClientConfig) -> TrackingClient {
        init_tracing();
        TrackingClient::with_transport(config, self.clone())
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request.clone());
        Ok(script
            .replies
            .pop_front()
            .unwrap_or_else(|| ApiResponse::new(599, json!({"error_code": "SCRIPT_EXHAUSTED", "message": "no reply queued"}))))
    }
}

// ============================================================================
// Payload builders
// ============================================================================

pub fn experiment_json(id: &str, name: &str) -> Value {
    json!({
        "experiment_id": id,
        "name": name,
        "artifact_location": format!("mlflow-artifacts:/{id}"),
        "lifecycle_stage": "active",
        "creation_time": 1_700_000_000_000_i64,
        "last_update_time": 1_700_000_000_000_i64
    })
}

pub const RUN_ID: &str = "0f8b5bd6a3d94a41a1f5a2c6c7a8e9d1";

pub fn run_json(run_id: &str, experiment_id: &str, status: &str) -> Value {
    json!({
        "info": {
            "run_id": run_id,
            "run_uuid": run_id,
            "experiment_id": experiment_id,
            "user_id": "ana",
            "status": status,
            "start_time": 1_700_000_000_000_i64,
            "artifact_uri": format!("mlflow-artifacts:/{experiment_id}/{run_id}/artifacts"),
            "lifecycle_stage": "active"
        },
        "data": {}
    })
}

pub fn model_version_json(name: &str, version: u64, stage: &str) -> Value {
    json!({
        "name": name,
        "version": version.to_string(),
        "creation_timestamp": 1_700_000_000_000_i64 + i64::try_from(version).unwrap(),
        "current_stage": stage,
        "source": format!("mlflow-artifacts:/1/{RUN_ID}/artifacts/model"),
        "run_id": RUN_ID,
        "status": "READY"
    })
}

pub fn model_json(name: &str) -> Value {
    json!({
        "name": name,
        "creation_timestamp": 1_700_000_000_000_i64,
        "last_updated_timestamp": 1_700_000_000_000_i64
    })
}
