//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gitlab_api::clients::{
    HttpTransport, TransportError, TransportRequest, TransportResponse,
};
use gitlab_api::rest::{
    Capability, CapabilitySet, ChildManager, RequiredOptional, ResourceDefinition, UpdatePolicy,
};
use gitlab_api::{AuthToken, GitlabConfig, GitlabConfigBuilder, RestClient, ServerUrl};
use serde_json::{Map, Value};
use wiremock::MockServer;

// ============================================================================
// Resource declarations
// ============================================================================

pub static NOTES: ResourceDefinition =
    ResourceDefinition::new("note", "projects/{project_id}/issues/{issue_iid}/notes")
        .capabilities(CapabilitySet::CRUD)
        .from_parent_attrs(&[("project_id", "project_id"), ("issue_iid", "iid")])
        .create_attrs(RequiredOptional::new(&["body"], &[]));

pub static ISSUE_CHILDREN: [ChildManager; 1] = [ChildManager::new("notes", &NOTES)];

pub static ISSUES: ResourceDefinition =
    ResourceDefinition::new("issue", "projects/{project_id}/issues")
        .capabilities(CapabilitySet::CRUD)
        .id_attr("iid")
        .from_parent_attrs(&[("project_id", "id")])
        .create_attrs(RequiredOptional::new(&["title"], &["description", "labels"]))
        .update_attrs(RequiredOptional::new(&[], &["title", "description", "state_event"]))
        .children(&ISSUE_CHILDREN);

pub static PROJECT_CHILDREN: [ChildManager; 1] = [ChildManager::new("issues", &ISSUES)];

pub static PROJECTS: ResourceDefinition = ResourceDefinition::new("project", "projects")
    .capabilities(CapabilitySet::CRUD)
    .create_attrs(RequiredOptional::new(&["name"], &["path", "description"]))
    .update_attrs(RequiredOptional::new(&[], &["name", "value", "description"]))
    .children(&PROJECT_CHILDREN);

pub static EVENTS: ResourceDefinition = ResourceDefinition::new("event", "events")
    .capabilities(CapabilitySet::NONE.with(Capability::List));

pub static SETTINGS: ResourceDefinition =
    ResourceDefinition::new("settings", "application/settings")
        .without_id()
        .capabilities(
            CapabilitySet::NONE
                .with(Capability::GetWithoutId)
                .with(Capability::Update)
                .with(Capability::Refresh),
        )
        .update_attrs(RequiredOptional::new(&[], &["signup_enabled", "home_page_url"]))
        .update_policy(UpdatePolicy::Full);

pub static VARIABLES: ResourceDefinition = ResourceDefinition::new("variable", "variables")
    .capabilities(CapabilitySet::CRUD)
    .id_attr("key")
    .create_attrs(RequiredOptional::new(&["key", "value"], &["protected"]))
    .update_attrs(RequiredOptional::new(&["key", "value"], &["protected"]))
    .update_policy(UpdatePolicy::ChangedWithRequired);

// ============================================================================
// Clients
// ============================================================================

/// A configuration builder pointing at `uri` with millisecond backoff.
pub fn config_builder(uri: &str) -> GitlabConfigBuilder {
    GitlabConfig::builder()
        .url(ServerUrl::new(uri).unwrap())
        .auth(AuthToken::private("glpat-test-token").unwrap())
        .base_backoff(Duration::from_millis(1))
        .max_backoff(Duration::from_millis(5))
}

/// A client for `server` with the default retry budget.
pub fn client_for(server: &MockServer) -> RestClient {
    RestClient::new(config_builder(&server.uri()).build().unwrap()).unwrap()
}

/// Number of requests `server` has received so far.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

/// Converts a `json!` object literal into attribute data.
pub fn attrs(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// Builds `count` objects with sequential ids starting at `first`.
pub fn items(first: u64, count: u64) -> Value {
    Value::Array(
        (first..first + count)
            .map(|id| serde_json::json!({"id": id, "name": format!("project-{id}")}))
            .collect(),
    )
}

// ============================================================================
// Scripted transport
// ============================================================================

/// A transport that replays a fixed list of outcomes and records requests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(500, "script exhausted")))
    }
}

/// A client that sends through `transport` instead of the network.
pub fn scripted_client(transport: Arc<ScriptedTransport>, max_attempts: u32) -> RestClient {
    let config = config_builder("https://gitlab.example.com")
        .max_attempts(max_attempts)
        .build()
        .unwrap();
    RestClient::with_transport(config, transport)
}
