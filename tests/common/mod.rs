//! In-memory release server shared by the integration tests
//!
//! Implements [`Transport`] directly, so the endpoint catalogue, services and
//! history controller run unmodified against it. Every request is recorded.
//! A rollback to version `v` appends a new revision `max + 1` with the content
//! of `v`, the way the real server does.

#![allow(dead_code)]

use async_trait::async_trait;
use chartdeck::api::{ApiError, ApiRequest, ApiResponse, Method, Transport};
use chartdeck::models::{Release, ReleaseStatus};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct ServerState {
    /// Every revision of every release, in the order the server reports them
    revisions: Vec<Release>,
    calls: Vec<ApiRequest>,
    rollback_failure: Option<ApiResponse>,
    offline: bool,
}

#[derive(Default)]
pub struct MockReleaseServer {
    state: Mutex<ServerState>,
}

impl MockReleaseServer {
    pub fn with_revisions(revisions: Vec<Release>) -> Arc<Self> {
        let server = Self::default();
        server.lock().revisions = revisions;
        Arc::new(server)
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }

    /// Answer every rollback with this status and body
    pub fn fail_rollbacks_with(&self, status: u16, body: &str) {
        self.lock().rollback_failure = Some(ApiResponse::new(status, body));
    }

    /// Fail every request before it reaches the server
    pub fn go_offline(&self) {
        self.lock().offline = true;
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Number of recorded calls with this method whose path ends with `suffix`
    pub fn count(&self, method: Method, suffix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path.ends_with(suffix))
            .count()
    }

    pub fn max_version(&self, name: &str) -> u64 {
        self.lock()
            .revisions
            .iter()
            .filter(|r| r.name == name)
            .map(|r| r.version)
            .max()
            .unwrap_or(0)
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.lock();
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        let namespace = request.param("namespace");
        let ns = namespace.as_deref();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["releases"]) => {
                let mut latest: Vec<Release> = Vec::new();
                for r in state
                    .revisions
                    .iter()
                    .filter(|r| ns.is_none_or(|ns| ns == r.namespace))
                {
                    match latest.iter_mut().find(|l| l.name == r.name) {
                        Some(l) if l.version < r.version => *l = r.clone(),
                        Some(_) => {}
                        None => latest.push(r.clone()),
                    }
                }
                ok_json(&latest)
            }
            (Method::Get, ["releases", name, "history"]) => {
                let history: Vec<&Release> = state
                    .revisions
                    .iter()
                    .filter(|&r| in_scope(r, name, ns))
                    .collect();
                if history.is_empty() {
                    return not_found(&format!("release: not found: {}", name));
                }
                ok_json(&history)
            }
            (Method::Get, ["releases", name, revision, "components"]) => {
                match find_revision(&state.revisions, revision, |r| in_scope(r, name, ns)) {
                    Some(r) => ok_json(&json!([
                        {
                            "ID": 1,
                            "Kind": "Deployment",
                            "Name": r.name,
                            "Namespace": r.namespace,
                            "Relations": {"uses": [2]}
                        },
                        {"ID": 2, "Kind": "ConfigMap", "Name": format!("{}-config", r.name), "Namespace": r.namespace}
                    ])),
                    None => not_found(&format!("release: not found: {}", name)),
                }
            }
            (Method::Get, ["releases", name, revision]) => {
                match find_revision(&state.revisions, revision, |r| in_scope(r, name, ns)) {
                    Some(r) => ok_json(r),
                    None => not_found(&format!("release: not found: {}", name)),
                }
            }
            (Method::Post, ["releases", name, "rollback"]) => {
                if let Some(failure) = state.rollback_failure.clone() {
                    return failure;
                }
                let Some(target) = request.param("revision").and_then(|v| v.parse::<u64>().ok())
                else {
                    return ApiResponse::new(400, r#"{"errors":["revision is required"]}"#);
                };
                let Some(source) = state
                    .revisions
                    .iter()
                    .find(|&r| in_scope(r, name, ns) && r.version == target)
                    .cloned()
                else {
                    return not_found(&format!("revision {} not found", target));
                };

                let next = state
                    .revisions
                    .iter()
                    .filter(|&r| in_scope(r, name, ns))
                    .map(|r| r.version)
                    .max()
                    .unwrap_or(0)
                    + 1;
                for r in state.revisions.iter_mut() {
                    if in_scope(r, name, ns) && r.info.status == ReleaseStatus::Deployed {
                        r.info.status = ReleaseStatus::Superseded;
                    }
                }
                let mut created = source;
                created.version = next;
                created.info.status = ReleaseStatus::Deployed;
                created.info.description = format!("Rollback to {}", target);
                state.revisions.push(created);
                ApiResponse::new(200, "")
            }
            (Method::Post, ["releases", name, "upgrade"]) => {
                let Some(latest) =
                    find_revision(&state.revisions, "0", |r| in_scope(r, name, ns)).cloned()
                else {
                    return not_found(&format!("release: not found: {}", name));
                };
                let mut created = latest;
                created.version += 1;
                created.info.status = ReleaseStatus::Deployed;
                created.info.description = "Upgrade complete".to_string();
                created.config = request
                    .param("values")
                    .and_then(|v| serde_yaml::from_str(&v).ok());
                state.revisions.push(created);
                ApiResponse::new(200, "{}")
            }
            (Method::Get, ["k8s", "namespaces"]) => ok_json(&json!({
                "items": [
                    {"metadata": {"name": "default"}},
                    {"metadata": {"name": "payments"}}
                ]
            })),
            (Method::Get, ["users", "7", "contexts"]) => ok_json(&json!([
                {"name": "prod", "cluster": "prod-cluster", "server": "https://prod.example:6443"},
                {
                    "name": "staging",
                    "cluster": "staging-cluster",
                    "server": "https://staging.example:6443",
                    "selected": true
                }
            ])),
            (Method::Get, ["users", id, "contexts"]) => {
                ApiResponse::new(403, json!({ "errors": [format!("user {} is not signed in", id)] }).to_string())
            }
            _ => not_found(&format!("no route for {} {}", request.method, request.path)),
        }
    }
}

#[async_trait]
impl Transport for MockReleaseServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.lock().calls.push(request.clone());
        if self.lock().offline {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(self.handle(&request))
    }
}

fn in_scope(release: &Release, name: &str, namespace: Option<&str>) -> bool {
    release.name == name && namespace.is_none_or(|ns| ns == release.namespace)
}

/// `0` is the latest version; anything else must match exactly
fn find_revision<'a>(
    revisions: &'a [Release],
    revision: &str,
    matches: impl Fn(&Release) -> bool,
) -> Option<&'a Release> {
    let wanted: u64 = revision.parse().ok()?;
    if wanted == 0 {
        revisions
            .iter()
            .filter(|&r| matches(r))
            .max_by_key(|r| r.version)
    } else {
        revisions.iter().find(|&r| matches(r) && r.version == wanted)
    }
}

fn ok_json<T: serde::Serialize + ?Sized>(value: &T) -> ApiResponse {
    ApiResponse::new(200, serde_json::to_string(value).unwrap())
}

fn not_found(message: &str) -> ApiResponse {
    ApiResponse::new(404, json!({ "errors": [message] }).to_string())
}

/// A revision of `name` in the `default` namespace
pub fn revision(name: &str, version: u64, status: &str, last_deployed: &str) -> Release {
    serde_json::from_value(json!({
        "name": name,
        "namespace": "default",
        "version": version,
        "info": {
            "status": status,
            "last_deployed": last_deployed,
            "description": format!("Revision {}", version)
        },
        "chart": {"metadata": {"name": name, "version": format!("1.{}.0", version)}},
        "config": {"replicas": version}
    }))
    .unwrap()
}

/// History of `web` as the server reports it: out of order, deployed = 3
pub fn web_history() -> Vec<Release> {
    vec![
        revision("web", 1, "superseded", "2024-03-01T10:00:00Z"),
        revision("web", 3, "deployed", "2024-03-05T14:07:00Z"),
        revision("web", 2, "superseded", "2024-03-04T09:15:00Z"),
    ]
}
