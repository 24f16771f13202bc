//! Release service for release-server operations
//!
//! A fixed catalogue of typed endpoints plus a thin service wrapper that
//! carries the transport and bearer token. No business logic lives here beyond
//! exact parameter shaping.

use crate::api::{ApiError, Endpoint, Method, Transport};
use crate::models::{ClusterContext, Component, NamespaceList, Release, Revision, StorageBackend};
use serde::Serialize;
use serde::de::IgnoredAny;
use std::sync::Arc;

/// Scope shared by every release query: where the release lives
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReleaseScope {
    pub namespace: String,
    /// Cluster context; omitted from the wire when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub storage: StorageBackend,
}

impl ReleaseScope {
    pub fn new(namespace: impl Into<String>, context: Option<String>, storage: StorageBackend) -> Self {
        Self {
            namespace: namespace.into(),
            context,
            storage,
        }
    }
}

/// Query for `GET /releases`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListReleasesQuery {
    #[serde(flatten)]
    pub scope: ReleaseScope,
    pub limit: u32,
    pub skip: u32,
    pub by_date: bool,
    pub status_filter: Vec<String>,
}

/// Body for `POST /releases/{name}/rollback`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RollbackQuery {
    #[serde(flatten)]
    pub scope: ReleaseScope,
    pub revision: u64,
}

/// Body for `POST /releases/{name}/upgrade`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpgradeValuesQuery {
    #[serde(flatten)]
    pub scope: ReleaseScope,
    /// Raw values YAML
    pub values: String,
}

/// Query for `GET /k8s/namespaces`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NamespacesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Path parameters naming a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePath {
    pub name: String,
}

/// Path parameters naming one revision of a release (0 = latest)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPath {
    pub name: String,
    pub revision: u64,
}

/// Path parameters naming a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPath {
    pub id: u64,
}

/// Revision number the server resolves to the latest revision
pub const LATEST_REVISION: u64 = 0;

pub const LIST_RELEASES: Endpoint<ListReleasesQuery, (), Vec<Release>> =
    Endpoint::fixed(Method::Get, "/releases");

pub const GET_RELEASE: Endpoint<ReleaseScope, RevisionPath, Release> =
    Endpoint::templated(Method::Get, |p| format!("/releases/{}/{}", p.name, p.revision));

pub const GET_RELEASE_COMPONENTS: Endpoint<ReleaseScope, RevisionPath, Vec<Component>> =
    Endpoint::templated(Method::Get, |p| {
        format!("/releases/{}/{}/components", p.name, p.revision)
    });

pub const LIST_REVISION_HISTORY: Endpoint<ReleaseScope, ReleasePath, Vec<Revision>> =
    Endpoint::templated(Method::Get, |p| format!("/releases/{}/history", p.name));

pub const ROLLBACK: Endpoint<RollbackQuery, ReleasePath, IgnoredAny> =
    Endpoint::templated(Method::Post, |p| format!("/releases/{}/rollback", p.name));

pub const UPGRADE_VALUES: Endpoint<UpgradeValuesQuery, ReleasePath, IgnoredAny> =
    Endpoint::templated(Method::Post, |p| format!("/releases/{}/upgrade", p.name));

pub const LIST_NAMESPACES: Endpoint<NamespacesQuery, (), NamespaceList> =
    Endpoint::fixed(Method::Get, "/k8s/namespaces");

pub const USER_CONTEXTS: Endpoint<(), UserPath, Vec<ClusterContext>> =
    Endpoint::templated(Method::Get, |p| format!("/users/{}/contexts", p.id));

/// Service for release-server calls
#[derive(Clone)]
pub struct ReleaseService {
    transport: Arc<dyn Transport>,
    token: String,
}

impl ReleaseService {
    pub fn new(transport: Arc<dyn Transport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }

    /// List releases in a scope
    pub async fn list_releases(&self, query: &ListReleasesQuery) -> Result<Vec<Release>, ApiError> {
        LIST_RELEASES
            .call(self.transport.as_ref(), &self.token, query, &())
            .await
    }

    /// Fetch one release at a revision (use [`LATEST_REVISION`] for the deployed one)
    pub async fn get_release(
        &self,
        scope: &ReleaseScope,
        name: &str,
        revision: u64,
    ) -> Result<Release, ApiError> {
        let path = RevisionPath {
            name: name.to_string(),
            revision,
        };
        GET_RELEASE
            .call(self.transport.as_ref(), &self.token, scope, &path)
            .await
    }

    /// Fetch the rendered components of a release revision
    pub async fn get_release_components(
        &self,
        scope: &ReleaseScope,
        name: &str,
        revision: u64,
    ) -> Result<Vec<Component>, ApiError> {
        let path = RevisionPath {
            name: name.to_string(),
            revision,
        };
        GET_RELEASE_COMPONENTS
            .call(self.transport.as_ref(), &self.token, scope, &path)
            .await
    }

    /// List every revision of a release, in server order
    pub async fn list_revision_history(
        &self,
        scope: &ReleaseScope,
        name: &str,
    ) -> Result<Vec<Revision>, ApiError> {
        let path = ReleasePath {
            name: name.to_string(),
        };
        LIST_REVISION_HISTORY
            .call(self.transport.as_ref(), &self.token, scope, &path)
            .await
    }

    /// Roll a release back to `revision`; the server creates a new revision
    pub async fn rollback(
        &self,
        scope: &ReleaseScope,
        name: &str,
        revision: u64,
    ) -> Result<(), ApiError> {
        let query = RollbackQuery {
            scope: scope.clone(),
            revision,
        };
        let path = ReleasePath {
            name: name.to_string(),
        };
        ROLLBACK
            .call(self.transport.as_ref(), &self.token, &query, &path)
            .await
            .map(|_| ())
    }

    /// Upgrade a release with new values YAML
    pub async fn upgrade_values(
        &self,
        scope: &ReleaseScope,
        name: &str,
        values: &str,
    ) -> Result<(), ApiError> {
        let query = UpgradeValuesQuery {
            scope: scope.clone(),
            values: values.to_string(),
        };
        let path = ReleasePath {
            name: name.to_string(),
        };
        UPGRADE_VALUES
            .call(self.transport.as_ref(), &self.token, &query, &path)
            .await
            .map(|_| ())
    }

    /// List namespaces visible in a cluster context
    pub async fn list_namespaces(&self, context: Option<String>) -> Result<NamespaceList, ApiError> {
        LIST_NAMESPACES
            .call(
                self.transport.as_ref(),
                &self.token,
                &NamespacesQuery { context },
                &(),
            )
            .await
    }

    /// List the cluster contexts a user may query
    pub async fn list_contexts(&self, user_id: u64) -> Result<Vec<ClusterContext>, ApiError> {
        USER_CONTEXTS
            .call(
                self.transport.as_ref(),
                &self.token,
                &(),
                &UserPath { id: user_id },
            )
            .await
    }
}
