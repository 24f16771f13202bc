//! Rendered-manifest components and auxiliary cluster listings

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One managed resource from a release's rendered manifest.
///
/// Forwarded as-is to graph and list consumers; only the identifying fields
/// are typed, everything else (relations, raw YAML) stays in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: i64,
    #[serde(rename = "Kind", alias = "kind", default)]
    pub kind: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(
        rename = "Namespace",
        alias = "namespace",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub namespace: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// `Kind/name` label for list views
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }

    /// Number of outgoing relations of any type, if the payload carries them
    pub fn relation_count(&self) -> usize {
        self.extra
            .get("Relations")
            .and_then(Value::as_object)
            .map(|rels| {
                rels.values()
                    .filter_map(Value::as_array)
                    .map(Vec::len)
                    .sum()
            })
            .unwrap_or(0)
    }
}

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
}

/// Cluster context a user may scope queries to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterContext {
    pub name: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    /// Whether the context is the kubeconfig's current one
    #[serde(default)]
    pub selected: bool,
}

/// Namespace listing as returned by the cluster
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NamespaceList {
    #[serde(default)]
    pub items: Vec<Namespace>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Namespace {
    pub metadata: NamespaceMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamespaceMeta {
    pub name: String,
}

impl NamespaceList {
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|ns| ns.metadata.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_component_keeps_unknown_fields() {
        let component: Component = serde_json::from_value(json!({
            "ID": 4,
            "Kind": "Deployment",
            "Name": "web",
            "RawYAML": {"spec": {"replicas": 2}},
            "Relations": {
                "ControlRels": [{"Source": 4, "Target": 7}, {"Source": 4, "Target": 8}],
                "LabelRels": [{"Source": 4, "Target": 2}]
            }
        }))
        .unwrap();

        assert_eq!(component.id, 4);
        assert_eq!(component.label(), "Deployment/web");
        assert_eq!(component.relation_count(), 3);
        assert!(component.extra.contains_key("RawYAML"));
    }

    #[test]
    fn test_component_lowercase_keys() {
        let component: Component =
            serde_json::from_value(json!({"kind": "Service", "name": "web"})).unwrap();
        assert_eq!(component.label(), "Service/web");
        assert_eq!(component.relation_count(), 0);
    }

    #[test]
    fn test_namespace_names() {
        let list: NamespaceList = serde_json::from_value(json!({
            "items": [{"metadata": {"name": "default"}}, {"metadata": {"name": "kube-system"}}]
        }))
        .unwrap();
        assert_eq!(list.names(), vec!["default", "kube-system"]);
    }
}
