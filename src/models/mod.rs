//! Data model for releases, revisions and their components

mod component;
mod release;

pub use component::{ClusterContext, Component, Namespace, NamespaceList, NamespaceMeta, User};
pub use release::{
    Chart, ChartMetadata, Release, ReleaseIdentity, ReleaseInfo, ReleaseStatus, Revision,
    StatusTone, StorageBackend, readable_date, readable_date_in,
};
