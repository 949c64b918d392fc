use crate::models::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Api(#[from] kube::Error),
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// A per-kind refresh failure. Non-fatal: the kind keeps an empty collection.
#[derive(Debug, Error)]
#[error("failed to list {kind}: {source}")]
pub struct FetchError {
    pub kind: ResourceKind,
    #[source]
    pub source: GatewayError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for MutationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Create/update/delete failure, shown to the user as a timed banner.
#[derive(Debug, Error)]
#[error("failed to {op} {} '{name}': {source}", .kind.singular())]
pub struct MutationError {
    pub op: MutationOp,
    pub kind: ResourceKind,
    pub name: String,
    #[source]
    pub source: GatewayError,
}

/// Anything that stops the dashboard before the event loop starts.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown resource kind '{0}' in refresh.kinds")]
    UnknownKind(String),
    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
    #[error("failed to build cluster client: {0}")]
    Client(#[from] kube::Error),
    #[error("cluster is not reachable: {0}")]
    Unreachable(#[source] GatewayError),
}
