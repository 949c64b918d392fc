use crate::errors::MutationError;
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{ConfigMap, Namespace, Pod, Service},
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Input mode of the foreground loop. View modes (details, YAML, ...) live in
/// [`crate::view::ViewMode`]; these are the overlays that capture keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    List,
    FilterInput,
    NamespaceSelect,
    CreateInput,
    ScaleInput,
    Confirm,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Pod,
    Deployment,
    Service,
    ConfigMap,
    Namespace,
}

impl ResourceKind {
    /// Kinds fetched on every refresh unless the config says otherwise.
    pub const DEFAULT_REFRESH: [Self; 4] =
        [Self::Pod, Self::Deployment, Self::Service, Self::ConfigMap];

    pub fn title(self) -> &'static str {
        match self {
            Self::Pod => "Pods",
            Self::Deployment => "Deployments",
            Self::Service => "Services",
            Self::ConfigMap => "ConfigMaps",
            Self::Namespace => "Namespaces",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Deployment => "deployment",
            Self::Service => "service",
            Self::ConfigMap => "configmap",
            Self::Namespace => "namespace",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "po" | "pod" | "pods" => Some(Self::Pod),
            "deploy" | "deployment" | "deployments" => Some(Self::Deployment),
            "svc" | "service" | "services" => Some(Self::Service),
            "cm" | "configmap" | "configmaps" | "config-map" | "config-maps" => {
                Some(Self::ConfigMap)
            }
            "ns" | "namespace" | "namespaces" => Some(Self::Namespace),
            _ => None,
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Pod => &["Name", "Status", "Ready", "Restarts", "Age", "Node"],
            Self::Deployment => &["Name", "Ready", "Up-to-date", "Available", "Age"],
            Self::Service => &["Name", "Type", "Cluster-IP", "External-IP", "Ports"],
            Self::ConfigMap => &["Name", "Data", "Age"],
            Self::Namespace => &["Name", "Status", "Age"],
        }
    }

    pub fn is_namespaced(self) -> bool {
        !matches!(self, Self::Namespace)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Clone, Debug)]
pub enum Resource {
    Pod(Arc<Pod>),
    Deployment(Arc<Deployment>),
    Service(Arc<Service>),
    ConfigMap(Arc<ConfigMap>),
    Namespace(Arc<Namespace>),
}

impl Resource {
    fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::Pod(p) => &p.metadata,
            Resource::Deployment(d) => &d.metadata,
            Resource::Service(s) => &s.metadata,
            Resource::ConfigMap(c) => &c.metadata,
            Resource::Namespace(n) => &n.metadata,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Pod(_) => ResourceKind::Pod,
            Resource::Deployment(_) => ResourceKind::Deployment,
            Resource::Service(_) => ResourceKind::Service,
            Resource::ConfigMap(_) => ResourceKind::ConfigMap,
            Resource::Namespace(_) => ResourceKind::Namespace,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }

    pub fn creation_timestamp(&self) -> Option<&Time> {
        self.metadata().creation_timestamp.as_ref()
    }

    pub fn age(&self) -> String {
        crate::utils::get_resource_age(self.creation_timestamp())
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata().labels.as_ref()
    }

    pub fn owner_references(&self) -> &[OwnerReference] {
        self.metadata().owner_references.as_deref().unwrap_or_default()
    }

    /// Display projections, one per entry of [`ResourceKind::headers`].
    pub fn columns(&self) -> Vec<String> {
        match self {
            Resource::Pod(p) => vec![
                self.name().to_owned(),
                pod_phase(p).to_owned(),
                pod_ready(p),
                pod_restarts(p).to_string(),
                self.age(),
                p.spec
                    .as_ref()
                    .and_then(|s| s.node_name.clone())
                    .unwrap_or_default(),
            ],
            Resource::Deployment(d) => {
                let status = d.status.as_ref();
                let replicas = status.map_or(0, |s| s.replicas.unwrap_or(0));
                let ready = status.map_or(0, |s| s.ready_replicas.unwrap_or(0));
                let updated = status.map_or(0, |s| s.updated_replicas.unwrap_or(0));
                let available = status.map_or(0, |s| s.available_replicas.unwrap_or(0));
                vec![
                    self.name().to_owned(),
                    format!("{ready}/{replicas}"),
                    updated.to_string(),
                    available.to_string(),
                    self.age(),
                ]
            }
            Resource::Service(s) => {
                let spec = s.spec.as_ref();
                vec![
                    self.name().to_owned(),
                    spec.and_then(|sp| sp.type_.clone())
                        .unwrap_or_else(|| "ClusterIP".to_string()),
                    spec.and_then(|sp| sp.cluster_ip.clone())
                        .unwrap_or_else(|| "<none>".to_string()),
                    service_external_ip(s),
                    service_ports(s),
                ]
            }
            Resource::ConfigMap(c) => {
                let entries = c.data.as_ref().map_or(0, BTreeMap::len)
                    + c.binary_data.as_ref().map_or(0, BTreeMap::len);
                vec![self.name().to_owned(), entries.to_string(), self.age()]
            }
            Resource::Namespace(n) => vec![
                self.name().to_owned(),
                n.status
                    .as_ref()
                    .and_then(|s| s.phase.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                self.age(),
            ],
        }
    }

    pub fn details(&self) -> Vec<String> {
        let mut lines = vec![format!("Name: {}", self.name())];
        if self.kind().is_namespaced() {
            lines.push(format!("Namespace: {}", self.namespace()));
        }
        match self {
            Resource::Pod(p) => {
                let spec = p.spec.as_ref();
                lines.push(format!("Status: {}", pod_phase(p)));
                lines.push(format!(
                    "Node: {}",
                    spec.and_then(|s| s.node_name.as_deref()).unwrap_or("<none>")
                ));
                lines.push(format!(
                    "IP: {}",
                    p.status
                        .as_ref()
                        .and_then(|s| s.pod_ip.as_deref())
                        .unwrap_or("<none>")
                ));
                lines.push(format!("Created: {}", created(self)));
                lines.push(String::new());
                lines.push("Containers:".to_string());
                for c in spec.map(|s| s.containers.as_slice()).unwrap_or_default() {
                    lines.push(format!(
                        "  - {} ({})",
                        c.name,
                        c.image.as_deref().unwrap_or("<none>")
                    ));
                }
            }
            Resource::Deployment(d) => {
                let status = d.status.as_ref();
                lines.push(format!(
                    "Replicas: {}",
                    status.and_then(|s| s.replicas).unwrap_or(0)
                ));
                lines.push(format!(
                    "Ready: {}",
                    status.and_then(|s| s.ready_replicas).unwrap_or(0)
                ));
                lines.push(format!(
                    "Available: {}",
                    status.and_then(|s| s.available_replicas).unwrap_or(0)
                ));
                lines.push(format!(
                    "Updated: {}",
                    status.and_then(|s| s.updated_replicas).unwrap_or(0)
                ));
                lines.push(format!("Created: {}", created(self)));
                let selector = d
                    .spec
                    .as_ref()
                    .and_then(|s| s.selector.match_labels.as_ref())
                    .map(format_labels)
                    .unwrap_or_else(|| "<none>".to_string());
                lines.push(format!("Selector: {selector}"));
            }
            Resource::Service(s) => {
                let spec = s.spec.as_ref();
                lines.push(format!(
                    "Type: {}",
                    spec.and_then(|sp| sp.type_.as_deref()).unwrap_or("ClusterIP")
                ));
                lines.push(format!(
                    "Cluster IP: {}",
                    spec.and_then(|sp| sp.cluster_ip.as_deref())
                        .unwrap_or("<none>")
                ));
                lines.push(format!("Created: {}", created(self)));
                let selector = spec
                    .and_then(|sp| sp.selector.as_ref())
                    .map(format_labels)
                    .unwrap_or_else(|| "<none>".to_string());
                lines.push(format!("Selector: {selector}"));
                lines.push(String::new());
                lines.push("Ports:".to_string());
                for port in spec.and_then(|sp| sp.ports.as_deref()).unwrap_or_default() {
                    let target = match &port.target_port {
                        Some(IntOrString::Int(i)) => i.to_string(),
                        Some(IntOrString::String(s)) => s.clone(),
                        None => port.port.to_string(),
                    };
                    lines.push(format!(
                        "  - {} {} -> {}/{}",
                        port.name.as_deref().unwrap_or("-"),
                        port.port,
                        target,
                        port.protocol.as_deref().unwrap_or("TCP")
                    ));
                }
            }
            Resource::ConfigMap(c) => {
                lines.push(format!(
                    "Data items: {}",
                    c.data.as_ref().map_or(0, BTreeMap::len)
                ));
                lines.push(format!(
                    "Binary data items: {}",
                    c.binary_data.as_ref().map_or(0, BTreeMap::len)
                ));
                lines.push(format!("Created: {}", created(self)));
                lines.push(String::new());
                lines.push("Data keys:".to_string());
                for key in c.data.iter().flat_map(BTreeMap::keys) {
                    lines.push(format!("  - {key}"));
                }
            }
            Resource::Namespace(n) => {
                lines.push(format!(
                    "Status: {}",
                    n.status
                        .as_ref()
                        .and_then(|s| s.phase.as_deref())
                        .unwrap_or("Unknown")
                ));
                lines.push(format!("Created: {}", created(self)));
            }
        }
        if let Some(labels) = self.labels().filter(|l| !l.is_empty()) {
            lines.push(String::new());
            lines.push("Labels:".to_string());
            for (k, v) in labels {
                lines.push(format!("  {k}={v}"));
            }
        }
        lines
    }

    pub fn to_yaml(&self) -> String {
        match self {
            Resource::Pod(p) => yaml_of(p.as_ref()),
            Resource::Deployment(d) => yaml_of(d.as_ref()),
            Resource::Service(s) => yaml_of(s.as_ref()),
            Resource::ConfigMap(c) => yaml_of(c.as_ref()),
            Resource::Namespace(n) => yaml_of(n.as_ref()),
        }
    }
}

fn yaml_of<T: Serialize>(value: &T) -> String {
    serde_yaml::to_string(value).unwrap_or_else(|e| format!("failed to render YAML: {e}"))
}

fn created(resource: &Resource) -> String {
    resource
        .creation_timestamp()
        .map(|t| t.0.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn format_labels(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn pod_phase(p: &Pod) -> &str {
    p.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown")
}

fn pod_ready(p: &Pod) -> String {
    let ready = p
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|c| c.iter().filter(|cs| cs.ready).count())
        .unwrap_or(0);
    let total = p.spec.as_ref().map(|s| s.containers.len()).unwrap_or(0);
    format!("{ready}/{total}")
}

fn pod_restarts(p: &Pod) -> i32 {
    p.status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|c| c.iter().map(|cs| cs.restart_count).sum())
        .unwrap_or(0)
}

fn service_external_ip(s: &Service) -> String {
    s.status
        .as_ref()
        .and_then(|st| st.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first())
        .and_then(|i| i.ip.clone().or_else(|| i.hostname.clone()))
        .unwrap_or_else(|| "<none>".to_string())
}

fn service_ports(s: &Service) -> String {
    s.spec
        .as_ref()
        .and_then(|sp| sp.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|p| p.port.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

/// One kind's full listing for one namespace. Replaced as a unit, never merged.
#[derive(Clone, Debug)]
pub struct ResourceCollection {
    kind: ResourceKind,
    namespace: String,
    items: Vec<Resource>,
}

impl ResourceCollection {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, items: Vec<Resource>) -> Self {
        debug_assert!(items.iter().all(|r| r.kind() == kind));
        Self {
            kind,
            namespace: namespace.into(),
            items,
        }
    }

    pub fn empty(kind: ResourceKind, namespace: impl Into<String>) -> Self {
        Self::new(kind, namespace, Vec::new())
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn items(&self) -> &[Resource] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Everything from the background that is not a refresh result.
#[derive(Debug)]
pub enum AppEvent {
    MutationSucceeded { message: String },
    MutationFailed(MutationError),
    NamespacesLoaded(Vec<String>),
    NamespacesFailed(String),
    LogsLoaded { pod: String, lines: Vec<String> },
    LogsFailed { pod: String, message: String },
}

/// A mutation waiting on the confirm prompt. `Scale` carries the deployment
/// as it was when the scale was requested, so a refresh in between cannot
/// lose it.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Delete {
        kind: ResourceKind,
        name: String,
    },
    Scale {
        deployment: Arc<Deployment>,
        replicas: i32,
    },
}

impl PendingAction {
    pub fn name(&self) -> &str {
        match self {
            Self::Delete { name, .. } => name,
            Self::Scale { deployment, .. } => deployment.metadata.name.as_deref().unwrap_or_default(),
        }
    }

    pub fn message(&self) -> String {
        let name = self.name();
        match self {
            Self::Delete { kind, .. } => format!("Delete {} '{}'?", kind.singular(), name),
            Self::Scale { replicas, .. } => {
                if *replicas == 0 {
                    format!("Scale '{}' to 0 replicas?\nThis will stop all pods.", name)
                } else {
                    format!("Scale '{}' to {} replicas?", name, replicas)
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn names_for_every_kind() {
        assert_eq!(pod("nginx").name(), "nginx");
        assert_eq!(deployment("web-app").name(), "web-app");
        assert_eq!(service("frontend", &[]).name(), "frontend");
        assert_eq!(config_map("settings", &[]).name(), "settings");
        assert_eq!(namespace("kube-system").name(), "kube-system");
    }

    #[test]
    fn empty_metadata_name_returns_empty_str() {
        let res = Resource::Pod(Arc::new(Pod::default()));
        assert_eq!(res.name(), "");
        assert!(res.owner_references().is_empty());
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(pod("a").kind(), ResourceKind::Pod);
        assert_eq!(config_map("a", &[]).kind(), ResourceKind::ConfigMap);
        assert_eq!(namespace("a").kind(), ResourceKind::Namespace);
    }

    #[test]
    fn columns_line_up_with_headers() {
        let samples = [
            pod_with_phase("p", "Running"),
            deployment("d"),
            service("s", &[("app", "x")]),
            config_map("c", &["a", "b"]),
            namespace("n"),
        ];
        for res in &samples {
            assert_eq!(res.columns().len(), res.kind().headers().len(), "{}", res.kind());
        }
    }

    #[test]
    fn pod_columns_show_phase_and_ready() {
        let res = pod_with_phase("web", "Running");
        assert_eq!(res.columns().get(1).map(String::as_str), Some("Running"));
        assert_eq!(res.columns().get(2).map(String::as_str), Some("0/0"));
        assert_eq!(res.columns().get(9), None);
    }

    #[test]
    fn config_map_counts_entries() {
        let res = config_map("settings", &["a", "b", "c"]);
        assert_eq!(res.columns().get(1).map(String::as_str), Some("3"));
        assert!(res.details().iter().any(|l| l == "  - b"));
    }

    #[test]
    fn service_without_status_has_no_external_ip() {
        let res = service("frontend", &[("app", "web")]);
        assert_eq!(res.columns().get(3).map(String::as_str), Some("<none>"));
        assert!(res.details().iter().any(|l| l == "Selector: app=web"));
    }

    #[test]
    fn namespace_details_skip_namespace_line() {
        let details = namespace("prod").details();
        assert!(!details.iter().any(|l| l.starts_with("Namespace:")));
    }

    #[test]
    fn yaml_contains_name() {
        let yaml = deployment("web-app").to_yaml();
        assert!(yaml.contains("name: web-app"));
    }

    #[test]
    fn kind_tokens() {
        assert_eq!(ResourceKind::from_token("svc"), Some(ResourceKind::Service));
        assert_eq!(ResourceKind::from_token("ConfigMaps"), Some(ResourceKind::ConfigMap));
        assert_eq!(ResourceKind::from_token(" po "), Some(ResourceKind::Pod));
        assert_eq!(ResourceKind::from_token("secrets"), None);
    }

    #[test]
    fn pending_action_messages() {
        let del = PendingAction::Delete {
            kind: ResourceKind::Service,
            name: "frontend".into(),
        };
        assert_eq!(del.message(), "Delete service 'frontend'?");
        let scale = PendingAction::Scale {
            deployment: fixtures::deployment_object("web"),
            replicas: 0,
        };
        assert_eq!(scale.name(), "web");
        assert!(scale.message().contains("stop all pods"));
    }

    #[test]
    fn collection_accessors() {
        let col = ResourceCollection::new(ResourceKind::Pod, "default", pods(&["a", "b"]));
        assert_eq!(col.len(), 2);
        assert_eq!(col.namespace(), "default");
        assert!(ResourceCollection::empty(ResourceKind::Pod, "x").is_empty());
    }
}
