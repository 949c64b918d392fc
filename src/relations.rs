//! Relationship inference between loaded resources. Pure, recomputed on demand.

use crate::models::{Resource, ResourceKind};
use k8s_openapi::api::core::v1::{Pod, Service};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationType {
    OwnedBy,
    Owns,
    ExposedBy,
    Exposes,
    Uses,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OwnedBy => "owned-by",
            Self::Owns => "owns",
            Self::ExposedBy => "exposed-by",
            Self::Exposes => "exposes",
            Self::Uses => "uses",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub kind: ResourceKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub from: Endpoint,
    pub to: Endpoint,
    pub relation: RelationType,
}

impl Relationship {
    fn new(from: (ResourceKind, &str), to: (ResourceKind, &str), relation: RelationType) -> Self {
        Self {
            from: Endpoint {
                kind: from.0,
                name: from.1.to_string(),
            },
            to: Endpoint {
                kind: to.0,
                name: to.1.to_string(),
            },
            relation,
        }
    }

    pub fn involves(&self, kind: ResourceKind, name: &str) -> bool {
        (self.from.kind == kind && self.from.name == name)
            || (self.to.kind == kind && self.to.name == name)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} -> {}/{} ({})",
            self.from.kind.singular(),
            self.from.name,
            self.to.kind.singular(),
            self.to.name,
            self.relation
        )
    }
}

/// Reference names are `Option<String>` or `String` depending on the API type.
trait RefName {
    fn ref_name(&self) -> Option<&str>;
}

impl RefName for String {
    fn ref_name(&self) -> Option<&str> {
        Some(self.as_str()).filter(|s| !s.is_empty())
    }
}

impl RefName for Option<String> {
    fn ref_name(&self) -> Option<&str> {
        self.as_deref().filter(|s| !s.is_empty())
    }
}

/// A service selects a pod when every selector pair is present in the pod's
/// labels. Services without a selector select nothing.
pub fn selector_matches(service: &Service, labels: Option<&BTreeMap<String, String>>) -> bool {
    let Some(selector) = service.spec.as_ref().and_then(|s| s.selector.as_ref()) else {
        return false;
    };
    let Some(labels) = labels else {
        return false;
    };
    !selector.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

/// Config maps a pod mounts as a volume or reads through its environment.
pub fn config_map_refs(pod: &Pod) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    let Some(spec) = pod.spec.as_ref() else {
        return refs;
    };
    for volume in spec.volumes.iter().flatten() {
        if let Some(name) = volume.config_map.as_ref().and_then(|cm| cm.name.ref_name()) {
            refs.insert(name.to_string());
        }
    }
    for container in spec.containers.iter().chain(spec.init_containers.iter().flatten()) {
        for env in container.env.iter().flatten() {
            let name = env
                .value_from
                .as_ref()
                .and_then(|v| v.config_map_key_ref.as_ref())
                .and_then(|r| r.name.ref_name());
            if let Some(name) = name {
                refs.insert(name.to_string());
            }
        }
        for source in container.env_from.iter().flatten() {
            if let Some(name) = source.config_map_ref.as_ref().and_then(|r| r.name.ref_name()) {
                refs.insert(name.to_string());
            }
        }
    }
    refs
}

/// Deployment owning the pod, directly or through a `<deployment>-<hash>`
/// replica set of a loaded deployment.
fn owning_deployment<'a>(pod: &'a Resource, deployments: &'a BTreeSet<&'a str>) -> Option<&'a str> {
    pod.owner_references().iter().find_map(|owner| match owner.kind.as_str() {
        "Deployment" => Some(owner.name.as_str()),
        "ReplicaSet" => owner
            .name
            .rsplit_once('-')
            .and_then(|(prefix, _)| deployments.get(prefix).copied()),
        _ => None,
    })
}

/// Edges between the given collections. Pod edges come first (owned-by,
/// exposed-by, uses), followed by the reverse deployment and service edges.
pub fn infer(
    pods: &[Resource],
    deployments: &[Resource],
    services: &[Resource],
    config_maps: &[Resource],
) -> Vec<Relationship> {
    let deployment_names: BTreeSet<&str> = deployments.iter().map(Resource::name).collect();
    let config_map_names: BTreeSet<&str> = config_maps.iter().map(Resource::name).collect();
    let services: Vec<&Service> = services
        .iter()
        .filter_map(|r| match r {
            Resource::Service(s) => Some(s.as_ref()),
            _ => None,
        })
        .collect();

    let mut pod_edges = Vec::new();
    let mut owns = Vec::new();
    let mut exposes = Vec::new();

    for resource in pods {
        let Resource::Pod(pod) = resource else {
            continue;
        };
        let pod_name = resource.name();
        let pod_end = (ResourceKind::Pod, pod_name);

        if let Some(deployment) = owning_deployment(resource, &deployment_names) {
            let dep_end = (ResourceKind::Deployment, deployment);
            pod_edges.push(Relationship::new(pod_end, dep_end, RelationType::OwnedBy));
            owns.push(Relationship::new(dep_end, pod_end, RelationType::Owns));
        }

        for service in &services {
            if selector_matches(service, resource.labels()) {
                let svc_end = (ResourceKind::Service, service.metadata.name.as_deref().unwrap_or_default());
                pod_edges.push(Relationship::new(pod_end, svc_end, RelationType::ExposedBy));
                exposes.push(Relationship::new(svc_end, pod_end, RelationType::Exposes));
            }
        }

        for cm in config_map_refs(pod) {
            if config_map_names.contains(cm.as_str()) {
                pod_edges.push(Relationship::new(
                    pod_end,
                    (ResourceKind::ConfigMap, cm.as_str()),
                    RelationType::Uses,
                ));
            }
        }
    }

    pod_edges.extend(owns);
    pod_edges.extend(exposes);
    pod_edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{config_map, deployment, labelled_pod, service};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
    use std::sync::Arc;

    fn owned(mut pod: Pod, kind: &str, owner: &str) -> Pod {
        pod.metadata.owner_references = Some(vec![OwnerReference {
            kind: kind.to_string(),
            name: owner.to_string(),
            ..Default::default()
        }]);
        pod
    }

    fn wrap(pod: Pod) -> Resource {
        Resource::Pod(Arc::new(pod))
    }

    fn edges(rels: &[Relationship]) -> Vec<String> {
        rels.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn pod_owned_by_deployment() {
        let pods = vec![wrap(owned(labelled_pod("web-1", &[]), "Deployment", "web"))];
        let rels = infer(&pods, &[], &[], &[]);
        assert_eq!(
            edges(&rels),
            vec![
                "pod/web-1 -> deployment/web (owned-by)",
                "deployment/web -> pod/web-1 (owns)",
            ]
        );
    }

    #[test]
    fn replica_set_owner_resolves_to_loaded_deployment() {
        let pods = vec![
            wrap(owned(labelled_pod("web-abc-1", &[]), "ReplicaSet", "web-7d9f8")),
            wrap(owned(labelled_pod("other-1", &[]), "ReplicaSet", "other-55c")),
        ];
        let rels = infer(&pods, &[deployment("web")], &[], &[]);
        assert_eq!(rels.len(), 2);
        assert!(rels[0].involves(ResourceKind::Deployment, "web"));
        assert!(!rels.iter().any(|r| r.involves(ResourceKind::Pod, "other-1")));
    }

    #[test]
    fn service_selector_requires_every_pair() {
        let pods = vec![
            wrap(labelled_pod("match", &[("app", "web"), ("tier", "fe")])),
            wrap(labelled_pod("partial", &[("app", "web")])),
        ];
        let services = vec![service("frontend", &[("app", "web"), ("tier", "fe")])];
        let rels = infer(&pods, &[], &services, &[]);
        assert_eq!(
            edges(&rels),
            vec![
                "pod/match -> service/frontend (exposed-by)",
                "service/frontend -> pod/match (exposes)",
            ]
        );
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let pods = vec![wrap(labelled_pod("a", &[("app", "web")]))];
        let services = vec![service("headless", &[])];
        assert!(infer(&pods, &[], &services, &[]).is_empty());
    }

    #[test]
    fn config_map_via_volume_and_env() {
        let pod: Pod = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "api", "namespace": "default" },
            "spec": {
                "volumes": [{ "name": "cfg", "configMap": { "name": "settings" } }],
                "containers": [{
                    "name": "api",
                    "env": [{
                        "name": "MODE",
                        "valueFrom": { "configMapKeyRef": { "name": "flags", "key": "mode" } }
                    }]
                }]
            }
        }))
        .unwrap();

        let refs = config_map_refs(&pod);
        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["flags", "settings"]);

        let cms = vec![config_map("settings", &[])];
        let rels = infer(&[wrap(pod)], &[], &[], &cms);
        assert_eq!(edges(&rels), vec!["pod/api -> configmap/settings (uses)"]);
    }
}
