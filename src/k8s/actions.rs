use crate::errors::GatewayError;
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Pod};
use kube::Client;
use kube::api::{Api, LogParams};

/// Single-container pod named after itself, exposing port 80.
pub fn pod_manifest(name: &str, image: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name },
        "spec": {
            "containers": [{
                "name": name,
                "image": image,
                "ports": [{ "containerPort": 80 }]
            }]
        }
    })
}

/// The deployment as it is, with `spec.replicas` replaced. Sent through
/// `update` so the resource version guards against concurrent edits.
pub fn scaled_deployment(
    deployment: &Deployment,
    replicas: i32,
) -> Result<serde_json::Value, GatewayError> {
    let mut scaled = deployment.clone();
    scaled.metadata.managed_fields = None;
    scaled.status = None;
    scaled.spec.get_or_insert_with(Default::default).replicas = Some(replicas);
    Ok(serde_json::to_value(&scaled)?)
}

/// One-shot tail of a pod's logs.
pub async fn fetch_log_tail(
    client: Client,
    namespace: &str,
    pod_name: &str,
    tail_lines: i64,
) -> Result<Vec<String>, GatewayError> {
    let pods: Api<Pod> = Api::namespaced(client, namespace);
    let lp = LogParams {
        follow: false,
        tail_lines: Some(tail_lines),
        ..Default::default()
    };
    let text = pods.logs(pod_name, &lp).await?;
    Ok(text.lines().map(str::to_owned).collect())
}
