use crate::errors::GatewayError;
use crate::models::{Resource, ResourceCollection, ResourceKind};
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{ConfigMap, Namespace, Pod, Service},
};
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// Cluster access used by the refresh engine and the mutation commands.
pub trait ResourceGateway: Send + Sync + 'static {
    /// Lists one kind in `namespace`, sorted by name. Namespaces ignore it.
    fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> impl Future<Output = Result<ResourceCollection, GatewayError>> + Send;

    fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        manifest: serde_json::Value,
    ) -> impl Future<Output = Result<Resource, GatewayError>> + Send;

    fn update(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        manifest: serde_json::Value,
    ) -> impl Future<Output = Result<Resource, GatewayError>> + Send;

    fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

async fn list_items<K>(api: Api<K>, wrap: fn(Arc<K>) -> Resource) -> Result<Vec<Resource>, GatewayError>
where
    K: Clone + DeserializeOwned + Debug,
{
    let list = api.list(&ListParams::default()).await?;
    Ok(list.items.into_iter().map(|obj| wrap(Arc::new(obj))).collect())
}

async fn create_item<K>(
    api: Api<K>,
    manifest: serde_json::Value,
    wrap: fn(Arc<K>) -> Resource,
) -> Result<Resource, GatewayError>
where
    K: Clone + DeserializeOwned + Serialize + Debug,
{
    let obj: K = serde_json::from_value(manifest)?;
    let created = api.create(&PostParams::default(), &obj).await?;
    Ok(wrap(Arc::new(created)))
}

async fn replace_item<K>(
    api: Api<K>,
    name: &str,
    manifest: serde_json::Value,
    wrap: fn(Arc<K>) -> Resource,
) -> Result<Resource, GatewayError>
where
    K: Clone + DeserializeOwned + Serialize + Debug,
{
    let obj: K = serde_json::from_value(manifest)?;
    let replaced = api.replace(name, &PostParams::default(), &obj).await?;
    Ok(wrap(Arc::new(replaced)))
}

async fn delete_item<K>(api: Api<K>, name: &str) -> Result<(), GatewayError>
where
    K: Clone + DeserializeOwned + Debug,
{
    api.delete(name, &DeleteParams::default()).await?;
    Ok(())
}

impl ResourceGateway for KubeGateway {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> Result<ResourceCollection, GatewayError> {
        let mut items = match kind {
            ResourceKind::Pod => list_items(self.namespaced::<Pod>(namespace), Resource::Pod).await?,
            ResourceKind::Deployment => {
                list_items(self.namespaced::<Deployment>(namespace), Resource::Deployment).await?
            }
            ResourceKind::Service => {
                list_items(self.namespaced::<Service>(namespace), Resource::Service).await?
            }
            ResourceKind::ConfigMap => {
                list_items(self.namespaced::<ConfigMap>(namespace), Resource::ConfigMap).await?
            }
            ResourceKind::Namespace => list_items(self.namespaces(), Resource::Namespace).await?,
        };
        items.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(ResourceCollection::new(kind, namespace, items))
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        manifest: serde_json::Value,
    ) -> Result<Resource, GatewayError> {
        match kind {
            ResourceKind::Pod => {
                create_item(self.namespaced::<Pod>(namespace), manifest, Resource::Pod).await
            }
            ResourceKind::Deployment => {
                create_item(self.namespaced::<Deployment>(namespace), manifest, Resource::Deployment)
                    .await
            }
            ResourceKind::Service => {
                create_item(self.namespaced::<Service>(namespace), manifest, Resource::Service).await
            }
            ResourceKind::ConfigMap => {
                create_item(self.namespaced::<ConfigMap>(namespace), manifest, Resource::ConfigMap)
                    .await
            }
            ResourceKind::Namespace => {
                create_item(self.namespaces(), manifest, Resource::Namespace).await
            }
        }
    }

    async fn update(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        manifest: serde_json::Value,
    ) -> Result<Resource, GatewayError> {
        match kind {
            ResourceKind::Pod => {
                replace_item(self.namespaced::<Pod>(namespace), name, manifest, Resource::Pod).await
            }
            ResourceKind::Deployment => {
                replace_item(
                    self.namespaced::<Deployment>(namespace),
                    name,
                    manifest,
                    Resource::Deployment,
                )
                .await
            }
            ResourceKind::Service => {
                replace_item(self.namespaced::<Service>(namespace), name, manifest, Resource::Service)
                    .await
            }
            ResourceKind::ConfigMap => {
                replace_item(
                    self.namespaced::<ConfigMap>(namespace),
                    name,
                    manifest,
                    Resource::ConfigMap,
                )
                .await
            }
            ResourceKind::Namespace => {
                replace_item(self.namespaces(), name, manifest, Resource::Namespace).await
            }
        }
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), GatewayError> {
        match kind {
            ResourceKind::Pod => delete_item(self.namespaced::<Pod>(namespace), name).await,
            ResourceKind::Deployment => {
                delete_item(self.namespaced::<Deployment>(namespace), name).await
            }
            ResourceKind::Service => delete_item(self.namespaced::<Service>(namespace), name).await,
            ResourceKind::ConfigMap => {
                delete_item(self.namespaced::<ConfigMap>(namespace), name).await
            }
            ResourceKind::Namespace => delete_item(self.namespaces(), name).await,
        }
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, GatewayError> {
        let list = self.namespaces().list(&ListParams::default()).await?;
        let mut names: Vec<String> = list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect();
        names.sort();
        Ok(names)
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GatewayError;

    const PODS: &str = r#"{"kind":"PodList","apiVersion":"v1","metadata":{},"items":[
        {"metadata":{"name":"redis","namespace":"shop"}},
        {"metadata":{"name":"api","namespace":"shop"}}
    ]}"#;

    const NOT_FOUND: &str = r#"{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Failure","message":"pods \"ghost\" not found","reason":"NotFound","code":404}"#;

    #[tokio::test]
    async fn list_pods_is_sorted_and_scoped() {
        let client = mock::client(|method, path| {
            assert_eq!(method, http::Method::GET);
            assert_eq!(path, "/api/v1/namespaces/shop/pods");
            (200, PODS.to_string())
        });
        let col = KubeGateway::new(client)
            .list(ResourceKind::Pod, "shop")
            .await
            .unwrap();
        assert_eq!(col.kind(), ResourceKind::Pod);
        assert_eq!(col.namespace(), "shop");
        let names: Vec<_> = col.items().iter().map(Resource::name).collect();
        assert_eq!(names, vec!["api", "redis"]);
    }

    #[tokio::test]
    async fn list_config_maps_uses_core_path() {
        let client = mock::client(|_, path| {
            assert_eq!(path, "/api/v1/namespaces/default/configmaps");
            (200, mock::empty_list("ConfigMapList"))
        });
        let col = KubeGateway::new(client)
            .list(ResourceKind::ConfigMap, "default")
            .await
            .unwrap();
        assert!(col.is_empty());
    }

    #[tokio::test]
    async fn list_deployments_uses_apps_path() {
        let client = mock::client(|_, path| {
            assert_eq!(path, "/apis/apps/v1/namespaces/default/deployments");
            (200, mock::empty_list("DeploymentList"))
        });
        assert!(
            KubeGateway::new(client)
                .list(ResourceKind::Deployment, "default")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn list_namespaces_returns_sorted_names() {
        let client = mock::client(|_, path| {
            assert_eq!(path, "/api/v1/namespaces");
            (
                200,
                r#"{"kind":"NamespaceList","apiVersion":"v1","metadata":{},"items":[
                    {"metadata":{"name":"prod"}},{"metadata":{"name":"default"}}]}"#
                    .to_string(),
            )
        });
        let names = KubeGateway::new(client).list_namespaces().await.unwrap();
        assert_eq!(names, vec!["default", "prod"]);
    }

    #[tokio::test]
    async fn api_errors_surface_as_gateway_errors() {
        let client = mock::client(|_, _| (404, NOT_FOUND.to_string()));
        let err = KubeGateway::new(client)
            .delete(ResourceKind::Pod, "default", "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Api(kube::Error::Api(ref e)) if e.code == 404));
    }

    #[tokio::test]
    async fn create_rejects_bad_manifest() {
        let client = mock::client(|_, _| (500, String::new()));
        let err = KubeGateway::new(client)
            .create(ResourceKind::Pod, "default", serde_json::json!({"spec": 5}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Manifest(_)));
    }

    #[tokio::test]
    async fn create_pod_posts_to_namespace() {
        let client = mock::client(|method, path| {
            assert_eq!(method, http::Method::POST);
            assert_eq!(path, "/api/v1/namespaces/default/pods");
            (
                201,
                r#"{"kind":"Pod","apiVersion":"v1","metadata":{"name":"web","namespace":"default"}}"#
                    .to_string(),
            )
        });
        let manifest = crate::k8s::actions::pod_manifest("web", "nginx:1.27");
        let created = KubeGateway::new(client)
            .create(ResourceKind::Pod, "default", manifest)
            .await
            .unwrap();
        assert_eq!(created.name(), "web");
    }
}
