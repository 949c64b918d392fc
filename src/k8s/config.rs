use crate::config::KubernetesConfig;
use kube::config::Kubeconfig;

/// What the kubeconfig says about the context kgo will talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextInfo {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

pub fn context_info(cfg: &KubernetesConfig) -> ContextInfo {
    let kubeconfig = match &cfg.kubeconfig {
        Some(path) => Kubeconfig::read_from(path),
        None => Kubeconfig::read(),
    };
    match kubeconfig {
        Ok(kc) => resolve(&kc, cfg.context.as_deref()),
        Err(e) => {
            tracing::debug!(error = %e, "kubeconfig not readable");
            ContextInfo {
                name: cfg.context.clone(),
                namespace: None,
            }
        }
    }
}

fn resolve(kubeconfig: &Kubeconfig, context: Option<&str>) -> ContextInfo {
    let name = context
        .map(str::to_string)
        .or_else(|| kubeconfig.current_context.clone());
    let namespace = name.as_deref().and_then(|ctx_name| {
        kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == ctx_name)
            .and_then(|c| c.context.as_ref())
            .and_then(|c| c.namespace.clone())
    });
    ContextInfo { name, namespace }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
contexts:
- name: dev
  context:
    cluster: local
    user: me
    namespace: shop
- name: prod
  context:
    cluster: remote
    user: me
clusters: []
users: []
"#;

    #[test]
    fn current_context_namespace() {
        let kc = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let info = resolve(&kc, None);
        assert_eq!(info.name.as_deref(), Some("dev"));
        assert_eq!(info.namespace.as_deref(), Some("shop"));
    }

    #[test]
    fn explicit_context_without_namespace() {
        let kc = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let prod = resolve(&kc, Some("prod"));
        assert_eq!(prod.name.as_deref(), Some("prod"));
        assert_eq!(prod.namespace, None);
        assert_eq!(resolve(&kc, Some("missing")).namespace, None);
    }

    #[test]
    fn unreadable_kubeconfig_keeps_requested_context() {
        let cfg = KubernetesConfig {
            kubeconfig: Some("/nonexistent/kubeconfig".into()),
            context: Some("ci".to_string()),
            namespace: None,
        };
        let info = context_info(&cfg);
        assert_eq!(info.name.as_deref(), Some("ci"));
        assert_eq!(info.namespace, None);
    }
}
