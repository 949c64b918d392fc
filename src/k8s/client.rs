use crate::config::KubernetesConfig;
use crate::errors::InitializationError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Builds a client from the configured kubeconfig path and context, falling
/// back to the usual inference when neither is set.
pub async fn create_client(cfg: &KubernetesConfig) -> Result<Client, InitializationError> {
    let options = KubeConfigOptions {
        context: cfg.context.clone(),
        ..Default::default()
    };
    let config = match &cfg.kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        None if cfg.context.is_some() => Config::from_kubeconfig(&options).await?,
        None => return Ok(Client::try_default().await?),
    };
    Ok(Client::try_from(config)?)
}
