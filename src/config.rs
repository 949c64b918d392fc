use crate::errors::InitializationError;
use crate::models::ResourceKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub kubernetes: KubernetesConfig,
    pub ui: UiConfig,
    pub refresh: RefreshConfig,
    pub features: FeaturesConfig,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    /// Seconds between automatic refreshes; 0 disables them.
    #[serde(alias = "refresh_interval")]
    pub auto_refresh: u64,
    pub max_logs: usize,
    pub banner_seconds: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            auto_refresh: 30,
            max_logs: 1000,
            banner_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub kinds: Vec<String>,
    /// 0 derives the capacity from the number of kinds.
    pub queue_capacity: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            kinds: ResourceKind::DEFAULT_REFRESH
                .iter()
                .map(|k| k.title().to_lowercase())
                .collect(),
            queue_capacity: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub enable_logs: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { enable_logs: true }
    }
}

impl Config {
    /// Loads the first config file found, or defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), InitializationError> {
        let Some(path) = discover_config_path(explicit) else {
            return Ok((Self::default(), None));
        };
        let raw = fs::read_to_string(&path).map_err(|source| InitializationError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_yaml(&raw, &path)?;
        Ok((config, Some(path)))
    }

    pub fn from_yaml(raw: &str, path: &Path) -> Result<Self, InitializationError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| InitializationError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Kinds fetched on each refresh, in tab order, without duplicates.
    pub fn resource_kinds(&self) -> Result<Vec<ResourceKind>, InitializationError> {
        let mut kinds = Vec::new();
        for token in &self.refresh.kinds {
            let kind = ResourceKind::from_token(token)
                .ok_or_else(|| InitializationError::UnknownKind(token.clone()))?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            kinds.extend(ResourceKind::DEFAULT_REFRESH);
        }
        Ok(kinds)
    }
}

fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("KGO_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [PathBuf::from("kgo.yaml"), PathBuf::from("kgo.yml")];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let mut user_candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        user_candidates.push(home.join(".kgo.yaml"));
        user_candidates.push(home.join(".kgo.yml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        user_candidates.push(config_dir.join("kgo").join("config.yaml"));
    }
    user_candidates.into_iter().find(|candidate| candidate.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Config {
        Config::from_yaml(raw, Path::new("kgo.yaml")).unwrap()
    }

    #[test]
    fn empty_file_is_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.ui.theme, "dark");
        assert_eq!(cfg.ui.auto_refresh, 30);
        assert_eq!(cfg.ui.max_logs, 1000);
        assert!(cfg.features.enable_logs);
        assert_eq!(
            cfg.resource_kinds().unwrap(),
            ResourceKind::DEFAULT_REFRESH.to_vec()
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse(
            r#"
kubernetes:
  namespace: shop
ui:
  theme: dracula
  refresh_interval: 0
features:
  enable_logs: false
log_level: debug
"#,
        );
        assert_eq!(cfg.kubernetes.namespace.as_deref(), Some("shop"));
        assert_eq!(cfg.ui.theme, "dracula");
        assert_eq!(cfg.ui.auto_refresh, 0);
        assert_eq!(cfg.ui.max_logs, 1000);
        assert!(!cfg.features.enable_logs);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn kinds_accept_aliases_and_dedupe() {
        let cfg = parse("refresh:\n  kinds: [svc, pods, po, ns]\n");
        assert_eq!(
            cfg.resource_kinds().unwrap(),
            vec![
                ResourceKind::Service,
                ResourceKind::Pod,
                ResourceKind::Namespace
            ]
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let cfg = parse("refresh:\n  kinds: [pods, secrets]\n");
        assert!(matches!(
            cfg.resource_kinds(),
            Err(InitializationError::UnknownKind(k)) if k == "secrets"
        ));
    }

    #[test]
    fn malformed_yaml_is_an_init_error() {
        let err = Config::from_yaml("ui: [", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, InitializationError::ConfigParse { .. }));
    }

    #[test]
    fn explicit_missing_path_fails_to_read() {
        let path = Path::new("/nonexistent/kgo-test/config.yaml");
        let err = Config::load(Some(path)).unwrap_err();
        assert!(matches!(err, InitializationError::ConfigRead { .. }));
    }
}
