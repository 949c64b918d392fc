use crate::config::Config;
use crate::errors::{InitializationError, MutationError, MutationOp};
use crate::filter::FilterFlags;
use crate::k8s::actions;
use crate::k8s::gateway::{KubeGateway, ResourceGateway};
use crate::models::{AppEvent, AppMode, PendingAction, Resource, ResourceKind};
use crate::refresh::{self, FetchOrchestrator, LoadState, UpdateConsumer};
use crate::relations::{self, Relationship};
use crate::ui::theme::Theme;
use crate::view::{ViewMode, ViewState};
use k8s_openapi::api::apps::v1::Deployment;
use ratatui::widgets::{ListState, TableState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::{info, warn};

const ERROR_BANNER: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct Settings {
    pub auto_refresh: Option<Duration>,
    pub max_logs: usize,
    pub enable_logs: bool,
    pub success_banner: Duration,
    pub error_banner: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_refresh: Some(Duration::from_secs(30)),
            max_logs: 1000,
            enable_logs: true,
            success_banner: Duration::from_secs(5),
            error_banner: ERROR_BANNER,
        }
    }
}

/// Everything `App::new` needs besides the gateway.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub namespace: String,
    pub context: String,
    pub kinds: Vec<ResourceKind>,
    pub theme: Theme,
    pub settings: Settings,
    pub queue_capacity: usize,
}

impl AppOptions {
    pub fn from_config(
        cfg: &Config,
        namespace: String,
        context: String,
    ) -> Result<Self, InitializationError> {
        let theme = Theme::from_name(&cfg.ui.theme).unwrap_or_else(|| {
            warn!(theme = %cfg.ui.theme, "unknown theme, using dark");
            Theme::Dark
        });
        Ok(Self {
            namespace,
            context,
            kinds: cfg.resource_kinds()?,
            theme,
            settings: Settings {
                auto_refresh: (cfg.ui.auto_refresh > 0)
                    .then(|| Duration::from_secs(cfg.ui.auto_refresh)),
                max_logs: cfg.ui.max_logs.max(1),
                enable_logs: cfg.features.enable_logs,
                success_banner: Duration::from_secs(cfg.ui.banner_seconds.max(1)),
                error_banner: ERROR_BANNER,
            },
            queue_capacity: cfg.refresh.queue_capacity,
        })
    }
}

/// Receivers the event loop selects on next to terminal input.
pub struct Channels {
    pub events: UnboundedReceiver<AppEvent>,
    pub loads: watch::Receiver<Arc<LoadState>>,
}

/// A consistent read-only view of both halves of the state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub view: ViewState,
    pub load: Arc<LoadState>,
    pub filtered: Vec<Resource>,
}

impl Snapshot {
    pub fn selected_resource(&self) -> Option<&Resource> {
        self.filtered.get(self.view.selected())
    }

    pub fn total(&self) -> usize {
        self.load.items(self.view.kind()).len()
    }
}

pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub dirty: bool,

    pub view: ViewState,
    pub load: Arc<LoadState>,
    orchestrator: FetchOrchestrator<KubeGateway>,
    last_refresh: Option<Instant>,

    pub namespace: String,
    pub context: String,
    pub theme: Theme,
    pub settings: Settings,

    pub event_tx: UnboundedSender<AppEvent>,
    pub table_state: TableState,

    pub filter_input: String,
    pub create_input: String,
    pub scale_input: String,
    scale_target: Option<Arc<Deployment>>,
    pub pending_action: Option<PendingAction>,

    pub available_namespaces: Vec<String>,
    pub filtered_namespaces: Vec<String>,
    pub namespace_input: String,
    pub namespace_typing: bool,
    pub popup_state: ListState,

    pub logs: Vec<String>,
    pub logs_for: Option<String>,
    pub logs_loading: bool,

    pub last_error: Option<String>,
    pub last_success: Option<String>,
    pub message_time: Option<Instant>,
}

impl App {
    /// Wires the refresh pipeline and spawns its consumer. Must be called
    /// inside a tokio runtime.
    pub fn new(gateway: KubeGateway, options: AppOptions) -> (Self, Channels) {
        let AppOptions {
            namespace,
            context,
            kinds,
            theme,
            settings,
            queue_capacity,
        } = options;

        let (update_tx, update_rx) = refresh::queue(queue_capacity, kinds.len());
        let (consumer, loads) = UpdateConsumer::new(&namespace);
        tokio::spawn(consumer.run(update_rx));
        let first_kind = kinds.first().copied().unwrap_or(ResourceKind::Pod);
        let orchestrator = FetchOrchestrator::new(Arc::new(gateway), kinds, update_tx);
        let (event_tx, events) = tokio::sync::mpsc::unbounded_channel();

        let app = Self {
            mode: AppMode::List,
            should_quit: false,
            dirty: true,
            view: ViewState::new(first_kind),
            load: loads.borrow().clone(),
            orchestrator,
            last_refresh: None,
            namespace,
            context,
            theme,
            settings,
            event_tx,
            table_state: TableState::default(),
            filter_input: String::new(),
            create_input: String::new(),
            scale_input: String::new(),
            scale_target: None,
            pending_action: None,
            available_namespaces: Vec::new(),
            filtered_namespaces: Vec::new(),
            namespace_input: String::new(),
            namespace_typing: false,
            popup_state: ListState::default(),
            logs: Vec::new(),
            logs_for: None,
            logs_loading: false,
            last_error: None,
            last_success: None,
            message_time: None,
        };
        (app, Channels { events, loads })
    }

    fn gateway(&self) -> Arc<KubeGateway> {
        self.orchestrator.gateway().clone()
    }

    /// Registered kinds in tab order.
    pub fn kinds(&self) -> &[ResourceKind] {
        self.orchestrator.kinds()
    }

    pub fn start_refresh(&mut self) -> u64 {
        self.last_refresh = Some(Instant::now());
        self.dirty = true;
        self.orchestrator.start_refresh(&self.namespace)
    }

    /// True from `start_refresh` until the consumer has seen every result
    /// of the latest cycle.
    pub fn is_loading(&self) -> bool {
        self.load.loading || self.load.generation < self.orchestrator.generation()
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        let Some(interval) = self.settings.auto_refresh else {
            return false;
        };
        !self.is_loading()
            && self
                .last_refresh
                .is_none_or(|t| now.saturating_duration_since(t) >= interval)
    }

    /// Installs a snapshot published by the consumer.
    pub fn apply_load_state(&mut self, load: Arc<LoadState>) {
        self.load = load;
        self.view.clamp(&self.load);
        self.dirty = true;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            view: self.view.clone(),
            load: self.load.clone(),
            filtered: self.view.filtered(&self.load),
        }
    }

    pub fn selected_resource(&self) -> Option<Resource> {
        self.view.selected_resource(&self.load)
    }

    pub fn relationships(&self) -> Vec<Relationship> {
        relations::infer(
            self.load.items(ResourceKind::Pod),
            self.load.items(ResourceKind::Deployment),
            self.load.items(ResourceKind::Service),
            self.load.items(ResourceKind::ConfigMap),
        )
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.view.move_selection(delta, &self.load);
    }

    pub fn select_first(&mut self) {
        self.view.select_first();
    }

    pub fn select_last(&mut self) {
        self.view.select_last(&self.load);
    }

    /// Ignored for kinds that are not being fetched.
    pub fn switch_kind(&mut self, kind: ResourceKind) {
        if self.kinds().contains(&kind) {
            self.view.switch_kind(kind);
        }
    }

    pub fn next_kind(&mut self) {
        self.step_kind(1);
    }

    pub fn prev_kind(&mut self) {
        self.step_kind(-1);
    }

    fn step_kind(&mut self, step: isize) {
        let kinds = self.kinds();
        let Some(idx) = kinds.iter().position(|k| *k == self.view.kind()) else {
            return;
        };
        let next = kinds[(idx as isize + step).rem_euclid(kinds.len() as isize) as usize];
        self.view.switch_kind(next);
    }

    pub fn set_filter(&mut self, text: impl Into<String>, flags: FilterFlags) {
        self.view.set_filter(text, flags);
    }

    pub fn toggle_filter_flag(&mut self, toggle: impl FnOnce(&mut FilterFlags)) {
        let mut flags = self.view.flags();
        toggle(&mut flags);
        let text = self.view.filter_text().to_string();
        self.view.set_filter(text, flags);
    }

    pub fn clear_filter(&mut self) {
        self.filter_input.clear();
        self.view.set_filter("", self.view.flags());
    }

    pub fn cycle_view_mode(&mut self) {
        self.view.cycle_mode();
        if self.view.mode() == ViewMode::Logs {
            self.request_logs();
        }
    }

    pub fn enter_details(&mut self) {
        if self.selected_resource().is_some() {
            self.view.enter_details();
        }
    }

    pub fn show_logs(&mut self) {
        if self.view.show_logs() {
            self.request_logs();
        }
    }

    /// Fetches a one-shot tail of the selected pod's logs.
    pub fn request_logs(&mut self) {
        if !self.settings.enable_logs {
            self.logs = vec!["Logs are disabled in the configuration.".to_string()];
            self.logs_for = None;
            return;
        }
        let Some(Resource::Pod(pod)) = self.selected_resource() else {
            self.logs.clear();
            self.logs_for = None;
            return;
        };
        let name = pod.metadata.name.clone().unwrap_or_default();
        let namespace = pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| self.namespace.clone());
        self.logs.clear();
        self.logs_for = Some(name.clone());
        self.logs_loading = true;

        let client = self.gateway().client().clone();
        let tail = i64::try_from(self.settings.max_logs).unwrap_or(i64::MAX);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match actions::fetch_log_tail(client, &namespace, &name, tail).await {
                Ok(lines) => AppEvent::LogsLoaded { pod: name, lines },
                Err(e) => AppEvent::LogsFailed {
                    pod: name,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    pub fn load_namespaces(&self) {
        let gateway = self.gateway();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match gateway.list_namespaces().await {
                Ok(names) => AppEvent::NamespacesLoaded(names),
                Err(e) => AppEvent::NamespacesFailed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    pub fn open_namespace_popup(&mut self) {
        self.namespace_input.clear();
        self.namespace_typing = false;
        self.filtered_namespaces
            .clone_from(&self.available_namespaces);
        let current = self
            .filtered_namespaces
            .iter()
            .position(|ns| *ns == self.namespace);
        self.popup_state
            .select(current.or((!self.filtered_namespaces.is_empty()).then_some(0)));
        self.mode = AppMode::NamespaceSelect;
        self.load_namespaces();
    }

    pub fn update_namespace_filter(&mut self) {
        if self.namespace_input.is_empty() {
            self.filtered_namespaces
                .clone_from(&self.available_namespaces);
        } else {
            let query = self.namespace_input.to_lowercase();
            self.filtered_namespaces = self
                .available_namespaces
                .iter()
                .filter(|ns| ns.to_lowercase().contains(&query))
                .cloned()
                .collect();
        }
        if self.filtered_namespaces.is_empty() {
            self.popup_state.select(None);
        } else {
            self.popup_state.select(Some(0));
        }
    }

    /// Switching namespace always starts a fresh refresh.
    pub fn change_namespace(&mut self, namespace: String) {
        if namespace != self.namespace {
            info!(from = %self.namespace, to = %namespace, "switching namespace");
            self.namespace = namespace;
            self.view.select_first();
        }
        self.start_refresh();
    }

    pub fn request_delete(&mut self) {
        match self.selected_resource() {
            Some(res) => {
                self.pending_action = Some(PendingAction::Delete {
                    kind: res.kind(),
                    name: res.name().to_string(),
                });
                self.mode = AppMode::Confirm;
            }
            None => self.set_error("No resource selected".to_string()),
        }
    }

    pub fn request_scale(&mut self) {
        match self.selected_resource() {
            Some(Resource::Deployment(dep)) => {
                self.scale_target = Some(dep);
                self.scale_input.clear();
                self.mode = AppMode::ScaleInput;
            }
            Some(_) => self.set_error("Only deployments can be scaled".to_string()),
            None => self.set_error("No deployment selected".to_string()),
        }
    }

    pub fn submit_scale(&mut self) {
        let Ok(replicas) = self.scale_input.trim().parse::<i32>() else {
            self.set_error(format!("Invalid replica count '{}'", self.scale_input.trim()));
            return;
        };
        if replicas < 0 {
            self.set_error("Replica count cannot be negative".to_string());
            return;
        }
        let Some(deployment) = self.scale_target.take() else {
            self.mode = AppMode::List;
            self.set_error("No deployment selected".to_string());
            return;
        };
        self.pending_action = Some(PendingAction::Scale {
            deployment,
            replicas,
        });
        self.mode = AppMode::Confirm;
    }

    /// Runs the confirmed action. Nothing reaches the gateway without it.
    pub fn confirm_pending(&mut self) {
        self.mode = AppMode::List;
        match self.pending_action.take() {
            Some(PendingAction::Delete { kind, name }) => self.spawn_delete(kind, name),
            Some(PendingAction::Scale {
                deployment,
                replicas,
            }) => self.spawn_scale(&deployment, replicas),
            None => {}
        }
    }

    pub fn cancel_pending(&mut self) {
        self.pending_action = None;
        self.mode = AppMode::List;
    }

    fn spawn_delete(&self, kind: ResourceKind, name: String) {
        let gateway = self.gateway();
        let namespace = self.namespace.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match gateway.delete(kind, &namespace, &name).await {
                Ok(()) => AppEvent::MutationSucceeded {
                    message: format!("Deleted {} '{}'", kind.singular(), name),
                },
                Err(source) => AppEvent::MutationFailed(MutationError {
                    op: MutationOp::Delete,
                    kind,
                    name,
                    source,
                }),
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_scale(&mut self, deployment: &Deployment, replicas: i32) {
        let name = deployment.metadata.name.clone().unwrap_or_default();
        let manifest = match actions::scaled_deployment(deployment, replicas) {
            Ok(m) => m,
            Err(source) => {
                self.set_error(
                    MutationError {
                        op: MutationOp::Update,
                        kind: ResourceKind::Deployment,
                        name,
                        source,
                    }
                    .to_string(),
                );
                return;
            }
        };

        let gateway = self.gateway();
        let namespace = self.namespace.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match gateway
                .update(ResourceKind::Deployment, &namespace, &name, manifest)
                .await
            {
                Ok(_) => AppEvent::MutationSucceeded {
                    message: format!("Scaled '{name}' to {replicas} replicas"),
                },
                Err(source) => AppEvent::MutationFailed(MutationError {
                    op: MutationOp::Update,
                    kind: ResourceKind::Deployment,
                    name,
                    source,
                }),
            };
            let _ = tx.send(event);
        });
    }

    pub fn open_create_prompt(&mut self) {
        self.create_input.clear();
        self.mode = AppMode::CreateInput;
    }

    /// Creates a pod from `"<name> <image>"`.
    pub fn submit_create(&mut self) {
        self.mode = AppMode::List;
        let input = std::mem::take(&mut self.create_input);
        let mut parts = input.split_whitespace();
        let (Some(name), Some(image), None) = (parts.next(), parts.next(), parts.next()) else {
            self.set_error("Expected: <name> <image>".to_string());
            return;
        };
        if !is_valid_k8s_name(name) {
            self.set_error(format!(
                "Invalid pod name '{name}' (RFC 1123: lowercase, digits, hyphens, max 63 chars)"
            ));
            return;
        }

        let name = name.to_string();
        let manifest = actions::pod_manifest(&name, image);
        let gateway = self.gateway();
        let namespace = self.namespace.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match gateway.create(ResourceKind::Pod, &namespace, manifest).await {
                Ok(created) => AppEvent::MutationSucceeded {
                    message: format!("Created pod '{}'", created.name()),
                },
                Err(source) => AppEvent::MutationFailed(MutationError {
                    op: MutationOp::Create,
                    kind: ResourceKind::Pod,
                    name,
                    source,
                }),
            };
            let _ = tx.send(event);
        });
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::MutationSucceeded { message } => {
                info!(%message, "mutation succeeded");
                self.set_success(message);
                self.start_refresh();
            }
            AppEvent::MutationFailed(err) => {
                warn!(error = %err, "mutation failed");
                self.set_error(err.to_string());
            }
            AppEvent::NamespacesLoaded(mut names) => {
                if !names.contains(&self.namespace) {
                    names.push(self.namespace.clone());
                    names.sort();
                }
                self.available_namespaces = names;
                self.update_namespace_filter();
                if self.namespace_input.is_empty()
                    && let Some(idx) = self
                        .filtered_namespaces
                        .iter()
                        .position(|ns| *ns == self.namespace)
                {
                    self.popup_state.select(Some(idx));
                }
            }
            AppEvent::NamespacesFailed(message) => {
                self.set_error(format!("Failed to list namespaces: {message}"));
            }
            AppEvent::LogsLoaded { pod, mut lines } => {
                if self.logs_for.as_deref() != Some(pod.as_str()) {
                    return;
                }
                if lines.len() > self.settings.max_logs {
                    lines.drain(..lines.len() - self.settings.max_logs);
                }
                self.logs = lines;
                self.logs_loading = false;
            }
            AppEvent::LogsFailed { pod, message } => {
                if self.logs_for.as_deref() != Some(pod.as_str()) {
                    return;
                }
                self.logs_loading = false;
                self.set_error(format!("Log error: {message}"));
            }
        }
        self.dirty = true;
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.set_success(format!("Theme: {}", self.theme.name()));
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some(msg);
        self.last_success = None;
        self.message_time = Some(Instant::now());
        self.dirty = true;
    }

    pub fn set_success(&mut self, msg: String) {
        self.last_success = Some(msg);
        self.last_error = None;
        self.message_time = Some(Instant::now());
        self.dirty = true;
    }

    pub fn clear_stale_messages(&mut self) {
        let Some(t) = self.message_time else {
            return;
        };
        let elapsed = t.elapsed();
        if self.last_success.is_some() && elapsed >= self.settings.success_banner {
            self.last_success = None;
            self.dirty = true;
        }
        if self.last_error.is_some() && elapsed >= self.settings.error_banner {
            self.last_error = None;
            self.dirty = true;
        }
        if self.last_success.is_none() && self.last_error.is_none() {
            self.message_time = None;
        }
    }

    #[cfg(test)]
    pub fn new_test() -> (Self, Channels) {
        use crate::k8s::gateway::mock;

        let client = mock::client(|method, path| {
            if method == http::Method::DELETE {
                (
                    200,
                    r#"{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Success"}"#
                        .to_string(),
                )
            } else if method == http::Method::PUT {
                let name = path.rsplit('/').next().unwrap_or_default();
                (
                    200,
                    format!(
                        r#"{{"apiVersion":"apps/v1","kind":"Deployment","metadata":{{"name":"{name}"}}}}"#
                    ),
                )
            } else if path.ends_with("/log") {
                (200, "one\ntwo\nthree\n".to_string())
            } else {
                (200, mock::empty_list("List"))
            }
        });
        Self::new(
            KubeGateway::new(client),
            AppOptions {
                namespace: "default".to_string(),
                context: "test-context".to_string(),
                kinds: ResourceKind::DEFAULT_REFRESH.to_vec(),
                theme: Theme::default(),
                settings: Settings::default(),
                queue_capacity: 0,
            },
        )
    }
}

pub fn is_valid_k8s_name(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && s.starts_with(|c: char| c.is_ascii_alphanumeric())
        && s.ends_with(|c: char| c.is_ascii_alphanumeric())
}
