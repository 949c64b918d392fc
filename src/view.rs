use crate::filter::{Filter, FilterFlags, filtered_view};
use crate::models::{Resource, ResourceKind};
use crate::refresh::LoadState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Details,
    Yaml,
    /// Pods only.
    Logs,
    Relationships,
}

impl ViewMode {
    /// List -> Details -> YAML -> (Logs for pods) -> Relationships -> List.
    pub fn next(self, kind: ResourceKind) -> Self {
        match self {
            Self::List => Self::Details,
            Self::Details => Self::Yaml,
            Self::Yaml if kind == ResourceKind::Pod => Self::Logs,
            Self::Yaml | Self::Logs => Self::Relationships,
            Self::Relationships => Self::List,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Details => "Details",
            Self::Yaml => "YAML",
            Self::Logs => "Logs",
            Self::Relationships => "Relationships",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutMode {
    #[default]
    Single,
    /// List on the left, details on the right.
    SplitVertical,
    /// List on top, details below.
    SplitHorizontal,
}

impl LayoutMode {
    pub fn toggle_split(self) -> Self {
        match self {
            Self::Single => Self::SplitVertical,
            Self::SplitVertical | Self::SplitHorizontal => Self::Single,
        }
    }

    pub fn switch_orientation(self) -> Self {
        match self {
            Self::Single => Self::Single,
            Self::SplitVertical => Self::SplitHorizontal,
            Self::SplitHorizontal => Self::SplitVertical,
        }
    }
}

/// The foreground-owned half of the view state: what is shown and where the
/// cursor is. Collections live in [`LoadState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    kind: ResourceKind,
    selected: usize,
    filter_text: String,
    flags: FilterFlags,
    mode: ViewMode,
    pub layout: LayoutMode,
    /// First visible line of the details/YAML/logs/relationships pane.
    pub scroll: u16,
}

impl ViewState {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            selected: 0,
            filter_text: String::new(),
            flags: FilterFlags::default(),
            mode: ViewMode::List,
            layout: LayoutMode::Single,
            scroll: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn flags(&self) -> FilterFlags {
        self.flags
    }

    /// The filter compiled against the current kind's columns.
    pub fn filter(&self) -> Filter {
        Filter::parse(&self.filter_text, self.flags, self.kind.headers())
    }

    /// Derived on every call, never cached across kind switches.
    pub fn filtered(&self, load: &LoadState) -> Vec<Resource> {
        filtered_view(load.items(self.kind), &self.filter())
    }

    pub fn selected_resource(&self, load: &LoadState) -> Option<Resource> {
        self.filtered(load).into_iter().nth(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize, load: &LoadState) {
        let len = self.filtered(load).len();
        if len == 0 {
            return;
        }
        let target = self.selected.saturating_add_signed(delta);
        self.selected = target.min(len - 1);
        self.scroll = 0;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll = 0;
    }

    pub fn select_last(&mut self, load: &LoadState) {
        self.selected = self.filtered(load).len().saturating_sub(1);
        self.scroll = 0;
    }

    pub fn switch_kind(&mut self, kind: ResourceKind) {
        self.kind = kind;
        self.selected = 0;
        self.scroll = 0;
        if self.mode == ViewMode::Logs && kind != ResourceKind::Pod {
            self.mode = ViewMode::List;
        }
    }

    pub fn set_filter(&mut self, text: impl Into<String>, flags: FilterFlags) {
        self.filter_text = text.into();
        self.flags = flags;
        self.selected = 0;
        self.scroll = 0;
    }

    /// Pulls the selection back inside the filtered view after the
    /// collections changed underneath it.
    pub fn clamp(&mut self, load: &LoadState) {
        let len = self.filtered(load).len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn cycle_mode(&mut self) {
        self.set_mode(self.mode.next(self.kind));
    }

    pub fn enter_details(&mut self) -> bool {
        self.transition(ViewMode::List, ViewMode::Details)
    }

    pub fn show_yaml(&mut self) -> bool {
        self.transition(ViewMode::Details, ViewMode::Yaml)
    }

    pub fn show_logs(&mut self) -> bool {
        self.kind == ResourceKind::Pod && self.transition(ViewMode::Details, ViewMode::Logs)
    }

    pub fn back(&mut self) -> bool {
        self.transition_from_any(ViewMode::List)
    }

    fn transition(&mut self, from: ViewMode, to: ViewMode) -> bool {
        if self.mode != from {
            return false;
        }
        self.set_mode(to);
        true
    }

    fn transition_from_any(&mut self, to: ViewMode) -> bool {
        if self.mode == to {
            return false;
        }
        self.set_mode(to);
        true
    }

    fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.scroll = 0;
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }
}
