use crate::app::{App, is_valid_k8s_name};
use crate::models::{AppMode, ResourceKind};
use crate::view::ViewMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    match app.mode {
        AppMode::FilterInput => handle_filter_input(app, key),
        AppMode::NamespaceSelect => handle_namespace_input(app, key),
        AppMode::CreateInput => handle_create_input(app, key),
        AppMode::ScaleInput => handle_scale_input(app, key),
        AppMode::Confirm => handle_confirm_input(app, key),
        AppMode::Help => app.mode = AppMode::List,
        AppMode::List if app.view.mode() == ViewMode::List => handle_global_input(app, key),
        AppMode::List => handle_pane_input(app, key),
    }
}

fn page_size() -> isize {
    crossterm::terminal::size()
        .map(|(_, h)| (h as isize).saturating_sub(8).max(1))
        .unwrap_or(20)
}

fn select_namespace(app: &mut App, ns: String) {
    app.namespace_input.clear();
    app.namespace_typing = false;
    app.mode = AppMode::List;
    app.change_namespace(ns);
}

fn popup_up(app: &mut App) {
    let i = app
        .popup_state
        .selected()
        .map(|i| i.saturating_sub(1))
        .unwrap_or(0);
    app.popup_state.select(Some(i));
}

fn popup_down(app: &mut App) {
    let len = app.filtered_namespaces.len();
    if len > 0 {
        let i = app
            .popup_state
            .selected()
            .map(|i| (i + 1).min(len - 1))
            .unwrap_or(0);
        app.popup_state.select(Some(i));
    }
}

fn handle_namespace_input(app: &mut App, key: KeyEvent) {
    if app.namespace_typing {
        match key.code {
            KeyCode::Esc => {
                app.namespace_input.clear();
                app.namespace_typing = false;
                app.update_namespace_filter();
            }
            KeyCode::Enter => {
                let ns = app
                    .popup_state
                    .selected()
                    .and_then(|i| app.filtered_namespaces.get(i).cloned())
                    .unwrap_or_else(|| app.namespace_input.trim().to_string());
                if is_valid_k8s_name(&ns) {
                    select_namespace(app, ns);
                } else {
                    app.set_error("Invalid namespace name (RFC 1123: lowercase, digits, hyphens, max 63 chars)".to_string());
                }
            }
            KeyCode::Up => popup_up(app),
            KeyCode::Down => popup_down(app),
            KeyCode::Backspace => {
                app.namespace_input.pop();
                app.update_namespace_filter();
            }
            KeyCode::Char(c) => {
                app.namespace_input.push(c);
                app.update_namespace_filter();
            }
            _ => {}
        }
    } else {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                app.namespace_input.clear();
                app.mode = AppMode::List;
            }
            KeyCode::Char('/') => {
                app.namespace_typing = true;
                app.namespace_input.clear();
            }
            KeyCode::Enter => {
                if let Some(ns) = app
                    .popup_state
                    .selected()
                    .and_then(|i| app.filtered_namespaces.get(i).cloned())
                {
                    select_namespace(app, ns);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => popup_up(app),
            KeyCode::Down | KeyCode::Char('j') => popup_down(app),
            _ => {}
        }
    }
}

fn handle_global_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.next_kind(),
        KeyCode::BackTab => app.prev_kind(),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(kind) = app.kinds().get(idx).copied() {
                app.switch_kind(kind);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::PageDown => app.move_selection(page_size()),
        KeyCode::PageUp => app.move_selection(-page_size()),
        KeyCode::Enter => app.enter_details(),
        KeyCode::Char('v') => app.cycle_view_mode(),
        KeyCode::Char('/') => {
            app.filter_input = app.view.filter_text().to_string();
            app.mode = AppMode::FilterInput;
        }
        KeyCode::Char('i') => app.toggle_filter_flag(|f| f.case_sensitive = !f.case_sensitive),
        KeyCode::Char('!') => app.toggle_filter_flag(|f| f.inverse = !f.inverse),
        KeyCode::Char('a') => app.toggle_filter_flag(|f| f.advanced = !f.advanced),
        KeyCode::Char('R') => app.toggle_filter_flag(|f| f.regex = !f.regex),
        KeyCode::Char('f') | KeyCode::Esc => app.clear_filter(),
        KeyCode::Char('r') | KeyCode::F(5) => {
            app.start_refresh();
        }
        KeyCode::Char('n') => app.open_namespace_popup(),
        KeyCode::Char('c') => {
            if app.kinds().contains(&ResourceKind::Pod) {
                app.open_create_prompt();
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('x') => app.request_scale(),
        KeyCode::Char('s') => app.view.layout = app.view.layout.toggle_split(),
        KeyCode::Char('S') => app.view.layout = app.view.layout.switch_orientation(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('?') | KeyCode::Char('h') => app.mode = AppMode::Help,
        _ => {}
    }
}

/// Keys while a details, YAML, logs or relationships pane fills the screen.
fn handle_pane_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            app.view.back();
        }
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.view.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.view.scroll_by(-1),
        KeyCode::PageDown => app.view.scroll_by(page_size() as i32),
        KeyCode::PageUp => app.view.scroll_by(-(page_size() as i32)),
        KeyCode::Char('g') | KeyCode::Home => app.view.scroll = 0,
        KeyCode::Char('v') => app.cycle_view_mode(),
        KeyCode::Char('y') => {
            app.view.show_yaml();
        }
        KeyCode::Char('l') => app.show_logs(),
        KeyCode::Char('r') | KeyCode::F(5) => {
            if app.view.mode() == ViewMode::Logs {
                app.request_logs();
            } else {
                app.start_refresh();
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('?') => app.mode = AppMode::Help,
        _ => {}
    }
}

fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_filter();
            app.mode = AppMode::List;
        }
        KeyCode::Enter => {
            app.mode = AppMode::List;
        }
        KeyCode::Backspace => {
            app.filter_input.pop();
            let flags = app.view.flags();
            app.set_filter(app.filter_input.clone(), flags);
        }
        KeyCode::Char(c) => {
            app.filter_input.push(c);
            let flags = app.view.flags();
            app.set_filter(app.filter_input.clone(), flags);
        }
        _ => {}
    }
}

fn handle_create_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.create_input.clear();
            app.mode = AppMode::List;
        }
        KeyCode::Enter => app.submit_create(),
        KeyCode::Backspace => {
            app.create_input.pop();
        }
        KeyCode::Char(c) => app.create_input.push(c),
        _ => {}
    }
}

fn handle_scale_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.mode = AppMode::List;
        }
        KeyCode::Enter => {
            if app.scale_input.is_empty() {
                app.set_error("Enter a replica count".to_string());
                return;
            }
            app.submit_scale();
        }
        KeyCode::Backspace => {
            app.scale_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            app.scale_input.push(c);
        }
        _ => {}
    }
}

fn handle_confirm_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_pending(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::models::fixtures::{deployment, pods};
    use crate::models::{PendingAction, ResourceCollection};
    use crate::refresh::LoadState;
    use crate::view::LayoutMode;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn key_with_mod(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_input(app, key(KeyCode::Char(c)));
        }
    }

    fn app_with_pods(names: &[&str]) -> App {
        let (mut app, _ch) = App::new_test();
        let mut state = LoadState::default();
        state.collections.insert(
            ResourceKind::Pod,
            ResourceCollection::new(ResourceKind::Pod, "default", pods(names)),
        );
        state.collections.insert(
            ResourceKind::Deployment,
            ResourceCollection::new(ResourceKind::Deployment, "default", vec![deployment("web")]),
        );
        app.apply_load_state(Arc::new(state));
        app
    }

    #[tokio::test]
    async fn j_and_k_move_and_clamp() {
        let mut app = app_with_pods(&["a", "b", "c"]);
        handle_input(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.view.selected(), 1);
        handle_input(&mut app, key(KeyCode::Down));
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.view.selected(), 2);
        handle_input(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.view.selected(), 1);
        handle_input(&mut app, key(KeyCode::Char('g')));
        assert_eq!(app.view.selected(), 0);
        handle_input(&mut app, key(KeyCode::Char('G')));
        assert_eq!(app.view.selected(), 2);
    }

    #[tokio::test]
    async fn nav_on_empty_list_does_nothing() {
        let (mut app, _ch) = App::new_test();
        handle_input(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.view.selected(), 0);
    }

    #[tokio::test]
    async fn tab_and_number_keys_switch_kind() {
        let mut app = app_with_pods(&["a", "b"]);
        app.move_selection(1);
        handle_input(&mut app, key(KeyCode::Tab));
        assert_eq!(app.view.kind(), ResourceKind::Deployment);
        assert_eq!(app.view.selected(), 0);
        handle_input(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.view.kind(), ResourceKind::ConfigMap);
        handle_input(&mut app, key(KeyCode::Char('5')));
        assert_eq!(app.view.kind(), ResourceKind::ConfigMap);
        handle_input(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.view.kind(), ResourceKind::Service);
    }

    #[tokio::test]
    async fn q_and_ctrl_c_quit() {
        let (mut app, _ch) = App::new_test();
        handle_input(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _ch) = App::new_test();
        app.mode = AppMode::FilterInput;
        handle_input(&mut app, key_with_mod(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn typing_filter_updates_live() {
        let mut app = app_with_pods(&["nginx-pod", "redis-pod"]);
        handle_input(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.mode, AppMode::FilterInput);
        type_str(&mut app, "nginx");
        assert_eq!(app.snapshot().filtered.len(), 1);
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, AppMode::List);
        assert_eq!(app.view.filter_text(), "nginx");

        handle_input(&mut app, key(KeyCode::Char('!')));
        assert_eq!(app.snapshot().filtered[0].name(), "redis-pod");

        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.view.filter_text(), "");
        assert_eq!(app.snapshot().filtered.len(), 2);
    }

    #[tokio::test]
    async fn esc_in_filter_mode_clears() {
        let mut app = app_with_pods(&["nginx-pod", "redis-pod"]);
        handle_input(&mut app, key(KeyCode::Char('/')));
        type_str(&mut app, "zzz");
        assert!(app.snapshot().filtered.is_empty());
        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.snapshot().filtered.len(), 2);
        assert!(app.filter_input.is_empty());
    }

    #[tokio::test]
    async fn view_mode_keys() {
        let mut app = app_with_pods(&["a"]);
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.view.mode(), ViewMode::Details);
        handle_input(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.view.mode(), ViewMode::Yaml);
        handle_input(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.view.scroll, 1);
        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.view.mode(), ViewMode::List);
        assert_eq!(app.view.scroll, 0);
    }

    #[tokio::test]
    async fn enter_on_empty_list_stays_in_list() {
        let (mut app, _ch) = App::new_test();
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.view.mode(), ViewMode::List);
    }

    #[tokio::test]
    async fn v_cycles_through_modes() {
        let mut app = app_with_pods(&["a"]);
        app.settings.enable_logs = false;
        for expected in [
            ViewMode::Details,
            ViewMode::Yaml,
            ViewMode::Logs,
            ViewMode::Relationships,
            ViewMode::List,
        ] {
            handle_input(&mut app, key(KeyCode::Char('v')));
            assert_eq!(app.view.mode(), expected);
        }
    }

    #[tokio::test]
    async fn delete_key_opens_confirm_and_n_cancels() {
        let mut app = app_with_pods(&["a", "b"]);
        handle_input(&mut app, key(KeyCode::Char('j')));
        handle_input(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.mode, AppMode::Confirm);
        assert_eq!(
            app.pending_action,
            Some(PendingAction::Delete {
                kind: ResourceKind::Pod,
                name: "b".into()
            })
        );
        handle_input(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.mode, AppMode::List);
        assert!(app.pending_action.is_none());
    }

    #[tokio::test]
    async fn scale_input_accepts_digits_only() {
        let mut app = app_with_pods(&[]);
        handle_input(&mut app, key(KeyCode::Tab));
        handle_input(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.mode, AppMode::ScaleInput);
        type_str(&mut app, "1a2");
        assert_eq!(app.scale_input, "12");
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, AppMode::Confirm);
        assert!(app.pending_action.as_ref().unwrap().message().contains("12 replicas"));
    }

    #[tokio::test]
    async fn layout_keys() {
        let (mut app, _ch) = App::new_test();
        handle_input(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.view.layout, LayoutMode::SplitVertical);
        handle_input(&mut app, key(KeyCode::Char('S')));
        assert_eq!(app.view.layout, LayoutMode::SplitHorizontal);
        handle_input(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.view.layout, LayoutMode::Single);
    }

    #[tokio::test]
    async fn help_closes_on_any_key() {
        let (mut app, _ch) = App::new_test();
        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.mode, AppMode::Help);
        handle_input(&mut app, key(KeyCode::Char('z')));
        assert_eq!(app.mode, AppMode::List);
    }

    #[tokio::test]
    async fn namespace_popup_typing_filters_and_selects() {
        let (mut app, _ch) = App::new_test();
        app.available_namespaces = vec!["default".into(), "kube-system".into(), "shop".into()];
        handle_input(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.mode, AppMode::NamespaceSelect);
        handle_input(&mut app, key(KeyCode::Char('/')));
        type_str(&mut app, "sho");
        assert_eq!(app.filtered_namespaces, vec!["shop"]);
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, AppMode::List);
        assert_eq!(app.namespace, "shop");
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn create_prompt_collects_text() {
        let (mut app, _ch) = App::new_test();
        handle_input(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.mode, AppMode::CreateInput);
        type_str(&mut app, "web nginx");
        assert_eq!(app.create_input, "web nginx");
        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, AppMode::List);
        assert!(app.create_input.is_empty());
    }
}
