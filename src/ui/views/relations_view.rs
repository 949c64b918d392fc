use crate::app::{App, Snapshot};
use crate::relations::Relationship;
use crate::ui::components::text_pane;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
};

/// Edges touching the selected resource, or every edge when nothing is
/// selected.
pub fn visible(all: Vec<Relationship>, snap: &Snapshot) -> Vec<Relationship> {
    match snap.selected_resource() {
        Some(res) => all
            .into_iter()
            .filter(|r| r.involves(res.kind(), res.name()))
            .collect(),
        None => all,
    }
}

pub fn draw(f: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let palette = app.theme.palette();
    let edges = visible(app.relationships(), snap);

    let title = match snap.selected_resource() {
        Some(res) => format!(" Relationships of {} {} ", res.kind().singular(), res.name()),
        None => " Relationships ".to_string(),
    };

    let lines: Vec<Line> = if edges.is_empty() {
        vec![Line::raw("No relationships found among loaded resources")]
    } else {
        edges
            .iter()
            .map(|r| {
                Line::from(vec![
                    Span::raw(format!("{}/{}", r.from.kind.singular(), r.from.name)),
                    Span::styled(format!("  {}  ", r.relation), palette.accent()),
                    Span::styled(
                        format!("{}/{}", r.to.kind.singular(), r.to.name),
                        Style::default().fg(palette.selected),
                    ),
                ])
            })
            .collect()
    };
    f.render_widget(text_pane(lines, title, snap.view.scroll, area, &palette), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{deployment, labelled_pod, service};
    use crate::models::{Resource, ResourceCollection, ResourceKind};
    use crate::refresh::LoadState;
    use std::sync::Arc;

    #[tokio::test]
    async fn selection_narrows_edges() {
        let (mut app, _ch) = App::new_test();
        let mut state = LoadState::default();
        let pods = vec![
            Resource::Pod(Arc::new(labelled_pod("web-1", &[("app", "web")]))),
            Resource::Pod(Arc::new(labelled_pod("db-1", &[("app", "db")]))),
        ];
        state.collections.insert(
            ResourceKind::Pod,
            ResourceCollection::new(ResourceKind::Pod, "default", pods),
        );
        state.collections.insert(
            ResourceKind::Service,
            ResourceCollection::new(
                ResourceKind::Service,
                "default",
                vec![service("web-svc", &[("app", "web")])],
            ),
        );
        state.collections.insert(
            ResourceKind::Deployment,
            ResourceCollection::new(ResourceKind::Deployment, "default", vec![deployment("web")]),
        );
        app.apply_load_state(Arc::new(state));

        let all = app.relationships();
        assert_eq!(all.len(), 2);

        let shown = visible(all.clone(), &app.snapshot());
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|r| r.involves(ResourceKind::Pod, "web-1")));

        app.move_selection(1);
        assert!(visible(all, &app.snapshot()).is_empty());
    }
}
