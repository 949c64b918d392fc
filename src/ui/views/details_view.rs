use crate::app::{App, Snapshot};
use crate::ui::components::text_pane;
use crate::ui::theme::COLOR_MUTED;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

fn nothing_selected(f: &mut Frame, app: &App, title: &str, area: Rect) {
    let p = Paragraph::new("No resource selected")
        .style(Style::default().fg(COLOR_MUTED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.palette().border())
                .title(format!(" {title} ")),
        );
    f.render_widget(p, area);
}

pub fn draw_details(f: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let Some(res) = snap.selected_resource() else {
        nothing_selected(f, app, "Details", area);
        return;
    };
    let palette = app.theme.palette();
    let lines: Vec<Line> = res
        .details()
        .into_iter()
        .map(|l| match l.split_once(": ") {
            Some((key, value)) if !l.starts_with(' ') => Line::from(vec![
                Span::styled(format!("{key}: "), palette.accent()),
                Span::raw(value.to_string()),
            ]),
            _ => Line::raw(l),
        })
        .collect();
    let title = format!(" {} {} ", res.kind().singular(), res.name());
    f.render_widget(text_pane(lines, title, snap.view.scroll, area, &palette), area);
}

pub fn draw_yaml(f: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let Some(res) = snap.selected_resource() else {
        nothing_selected(f, app, "YAML", area);
        return;
    };
    let palette = app.theme.palette();
    let lines: Vec<Line> = res
        .to_yaml()
        .lines()
        .map(|l| Line::raw(l.to_string()))
        .collect();
    let title = format!(" {} {} (YAML) ", res.kind().singular(), res.name());
    f.render_widget(text_pane(lines, title, snap.view.scroll, area, &palette), area);
}
