use crate::app::{App, Snapshot};
use crate::ui::components::text_pane;
use crate::ui::theme::*;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
};

/// Marks ASCII case-insensitive occurrences of the filter text.
fn highlight_line<'a>(text: &'a str, needle_lower: &str) -> Line<'a> {
    if needle_lower.is_empty() {
        return Line::raw(text);
    }
    let needle_len = needle_lower.len();
    let text_bytes = text.as_bytes();
    let needle_bytes = needle_lower.as_bytes();
    let mut spans = Vec::with_capacity(4);
    let mut start = 0;
    while start + needle_len <= text_bytes.len() {
        if let Some(pos) = text_bytes[start..]
            .windows(needle_len)
            .position(|w| w.eq_ignore_ascii_case(needle_bytes))
        {
            let abs = start + pos;
            if abs > start {
                spans.push(Span::raw(&text[start..abs]));
            }
            spans.push(Span::styled(
                &text[abs..abs + needle_len],
                STYLE_SEARCH_MATCH,
            ));
            start = abs + needle_len;
        } else {
            break;
        }
    }
    if start < text.len() {
        spans.push(Span::raw(&text[start..]));
    }
    if spans.is_empty() {
        Line::raw(text)
    } else {
        Line::from(spans)
    }
}

pub fn draw(f: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let palette = app.theme.palette();
    let pod = app.logs_for.as_deref().unwrap_or("-");
    let needle = snap.view.filter_text().to_ascii_lowercase();

    let lines: Vec<Line> = if app.logs.is_empty() && !app.logs_loading {
        vec![Line::raw("No log lines")]
    } else {
        app.logs
            .iter()
            .map(|l| highlight_line(l, &needle))
            .collect()
    };

    let status = if app.logs_loading { " [Loading...]" } else { "" };
    let title = format!(" Logs {} [{} lines]{} ", pod, app.logs.len(), status);
    f.render_widget(text_pane(lines, title, snap.view.scroll, area, &palette), area);
}
