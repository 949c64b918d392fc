use crate::app::{App, Snapshot};
use crate::ui::theme::{COLOR_MUTED, status_color};
use crate::utils::truncate;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table},
};

const NAME_WIDTH: usize = 60;

fn widths(columns: usize) -> Vec<Constraint> {
    let mut widths = Vec::with_capacity(columns);
    widths.push(Constraint::Fill(2));
    widths.extend(std::iter::repeat_n(Constraint::Fill(1), columns.saturating_sub(1)));
    widths
}

pub fn draw(f: &mut Frame, app: &mut App, snap: &Snapshot, area: Rect) {
    let palette = app.theme.palette();
    let kind = snap.view.kind();
    let headers = kind.headers();
    let status_col = headers.iter().position(|h| *h == "Status");

    let header = Row::new(
        headers
            .iter()
            .map(|h| Cell::from(*h).style(palette.accent())),
    )
    .style(palette.normal())
    .height(1)
    .bottom_margin(1);

    let rows: Vec<Row> = snap
        .filtered
        .iter()
        .map(|res| {
            let cells = res.columns().into_iter().enumerate().map(|(i, value)| {
                if i == 0 {
                    Cell::from(truncate(&value, NAME_WIDTH))
                } else if Some(i) == status_col {
                    let color = status_color(&value);
                    Cell::from(value).style(Style::default().fg(color))
                } else {
                    Cell::from(value)
                }
            });
            Row::new(cells).height(1)
        })
        .collect();

    let title = table_title(snap);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(title);

    if snap.filtered.is_empty() {
        let msg = empty_message(app, snap);
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(COLOR_MUTED))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    app.table_state.select(Some(snap.view.selected()));
    let table = Table::new(rows, widths(headers.len()))
        .header(header)
        .block(block)
        .style(palette.normal())
        .row_highlight_style(palette.highlight())
        .highlight_symbol("> ")
        .highlight_spacing(HighlightSpacing::Always);
    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn table_title(snap: &Snapshot) -> String {
    let kind = snap.view.kind();
    let total = snap.total();
    if snap.filtered.len() == total {
        format!(" {} ({}) ", kind.title(), total)
    } else {
        format!(" {} ({}/{}) ", kind.title(), snap.filtered.len(), total)
    }
}

fn empty_message(app: &App, snap: &Snapshot) -> String {
    let kind = snap.view.kind();
    if let Some(err) = snap.load.error(kind) {
        return format!("Could not load {}: {}", kind.title().to_lowercase(), err);
    }
    let loaded = snap
        .load
        .collections
        .get(&kind)
        .filter(|col| !col.is_empty());
    if loaded.is_none() && app.is_loading() {
        return format!("Loading {}...", kind.title().to_lowercase());
    }
    if loaded.is_none() {
        format!(
            "No {} in namespace {}",
            kind.title().to_lowercase(),
            snap.load.namespace
        )
    } else {
        format!("No {} match the filter", kind.title().to_lowercase())
    }
}
