pub mod components;
pub mod theme;
pub mod views;

use crate::app::{App, Snapshot};
use crate::models::AppMode;
use crate::ui::theme::{COLOR_STATUS_ERROR, COLOR_STATUS_RUNNING, Palette};
use crate::ui::views::*;
use crate::view::{LayoutMode, ViewMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Tabs},
};

const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

pub fn draw(f: &mut Frame, app: &mut App) {
    let snap = app.snapshot();
    let palette = app.theme.palette();
    f.render_widget(Block::default().style(palette.normal()), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tabs + info
            Constraint::Min(0),    // Main
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, &snap, &palette, chunks[0]);
    draw_main(f, app, &snap, chunks[1]);
    draw_footer(f, app, &palette, chunks[2]);
    popup_view::draw(f, app);
}

fn draw_header(f: &mut Frame, app: &App, snap: &Snapshot, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let titles: Vec<Line> = app
        .kinds()
        .iter()
        .enumerate()
        .map(|(i, k)| Line::raw(format!("{} {}", i + 1, k.title())))
        .collect();
    let selected = app
        .kinds()
        .iter()
        .position(|k| *k == snap.view.kind())
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .style(palette.header())
        .highlight_style(palette.highlight())
        .select(selected);
    f.render_widget(tabs, chunks[0]);

    f.render_widget(Paragraph::new(info_line(app, snap, palette)), chunks[1]);
}

fn flag_labels(snap: &Snapshot) -> String {
    let flags = snap.view.flags();
    [
        (flags.case_sensitive, "case"),
        (flags.inverse, "inverse"),
        (flags.advanced, "advanced"),
        (flags.regex, "regex"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, label)| *label)
    .collect::<Vec<_>>()
    .join(",")
}

fn spinner_frame() -> char {
    let millis = chrono::Local::now().timestamp_subsec_millis() as usize;
    SPINNER[(millis / 250) % SPINNER.len()]
}

fn info_line<'a>(app: &App, snap: &Snapshot, palette: &Palette) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!(
            " Ctx: {} | NS: {} | {}: {}/{}",
            app.context,
            app.namespace,
            snap.view.kind().title(),
            snap.filtered.len(),
            snap.total()
        ),
        palette.normal(),
    )];

    let cursor = if app.mode == AppMode::FilterInput { "_" } else { "" };
    if !snap.view.filter_text().is_empty() || app.mode == AppMode::FilterInput {
        spans.push(Span::styled(
            format!(" | Filter: {}{}", snap.view.filter_text(), cursor),
            palette.accent(),
        ));
    }
    let flags = flag_labels(snap);
    if !flags.is_empty() {
        spans.push(Span::styled(format!(" [{flags}]"), palette.accent()));
    }
    if snap.view.mode() != ViewMode::List {
        spans.push(Span::raw(format!(" | {}", snap.view.mode().title())));
    }

    if app.is_loading() {
        spans.push(Span::styled(
            format!(" | {} Loading", spinner_frame()),
            Style::default().fg(COLOR_STATUS_RUNNING),
        ));
    } else if let Some(at) = snap.load.completed_at {
        spans.push(Span::raw(format!(" | Refreshed {}", at.format("%H:%M:%S"))));
    }

    if !snap.load.errors.is_empty() {
        let failed: Vec<String> = snap
            .load
            .errors
            .keys()
            .map(|k| k.title().to_lowercase())
            .collect();
        spans.push(Span::styled(
            format!(" | Failed: {}", failed.join(", ")),
            Style::default().fg(COLOR_STATUS_ERROR),
        ));
    }
    Line::from(spans)
}

fn draw_pane(f: &mut Frame, app: &App, snap: &Snapshot, mode: ViewMode, area: Rect) {
    match mode {
        ViewMode::List | ViewMode::Details => details_view::draw_details(f, app, snap, area),
        ViewMode::Yaml => details_view::draw_yaml(f, app, snap, area),
        ViewMode::Logs => logs_view::draw(f, app, snap, area),
        ViewMode::Relationships => relations_view::draw(f, app, snap, area),
    }
}

fn draw_main(f: &mut Frame, app: &mut App, snap: &Snapshot, area: Rect) {
    let layout = app.view.layout;
    let direction = match layout {
        LayoutMode::Single => {
            match snap.view.mode() {
                ViewMode::List => resource_table::draw(f, app, snap, area),
                mode => draw_pane(f, app, snap, mode, area),
            }
            return;
        }
        LayoutMode::SplitVertical => Direction::Horizontal,
        LayoutMode::SplitHorizontal => Direction::Vertical,
    };
    let chunks = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    resource_table::draw(f, app, snap, chunks[0]);
    draw_pane(f, app, snap, snap.view.mode(), chunks[1]);
}

fn draw_footer(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    if let Some(err) = &app.last_error {
        let p = Paragraph::new(format!(" ERROR: {}", err))
            .style(Style::default().fg(COLOR_STATUS_ERROR));
        f.render_widget(p, area);
        return;
    }
    if let Some(msg) = &app.last_success {
        let p = Paragraph::new(format!(" OK: {}", msg))
            .style(Style::default().fg(COLOR_STATUS_RUNNING));
        f.render_widget(p, area);
        return;
    }
    let help = match app.mode {
        AppMode::List => match app.view.mode() {
            ViewMode::List => {
                "q:Quit Tab:Kind j/k:Nav Enter:Details v:View /:Filter n:NS r:Refresh c:Create d:Delete x:Scale s:Split ?:Help"
            }
            ViewMode::Details => "j/k:Scroll v:Next view y:YAML l:Logs Esc:Back d:Delete",
            ViewMode::Logs => "j/k:Scroll r:Reload v:Next view Esc:Back",
            ViewMode::Yaml | ViewMode::Relationships => "j/k:Scroll v:Next view Esc:Back",
        },
        AppMode::FilterInput => "Type to filter | Enter:Keep | Esc:Clear",
        AppMode::NamespaceSelect => {
            if app.namespace_typing {
                "Type namespace | Up/Down:Nav | Enter:Select | Esc:Back"
            } else {
                "j/k:Nav | /:Search | Enter:Select | Esc:Cancel"
            }
        }
        AppMode::CreateInput => "<name> <image> | Enter:Create | Esc:Cancel",
        AppMode::ScaleInput => "Enter replica count | Enter:Confirm | Esc:Cancel",
        AppMode::Confirm => "y:Confirm | n/Esc:Cancel",
        AppMode::Help => "Any key:Close",
    };
    f.render_widget(Paragraph::new(help).style(palette.normal()), area);
}
