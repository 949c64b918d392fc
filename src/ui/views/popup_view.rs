use crate::app::App;
use crate::models::AppMode;
use crate::ui::components::{centered_fixed_rect, centered_rect};
use crate::ui::theme::Palette;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

const HELP: &[(&str, &str)] = &[
    ("Tab / S-Tab, 1-5", "Switch resource kind"),
    ("j/k, Up/Down", "Move selection or scroll"),
    ("g / G, PgUp/PgDn", "First / last / page"),
    ("Enter", "Details"),
    ("v", "Cycle view: details, YAML, logs, relationships"),
    ("y / l", "YAML / logs from details"),
    ("Esc, Backspace", "Back to list, clear filter"),
    ("/", "Filter by name"),
    ("i ! a R", "Case, inverse, advanced (col=value), regex"),
    ("r, F5", "Refresh now"),
    ("n", "Switch namespace"),
    ("c", "Create pod (<name> <image>)"),
    ("d, Delete", "Delete selected"),
    ("x", "Scale deployment"),
    ("s / S", "Split view / orientation"),
    ("t", "Cycle theme"),
    ("q, Ctrl-c", "Quit"),
];

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.mode {
        AppMode::NamespaceSelect => draw_namespace_popup(f, app),
        AppMode::CreateInput => {
            let text = format!("{}_", app.create_input);
            draw_prompt(f, &app.theme.palette(), "Create Pod: <name> <image>", &text);
        }
        AppMode::ScaleInput => {
            let text = format!("Replicas: {}_", app.scale_input);
            draw_prompt(f, &app.theme.palette(), "Scale Deployment", &text);
        }
        AppMode::Confirm => draw_confirm(f, app),
        AppMode::Help => draw_help(f, &app.theme.palette()),
        AppMode::List | AppMode::FilterInput => {}
    }
}

fn popup_block(title: &str, palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(format!(" {title} "))
        .style(palette.normal())
}

fn draw_namespace_popup(f: &mut Frame, app: &mut App) {
    let palette = app.theme.palette();
    let area = centered_rect(50, 50, f.area());
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = app
        .filtered_namespaces
        .iter()
        .map(|ns| {
            let label = if *ns == app.namespace {
                format!("{ns} (current)")
            } else {
                ns.clone()
            };
            ListItem::new(Span::raw(label))
        })
        .collect();

    let (list_area, list_title) = if app.namespace_typing {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let input = Paragraph::new(format!("{}_", app.namespace_input))
            .block(popup_block("Type namespace", &palette));
        f.render_widget(input, chunks[0]);
        (chunks[1], "Matches")
    } else {
        (area, "Select Namespace")
    };

    let list = List::new(items)
        .block(popup_block(list_title, &palette))
        .highlight_style(palette.highlight())
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, list_area, &mut app.popup_state);
}

fn draw_prompt(f: &mut Frame, palette: &Palette, title: &str, text: &str) {
    let area = centered_fixed_rect(50, 3, f.area());
    f.render_widget(Clear, area);
    let p = Paragraph::new(text.to_string()).block(popup_block(title, palette));
    f.render_widget(p, area);
}

fn draw_confirm(f: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    let area = centered_fixed_rect(50, 7, f.area());
    f.render_widget(Clear, area);

    let msg = app
        .pending_action
        .as_ref()
        .map(|a| a.message())
        .unwrap_or_else(|| "Confirm action?".to_string());
    let mut lines: Vec<Line> = msg.lines().map(|l| Line::raw(l.to_string())).collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled("[y] Yes  [n] No", palette.accent()));
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(popup_block("Confirm", &palette));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame, palette: &Palette) {
    let height = u16::try_from(HELP.len()).unwrap_or(u16::MAX).saturating_add(4);
    let area = centered_fixed_rect(70, height, f.area());
    f.render_widget(Clear, area);
    let mut lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:<20}"), palette.accent()),
                Span::raw(*action),
            ])
        })
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::raw("Press any key to close"));
    f.render_widget(Paragraph::new(lines).block(popup_block("Help", palette)), area);
}
