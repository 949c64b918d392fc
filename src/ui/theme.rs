use ratatui::style::{Color, Modifier, Style};

pub const COLOR_STATUS_RUNNING: Color = Color::Green;
pub const COLOR_STATUS_PENDING: Color = Color::Yellow;
pub const COLOR_STATUS_ERROR: Color = Color::Red;
pub const COLOR_STATUS_TERMINATING: Color = Color::Magenta;
pub const COLOR_STATUS_SUCCEEDED: Color = Color::Cyan;
pub const COLOR_MUTED: Color = Color::DarkGray;

pub const STYLE_SEARCH_MATCH: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    Default,
    #[default]
    Dark,
    Light,
    Solarized,
    Dracula,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub header: Color,
    pub accent: Color,
    pub selected: Color,
}

impl Theme {
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Dark,
        Self::Light,
        Self::Solarized,
        Self::Dracula,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Solarized => "solarized",
            Self::Dracula => "dracula",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Default => Palette {
                background: Color::Black,
                foreground: Color::White,
                header: Color::Blue,
                accent: Color::Cyan,
                selected: Color::Yellow,
            },
            Self::Dark => Palette {
                background: Color::Reset,
                foreground: Color::White,
                header: Color::Rgb(0x00, 0x00, 0x8b),
                accent: Color::Rgb(0x00, 0x8b, 0x8b),
                selected: Color::Cyan,
            },
            Self::Light => Palette {
                background: Color::White,
                foreground: Color::Black,
                header: Color::Blue,
                accent: Color::Rgb(0x00, 0x8b, 0x8b),
                selected: Color::Red,
            },
            Self::Solarized => Palette {
                background: Color::Rgb(0x00, 0x2b, 0x36),
                foreground: Color::Rgb(0x93, 0xa1, 0xa1),
                header: Color::Rgb(0x07, 0x36, 0x42),
                accent: Color::Rgb(0x2a, 0xa1, 0x98),
                selected: Color::Rgb(0xb5, 0x89, 0x00),
            },
            Self::Dracula => Palette {
                background: Color::Rgb(0x28, 0x2a, 0x36),
                foreground: Color::Rgb(0xf8, 0xf8, 0xf2),
                header: Color::Rgb(0x62, 0x72, 0xa4),
                accent: Color::Rgb(0x50, 0xfa, 0x7b),
                selected: Color::Rgb(0xff, 0x79, 0xc6),
            },
        }
    }
}

impl Palette {
    pub fn normal(&self) -> Style {
        Style::new().fg(self.foreground).bg(self.background)
    }

    pub fn header(&self) -> Style {
        Style::new()
            .fg(Color::White)
            .bg(self.header)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self) -> Style {
        Style::new()
            .fg(Color::Black)
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::new().fg(self.accent)
    }
}

pub fn status_color(status: &str) -> Color {
    match status {
        "Running" | "Active" | "Bound" => COLOR_STATUS_RUNNING,
        "Pending" | "ContainerCreating" => COLOR_STATUS_PENDING,
        "Succeeded" | "Completed" => COLOR_STATUS_SUCCEEDED,
        "Terminating" => COLOR_STATUS_TERMINATING,
        "Failed" | "Error" | "CrashLoopBackOff" | "Unknown" => COLOR_STATUS_ERROR,
        _ => Color::Reset,
    }
}
