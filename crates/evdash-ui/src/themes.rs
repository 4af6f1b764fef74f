use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(|val| val.split(';').next_back())
        .and_then(|bg| bg.parse::<u8>().ok())
        .map_or(BackgroundType::Dark, |bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
}

/// Complete theme definition carrying all styles used by the dashboard
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── KPI cards ────────────────────────────────────────────────────────────
    pub kpi_border: Style,
    pub kpi_title: Style,
    pub kpi_value: Style,

    // ── Charts & map ─────────────────────────────────────────────────────────
    /// Series colours, cycled by chart bars and legends.
    pub palette: [Color; 6],
    pub chart_axis: Style,
    pub chart_line: Style,
    pub map_marker: Color,
    pub map_grid: Color,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Green),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            kpi_border: Style::default().fg(Color::DarkGray),
            kpi_title: Style::default().fg(Color::Gray),
            kpi_value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            palette: [
                Color::Rgb(0x22, 0xc5, 0x5e),
                Color::Rgb(0x38, 0xbd, 0xf8),
                Color::Rgb(0xf5, 0x9e, 0x0b),
                Color::Rgb(0xef, 0x44, 0x44),
                Color::Rgb(0xa8, 0x55, 0xf7),
                Color::Rgb(0x14, 0xb8, 0xa6),
            ],
            chart_axis: Style::default().fg(Color::DarkGray),
            chart_line: Style::default().fg(Color::Rgb(0x22, 0xc5, 0x5e)),
            map_marker: Color::Rgb(0x22, 0xc5, 0x5e),
            map_grid: Color::DarkGray,

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text and saturated accents so that content
    /// remains legible against a white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            kpi_border: Style::default().fg(Color::Gray),
            kpi_title: Style::default().fg(Color::DarkGray),
            kpi_value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            palette: [
                Color::Rgb(0x15, 0x80, 0x3d),
                Color::Rgb(0x03, 0x69, 0xa1),
                Color::Rgb(0xb4, 0x53, 0x09),
                Color::Rgb(0xb9, 0x1c, 0x1c),
                Color::Rgb(0x7e, 0x22, 0xce),
                Color::Rgb(0x0f, 0x76, 0x6e),
            ],
            chart_axis: Style::default().fg(Color::Gray),
            chart_line: Style::default().fg(Color::Rgb(0x15, 0x80, 0x3d)),
            map_marker: Color::Rgb(0xb9, 0x1c, 0x1c),
            map_grid: Color::Gray,

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Classic terminal theme using only the basic ANSI palette.
    ///
    /// Avoids bold modifiers for compatibility with minimal terminal
    /// emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            kpi_border: Style::default().fg(Color::DarkGray),
            kpi_title: Style::default().fg(Color::Gray),
            kpi_value: Style::default().fg(Color::White),

            palette: [
                Color::Green,
                Color::Cyan,
                Color::Yellow,
                Color::Red,
                Color::Magenta,
                Color::Blue,
            ],
            chart_axis: Style::default().fg(Color::DarkGray),
            chart_line: Style::default().fg(Color::Green),
            map_marker: Color::Yellow,
            map_grid: Color::DarkGray,

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Palette colour for the `index`-th series, wrapping after six.
    pub fn series_color(&self, index: usize) -> Color {
        self.palette[index % self.palette.len()]
    }

    /// Style for a year-over-year growth figure.
    ///
    /// * growth > 0  → `success`
    /// * growth < 0  → `error`
    /// * zero or undefined → `dim`
    pub fn growth_style(&self, growth_pct: Option<f64>) -> Style {
        match growth_pct {
            Some(g) if g > 0.0 => self.success,
            Some(g) if g < 0.0 => self.error,
            _ => self.dim,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
