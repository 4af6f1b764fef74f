use crate::themes::Theme;
use evdash_core::models::FilterState;
use ratatui::text::{Line, Span};

/// Bolt placed either side of the application title.
pub const ACCENT: &str = "⚡";

/// Dashboard header rendering four lines:
///
/// 1. Application title (ALL CAPS) between accents.
/// 2. A 60-column `=` separator.
/// 3. The active filter in `[ make: … | years: a–b ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub filter: &'a FilterState,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(filter: &'a FilterState, theme: &'a Theme) -> Self {
        Self { filter, theme }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let range = self.filter.year_range;

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" EV REGISTRATIONS DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ make: ", self.theme.label),
                Span::styled(self.filter.make_label().to_string(), self.theme.value),
                Span::styled(" | years: ", self.theme.label),
                Span::styled(format!("{}–{}", range.min(), range.max()), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use evdash_core::models::YearRange;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let filter = FilterState::default();
        assert_eq!(Header::new(&filter, &theme).to_lines().len(), 4);
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let filter = FilterState::default();
        let lines = Header::new(&filter, &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("EV REGISTRATIONS DASHBOARD"), "got: {title}");
        assert!(title.starts_with(ACCENT));
    }

    #[test]
    fn test_header_filter_line_all_makes() {
        let theme = Theme::dark();
        let filter = FilterState::default();
        let lines = Header::new(&filter, &theme).to_lines();
        assert_eq!(text(&lines[2]), "[ make: All | years: 2018–2024 ]");
    }

    #[test]
    fn test_header_filter_line_selected_make() {
        let theme = Theme::light();
        let filter = FilterState::new(Some("Tesla".to_string()), YearRange::single(2021));
        let lines = Header::new(&filter, &theme).to_lines();
        assert_eq!(text(&lines[2]), "[ make: Tesla | years: 2021–2021 ]");
        assert_eq!(lines[2].spans.len(), 5);
    }

    #[test]
    fn test_header_separator_and_blank_line() {
        let theme = Theme::classic();
        let filter = FilterState::default();
        let lines = Header::new(&filter, &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
        assert!(text(&lines[3]).is_empty());
    }
}
