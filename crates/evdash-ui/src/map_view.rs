//! Registration hotspot map.
//!
//! Plots every geo point whose coordinates lie on the globe on a braille
//! canvas over a world outline, zoomed to the extent of the data.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use evdash_core::formatting::format_count;
use evdash_core::models::GeoPoint;

use crate::themes::Theme;

/// Degrees of margin added around the data extent.
const MARGIN_DEG: f64 = 2.0;

/// Coordinates to plot, as `(longitude, latitude)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPoints {
    pub coords: Vec<(f64, f64)>,
    /// Points skipped because a coordinate is missing, not finite or off
    /// the globe.
    pub missing: usize,
}

/// `true` for a longitude/latitude pair inside ±180° / ±90°.
pub fn on_globe(lon: f64, lat: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
}

/// Split points into plottable coordinates and a count of the rest.
pub fn plottable_points(points: &[GeoPoint]) -> MapPoints {
    let mut map_points = MapPoints::default();
    for point in points {
        match (point.longitude, point.latitude) {
            (Some(lon), Some(lat)) if on_globe(lon, lat) => map_points.coords.push((lon, lat)),
            _ => map_points.missing += 1,
        }
    }
    map_points
}

/// Longitude and latitude bounds covering `coords` with a margin, clamped to
/// the globe.  The whole world is shown when there is nothing to plot.
pub fn map_bounds(coords: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let world = ([-180.0, 180.0], [-90.0, 90.0]);
    let Some(&(lon0, lat0)) = coords.first() else {
        return world;
    };

    let (mut lon_min, mut lon_max, mut lat_min, mut lat_max) = (lon0, lon0, lat0, lat0);
    for &(lon, lat) in coords {
        lon_min = lon_min.min(lon);
        lon_max = lon_max.max(lon);
        lat_min = lat_min.min(lat);
        lat_max = lat_max.max(lat);
    }

    (
        [
            (lon_min - MARGIN_DEG).max(world.0[0]),
            (lon_max + MARGIN_DEG).min(world.0[1]),
        ],
        [
            (lat_min - MARGIN_DEG).max(world.1[0]),
            (lat_max + MARGIN_DEG).min(world.1[1]),
        ],
    )
}

/// Render the hotspot map into `area`, with a one-line status underneath.
pub fn render_map_view(frame: &mut Frame, area: Rect, points: &[GeoPoint], theme: &Theme) {
    let parts = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);

    let map_points = plottable_points(points);
    let (x_bounds, y_bounds) = map_bounds(&map_points.coords);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.separator)
                .title(Span::styled(" EV Registration Hotspots ", theme.header)),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: theme.map_grid,
                resolution: MapResolution::High,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &map_points.coords,
                color: theme.map_marker,
            });
        });
    frame.render_widget(canvas, parts[0]);

    let status = Line::from(vec![
        Span::styled(format_count(map_points.coords.len() as u64), theme.value),
        Span::styled(" points plotted", theme.label),
        Span::styled(" · ", theme.dim),
        Span::styled(format_count(map_points.missing as u64), theme.value),
        Span::styled(" without usable coordinates", theme.label),
    ]);
    frame.render_widget(Paragraph::new(status), parts[1]);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn point(id: usize, lat: Option<f64>, lon: Option<f64>) -> GeoPoint {
        GeoPoint {
            id,
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            latitude: lat,
            longitude: lon,
            count: 1,
        }
    }

    #[test]
    fn test_plottable_points_skips_missing_coordinates() {
        let points = vec![
            point(0, Some(18.5), Some(73.8)),
            point(1, None, Some(73.8)),
            point(2, Some(28.6), None),
            point(3, Some(12.9), Some(77.6)),
        ];
        let map_points = plottable_points(&points);
        assert_eq!(map_points.coords, vec![(73.8, 18.5), (77.6, 12.9)]);
        assert_eq!(map_points.missing, 2);
    }

    #[test]
    fn test_plottable_points_skips_off_globe_coordinates() {
        let points = vec![
            point(0, Some(95.0), Some(-200.0)),
            point(1, Some(f64::NAN), Some(10.0)),
            point(2, Some(-90.0), Some(180.0)),
        ];
        let map_points = plottable_points(&points);
        assert_eq!(map_points.coords, vec![(180.0, -90.0)]);
        assert_eq!(map_points.missing, 2);
    }

    #[test]
    fn test_off_globe_point_keeps_bounds_ordered() {
        let map_points = plottable_points(&[point(0, Some(95.0), Some(-200.0))]);
        let (x, y) = map_bounds(&map_points.coords);
        assert!(x[0] <= x[1]);
        assert!(y[0] <= y[1]);
        assert_eq!((x, y), ([-180.0, 180.0], [-90.0, 90.0]));
    }

    #[test]
    fn test_render_map_view_off_globe_not_reported_as_plotted() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let points = vec![point(0, Some(95.0), Some(-200.0))];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_map_view(frame, area, &points, &theme);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("0 points plotted"));
        assert!(text.contains("1 without usable coordinates"));
    }

    #[test]
    fn test_map_bounds_empty_is_world() {
        assert_eq!(map_bounds(&[]), ([-180.0, 180.0], [-90.0, 90.0]));
    }

    #[test]
    fn test_map_bounds_adds_margin() {
        let (x, y) = map_bounds(&[(73.0, 18.0), (77.0, 28.0)]);
        assert_eq!(x, [71.0, 79.0]);
        assert_eq!(y, [16.0, 30.0]);
    }

    #[test]
    fn test_map_bounds_clamped_to_globe() {
        let (x, y) = map_bounds(&[(179.5, 89.5), (-179.5, -89.5)]);
        assert_eq!(x, [-180.0, 180.0]);
        assert_eq!(y, [-90.0, 90.0]);
    }

    #[test]
    fn test_render_map_view_reports_counts() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let points = vec![point(0, Some(18.5), Some(73.8)), point(1, None, None)];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_map_view(frame, area, &points, &theme);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("EV Registration Hotspots"));
        assert!(text.contains("1 points plotted"));
        assert!(text.contains("1 without usable coordinates"));
    }

    #[test]
    fn test_render_map_view_empty_does_not_panic() {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::classic();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_map_view(frame, area, &[], &theme);
            })
            .unwrap();
    }
}
