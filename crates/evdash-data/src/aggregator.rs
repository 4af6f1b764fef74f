//! Filtering and aggregation over the loaded registrations.
//!
//! Every function here is pure and total: the same input always yields the
//! same output, empty input yields empty / zeroed views, and nothing divides
//! by zero.

use std::collections::{BTreeMap, HashMap};

use evdash_core::models::{
    CapacityBucket, CapacityHistogram, DashboardViews, FilterState, GeoPoint, GeoPoints,
    MakeCount, Record, SummaryStats, TopCategories, YearCount, YearlySeries, TOP_MAKES_LIMIT,
};

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper that filters records and derives the dashboard views.
pub struct Aggregator;

impl Aggregator {
    /// Keep the records accepted by `filter`, preserving their order.
    pub fn filter(records: &[Record], filter: &FilterState) -> Vec<Record> {
        records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Headline statistics for the KPI cards.
    pub fn summarize(filtered: &[Record]) -> SummaryStats {
        let series = Self::series_by_year(filtered);
        let top_makes = Self::rank_categories(filtered);
        Self::summary_from(filtered.len() as u64, &series, &top_makes)
    }

    /// Registrations per model year, ascending by year.
    ///
    /// Records without a model year are left out.
    pub fn series_by_year(filtered: &[Record]) -> YearlySeries {
        // BTreeMap keeps the years sorted.
        let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
        for year in filtered.iter().filter_map(|r| r.model_year) {
            *by_year.entry(year).or_default() += 1;
        }
        by_year
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect()
    }

    /// Every make with its registration count, descending by count.  Makes
    /// with equal counts keep the order in which they were first seen.
    pub fn count_by_make(filtered: &[Record]) -> Vec<MakeCount> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<MakeCount> = Vec::new();

        for record in filtered {
            match positions.get(record.make.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    positions.insert(record.make.as_str(), counts.len());
                    counts.push(MakeCount {
                        make: record.make.clone(),
                        count: 1,
                    });
                }
            }
        }

        // `sort_by` is stable, which gives the first-seen tie-break.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// The [`TOP_MAKES_LIMIT`] most registered makes.
    pub fn rank_categories(filtered: &[Record]) -> TopCategories {
        let mut counts = Self::count_by_make(filtered);
        counts.truncate(TOP_MAKES_LIMIT);
        counts
    }

    /// Battery-capacity distribution over the four fixed buckets.
    ///
    /// Missing capacities count as 0 kWh.
    pub fn histogram_by_capacity(filtered: &[Record]) -> CapacityHistogram {
        filtered
            .iter()
            .fold(CapacityHistogram::default(), |mut histogram, record| {
                histogram.add(CapacityBucket::for_capacity(record.capacity_or_zero()));
                histogram
            })
    }

    /// One map point per record, in input order.  Coordinates are passed
    /// through unchecked.
    pub fn to_geo_points(filtered: &[Record]) -> GeoPoints {
        filtered
            .iter()
            .enumerate()
            .map(|(id, record)| GeoPoint {
                id,
                city: record.city.clone(),
                state: record.state.clone(),
                latitude: record.latitude,
                longitude: record.longitude,
                count: 1,
            })
            .collect()
    }

    /// Compute every view for an already filtered record set.
    pub fn compute_views(filtered: &[Record]) -> DashboardViews {
        let yearly = Self::series_by_year(filtered);
        let top_makes = Self::rank_categories(filtered);
        let summary = Self::summary_from(filtered.len() as u64, &yearly, &top_makes);

        DashboardViews {
            summary,
            yearly,
            top_makes,
            capacity: Self::histogram_by_capacity(filtered),
            points: Self::to_geo_points(filtered),
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn summary_from(
        total_count: u64,
        series: &[YearCount],
        top_makes: &[MakeCount],
    ) -> SummaryStats {
        let (latest_year, latest_year_count) = series
            .last()
            .map(|yc| (yc.year, yc.count))
            .unwrap_or((0, 0));

        let previous_year_count = latest_year
            .checked_sub(1)
            .and_then(|prev| series.iter().find(|yc| yc.year == prev))
            .map(|yc| yc.count)
            .unwrap_or(0);

        let top = top_makes.first();

        SummaryStats {
            total_count,
            latest_year,
            latest_year_count,
            yoy_growth_pct: growth_pct(latest_year_count, previous_year_count),
            top_make: top.map(|t| t.make.clone()),
            top_make_share_pct: top.map_or(0.0, |t| share_pct(t.count, total_count)),
        }
    }
}

/// `(current - previous) / previous * 100`, undefined when `previous == 0`.
fn growth_pct(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

/// `part / total * 100`, `0` when `total == 0`.
fn share_pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use evdash_core::models::YearRange;

    fn record(make: &str, year: i32, capacity: f64) -> Record {
        Record::new(make, Some(year)).with_capacity(capacity)
    }

    /// The three-record example used throughout the docs.
    fn sample() -> Vec<Record> {
        vec![
            record("Tesla", 2020, 50.0),
            record("Tesla", 2021, 10.0),
            record("Nissan", 2021, 30.0),
        ]
    }

    fn wide_filter(make: Option<&str>) -> FilterState {
        FilterState::new(
            make.map(str::to_string),
            YearRange::new(1900, 2100).unwrap(),
        )
    }

    // ── filter ────────────────────────────────────────────────────────────────

    #[test]
    fn test_filter_no_make_keeps_everything_in_range() {
        let filtered = Aggregator::filter(&sample(), &wide_filter(None));
        assert_eq!(filtered, sample());
    }

    #[test]
    fn test_filter_by_make() {
        let filtered = Aggregator::filter(&sample(), &wide_filter(Some("Tesla")));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.make == "Tesla"));
    }

    #[test]
    fn test_filter_preserves_order() {
        let records = vec![
            record("B", 2021, 0.0),
            record("A", 2019, 0.0),
            record("C", 2020, 0.0),
        ];
        let filtered = Aggregator::filter(&records, &wide_filter(None));
        let makes: Vec<&str> = filtered.iter().map(|r| r.make.as_str()).collect();
        assert_eq!(makes, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_filter_year_bounds_inclusive() {
        let records = vec![
            record("A", 2017, 0.0),
            record("A", 2018, 0.0),
            record("A", 2024, 0.0),
            record("A", 2025, 0.0),
        ];
        let filtered = Aggregator::filter(&records, &FilterState::default());
        let years: Vec<i32> = filtered.iter().filter_map(|r| r.model_year).collect();
        assert_eq!(years, vec![2018, 2024]);
    }

    #[test]
    fn test_filter_drops_records_without_year() {
        let records = vec![Record::new("Tesla", None), record("Tesla", 2020, 0.0)];
        let filtered = Aggregator::filter(&records, &wide_filter(None));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(Aggregator::filter(&[], &FilterState::default()).is_empty());
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_empty() {
        let summary = Aggregator::summarize(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.latest_year, 0);
        assert_eq!(summary.latest_year_count, 0);
        assert_eq!(summary.yoy_growth_pct, None);
        assert_eq!(summary.top_make, None);
        assert_eq!(summary.top_make_share_pct, 0.0);
    }

    #[test]
    fn test_summarize_sample() {
        let summary = Aggregator::summarize(&sample());
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.latest_year, 2021);
        assert_eq!(summary.latest_year_count, 2);
        assert_eq!(summary.top_make.as_deref(), Some("Tesla"));
        assert!((summary.top_make_share_pct - 200.0 / 3.0).abs() < 1e-9);
        // 2020 → 1, 2021 → 2 : +100 %
        assert_eq!(summary.yoy_growth_pct, Some(100.0));
    }

    #[test]
    fn test_summarize_filtered_by_tesla() {
        let filtered = Aggregator::filter(&sample(), &wide_filter(Some("Tesla")));
        let summary = Aggregator::summarize(&filtered);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.latest_year, 2021);
        assert_eq!(summary.latest_year_count, 1);
        assert_eq!(summary.top_make_share_pct, 100.0);
        assert_eq!(summary.yoy_growth_pct, Some(0.0));
    }

    #[test]
    fn test_summarize_growth_undefined_without_previous_year() {
        let records = vec![record("A", 2019, 0.0), record("A", 2021, 0.0)];
        let summary = Aggregator::summarize(&records);
        assert_eq!(summary.latest_year, 2021);
        assert_eq!(summary.yoy_growth_pct, None);
    }

    #[test]
    fn test_summarize_negative_growth() {
        let records = vec![
            record("A", 2022, 0.0),
            record("A", 2022, 0.0),
            record("A", 2022, 0.0),
            record("A", 2022, 0.0),
            record("A", 2023, 0.0),
        ];
        let summary = Aggregator::summarize(&records);
        assert_eq!(summary.yoy_growth_pct, Some(-75.0));
    }

    #[test]
    fn test_summarize_only_yearless_records() {
        let records = vec![Record::new("A", None), Record::new("B", None)];
        let summary = Aggregator::summarize(&records);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.latest_year, 0);
        assert_eq!(summary.latest_year_count, 0);
        assert_eq!(summary.top_make.as_deref(), Some("A"));
        assert_eq!(summary.top_make_share_pct, 50.0);
    }

    // ── series_by_year ────────────────────────────────────────────────────────

    #[test]
    fn test_series_by_year_sample() {
        let series = Aggregator::series_by_year(&sample());
        assert_eq!(
            series,
            vec![
                YearCount {
                    year: 2020,
                    count: 1
                },
                YearCount {
                    year: 2021,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_series_by_year_sorted_regardless_of_input_order() {
        let records = vec![
            record("A", 2023, 0.0),
            record("A", 2019, 0.0),
            record("A", 2021, 0.0),
        ];
        let years: Vec<i32> = Aggregator::series_by_year(&records)
            .iter()
            .map(|yc| yc.year)
            .collect();
        assert_eq!(years, vec![2019, 2021, 2023]);
    }

    #[test]
    fn test_series_by_year_skips_missing_year() {
        let records = vec![Record::new("A", None), record("A", 2020, 0.0)];
        let series = Aggregator::series_by_year(&records);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 1);
    }

    // ── rank_categories ───────────────────────────────────────────────────────

    #[test]
    fn test_rank_categories_sample() {
        let ranked = Aggregator::rank_categories(&sample());
        assert_eq!(
            ranked,
            vec![
                MakeCount {
                    make: "Tesla".to_string(),
                    count: 2
                },
                MakeCount {
                    make: "Nissan".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_rank_categories_ties_keep_first_seen_order() {
        let records = vec![
            record("Kia", 2020, 0.0),
            record("BMW", 2020, 0.0),
            record("Audi", 2020, 0.0),
            record("BMW", 2021, 0.0),
            record("Kia", 2021, 0.0),
        ];
        let makes: Vec<String> = Aggregator::rank_categories(&records)
            .into_iter()
            .map(|m| m.make)
            .collect();
        assert_eq!(makes, vec!["Kia", "BMW", "Audi"]);
    }

    #[test]
    fn test_rank_categories_truncates_to_six() {
        let records: Vec<Record> = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .iter()
            .enumerate()
            .flat_map(|(i, make)| (0..=i).map(move |_| record(make, 2020, 0.0)))
            .collect();
        let ranked = Aggregator::rank_categories(&records);
        assert_eq!(ranked.len(), 6);
        assert_eq!(ranked[0].make, "H");
        assert_eq!(ranked[0].count, 8);
        assert_eq!(ranked[5].make, "C");
    }

    #[test]
    fn test_count_by_make_is_untruncated() {
        let records: Vec<Record> = (0..10)
            .map(|i| record(&format!("M{i}"), 2020, 0.0))
            .collect();
        assert_eq!(Aggregator::count_by_make(&records).len(), 10);
    }

    #[test]
    fn test_rank_categories_empty() {
        assert!(Aggregator::rank_categories(&[]).is_empty());
    }

    // ── histogram_by_capacity ─────────────────────────────────────────────────

    #[test]
    fn test_histogram_sample() {
        let hist = Aggregator::histogram_by_capacity(&sample());
        assert_eq!(hist.count(CapacityBucket::UpTo20), 1);
        assert_eq!(hist.count(CapacityBucket::UpTo40), 1);
        assert_eq!(hist.count(CapacityBucket::UpTo60), 1);
        assert_eq!(hist.count(CapacityBucket::Over60), 0);
    }

    #[test]
    fn test_histogram_missing_capacity_in_lowest_bucket() {
        let records = vec![Record::new("A", Some(2020)), record("A", 2020, 75.0)];
        let hist = Aggregator::histogram_by_capacity(&records);
        assert_eq!(hist.count(CapacityBucket::UpTo20), 1);
        assert_eq!(hist.count(CapacityBucket::Over60), 1);
    }

    #[test]
    fn test_histogram_empty_still_has_four_buckets() {
        let hist = Aggregator::histogram_by_capacity(&[]);
        assert_eq!(hist.buckets.len(), 4);
        let labels: Vec<&str> = hist.buckets.iter().map(|b| b.bucket.label()).collect();
        assert_eq!(labels, vec!["0-20 kWh", "20-40 kWh", "40-60 kWh", "60+ kWh"]);
    }

    // ── to_geo_points ─────────────────────────────────────────────────────────

    #[test]
    fn test_geo_points_one_per_record_with_positional_ids() {
        let records = vec![
            Record::new("A", Some(2020)).with_location("Pune", "MH", 18.5, 73.8),
            Record::new("A", Some(2020)).with_location("Pune", "MH", 18.5, 73.8),
            Record::new("B", Some(2021)),
        ];
        let points = Aggregator::to_geo_points(&records);
        assert_eq!(points.len(), 3);
        assert_eq!(
            points.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(points.iter().all(|p| p.count == 1));
        assert_eq!(points[0].city, "Pune");
        assert_eq!(points[2].latitude, None);
    }

    #[test]
    fn test_geo_points_pass_invalid_coordinates_through() {
        let records = vec![Record::new("A", Some(2020)).with_location("X", "Y", 95.0, -200.0)];
        let points = Aggregator::to_geo_points(&records);
        assert_eq!(points[0].latitude, Some(95.0));
        assert_eq!(points[0].longitude, Some(-200.0));
    }

    // ── compute_views ─────────────────────────────────────────────────────────

    #[test]
    fn test_compute_views_matches_individual_passes() {
        let records = sample();
        let views = Aggregator::compute_views(&records);
        assert_eq!(views.summary, Aggregator::summarize(&records));
        assert_eq!(views.yearly, Aggregator::series_by_year(&records));
        assert_eq!(views.top_makes, Aggregator::rank_categories(&records));
        assert_eq!(views.capacity, Aggregator::histogram_by_capacity(&records));
        assert_eq!(views.points, Aggregator::to_geo_points(&records));
    }

    #[test]
    fn test_compute_views_empty() {
        let views = Aggregator::compute_views(&[]);
        assert_eq!(views, DashboardViews::default());
    }
}
