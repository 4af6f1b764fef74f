use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Label used when a record carries no manufacturer.
pub const UNKNOWN_MAKE: &str = "Unknown";

/// Number of manufacturers kept by the top-makes ranking.
pub const TOP_MAKES_LIMIT: usize = 6;

/// Lower bound of the year range selected on startup.
pub const DEFAULT_MIN_YEAR: i32 = 2018;

/// Upper bound of the year range selected on startup.
pub const DEFAULT_MAX_YEAR: i32 = 2024;

// ── Record ────────────────────────────────────────────────────────────────────

/// One electric-vehicle registration.
///
/// Records are validated once at the load boundary and never mutated
/// afterwards.  Identical records are legal (one row per sale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Manufacturer name, [`UNKNOWN_MAKE`] when the source left it blank.
    pub make: String,
    /// Model year, `None` when missing or not an integer.
    #[serde(default)]
    pub model_year: Option<i32>,
    /// Registration city.
    #[serde(default)]
    pub city: String,
    /// Registration state / region.
    #[serde(default)]
    pub state: String,
    /// Latitude in degrees.  Finite but otherwise unchecked.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees.  Finite but otherwise unchecked.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Usable battery capacity in kWh, `None` when missing or negative.
    #[serde(default)]
    pub battery_capacity_kwh: Option<f64>,
}

impl Record {
    /// Create a record with only a make and model year set.
    pub fn new(make: impl Into<String>, model_year: Option<i32>) -> Self {
        Self {
            make: make.into(),
            model_year,
            city: String::new(),
            state: String::new(),
            latitude: None,
            longitude: None,
            battery_capacity_kwh: None,
        }
    }

    /// Set the battery capacity.
    pub fn with_capacity(mut self, kwh: f64) -> Self {
        self.battery_capacity_kwh = Some(kwh);
        self
    }

    /// Set the city, state and coordinates.
    pub fn with_location(
        mut self,
        city: impl Into<String>,
        state: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        self.city = city.into();
        self.state = state.into();
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Battery capacity with a missing value read as zero.
    pub fn capacity_or_zero(&self) -> f64 {
        self.battery_capacity_kwh.unwrap_or(0.0)
    }

    /// `true` when both coordinates are present.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

// ── Filter state ──────────────────────────────────────────────────────────────

/// Inclusive `[min, max]` model-year range.  `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// Build a range, rejecting `min > max`.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(DashboardError::InvalidYearRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range covering a single year.
    pub fn single(year: i32) -> Self {
        Self {
            min: year,
            max: year,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Inclusive membership test.
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_YEAR,
            max: DEFAULT_MAX_YEAR,
        }
    }
}

/// User-selected restriction applied before every aggregation.
///
/// A plain value: the presentation layer builds a new one on every change and
/// hands it to the aggregation functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterState {
    /// Only this manufacturer when set; every manufacturer when `None`.
    pub selected_make: Option<String>,
    /// Inclusive model-year window.
    pub year_range: YearRange,
}

impl FilterState {
    pub fn new(selected_make: Option<String>, year_range: YearRange) -> Self {
        Self {
            selected_make,
            year_range,
        }
    }

    /// The filter predicate.  Records without a model year never match.
    pub fn matches(&self, record: &Record) -> bool {
        let make_ok = self
            .selected_make
            .as_deref()
            .is_none_or(|make| make == record.make);
        let year_ok = record
            .model_year
            .is_some_and(|year| self.year_range.contains(year));
        make_ok && year_ok
    }

    /// Display label for the make selector.
    pub fn make_label(&self) -> &str {
        self.selected_make.as_deref().unwrap_or("All")
    }
}

// ── Derived views ─────────────────────────────────────────────────────────────

/// Headline figures shown in the KPI cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of filtered records.
    pub total_count: u64,
    /// Most recent model year present, `0` when there is none.
    pub latest_year: i32,
    /// Records registered for `latest_year`.
    pub latest_year_count: u64,
    /// Growth of `latest_year` over the year before, in percent.
    ///
    /// `None` when the previous year has no registrations.
    pub yoy_growth_pct: Option<f64>,
    /// Manufacturer with the most registrations.
    pub top_make: Option<String>,
    /// Share of `top_make` in `total_count`, in percent.
    pub top_make_share_pct: f64,
}

/// Registrations for one model year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

/// Registrations per model year, ascending by year.
pub type YearlySeries = Vec<YearCount>;

/// Registrations for one manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeCount {
    pub make: String,
    pub count: u64,
}

/// Manufacturers ranked by registrations, at most [`TOP_MAKES_LIMIT`] long.
pub type TopCategories = Vec<MakeCount>;

/// Fixed battery-capacity ranges used by the distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityBucket {
    #[serde(rename = "0-20 kWh")]
    UpTo20,
    #[serde(rename = "20-40 kWh")]
    UpTo40,
    #[serde(rename = "40-60 kWh")]
    UpTo60,
    #[serde(rename = "60+ kWh")]
    Over60,
}

impl CapacityBucket {
    /// Every bucket in display order.
    pub const ALL: [CapacityBucket; 4] = [
        CapacityBucket::UpTo20,
        CapacityBucket::UpTo40,
        CapacityBucket::UpTo60,
        CapacityBucket::Over60,
    ];

    /// Bucket for a capacity in kWh.  Upper bounds are inclusive; NaN lands in
    /// the lowest bucket.
    pub fn for_capacity(kwh: f64) -> Self {
        if kwh.is_nan() || kwh <= 20.0 {
            CapacityBucket::UpTo20
        } else if kwh <= 40.0 {
            CapacityBucket::UpTo40
        } else if kwh <= 60.0 {
            CapacityBucket::UpTo60
        } else {
            CapacityBucket::Over60
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityBucket::UpTo20 => "0-20 kWh",
            CapacityBucket::UpTo40 => "20-40 kWh",
            CapacityBucket::UpTo60 => "40-60 kWh",
            CapacityBucket::Over60 => "60+ kWh",
        }
    }

    /// Position in [`CapacityBucket::ALL`].
    pub fn index(&self) -> usize {
        match self {
            CapacityBucket::UpTo20 => 0,
            CapacityBucket::UpTo40 => 1,
            CapacityBucket::UpTo60 => 2,
            CapacityBucket::Over60 => 3,
        }
    }
}

/// Registrations falling into one capacity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: CapacityBucket,
    pub count: u64,
}

/// Battery-capacity distribution.  All four buckets are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityHistogram {
    pub buckets: [BucketCount; 4],
}

impl Default for CapacityHistogram {
    fn default() -> Self {
        Self {
            buckets: CapacityBucket::ALL.map(|bucket| BucketCount { bucket, count: 0 }),
        }
    }
}

impl CapacityHistogram {
    /// Count one record in `bucket`.
    pub fn add(&mut self, bucket: CapacityBucket) {
        self.buckets[bucket.index()].count += 1;
    }

    pub fn count(&self, bucket: CapacityBucket) -> u64 {
        self.buckets[bucket.index()].count
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// One map marker / table row.  Each filtered record is its own point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Position of the record in the filtered sequence.
    pub id: usize,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Registrations represented by this point; always `1`.
    pub count: u64,
}

/// Map points in filtered-record order.
pub type GeoPoints = Vec<GeoPoint>;

/// Every derived view for one filter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardViews {
    pub summary: SummaryStats,
    pub yearly: YearlySeries,
    pub top_makes: TopCategories,
    pub capacity: CapacityHistogram,
    pub points: GeoPoints,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
