//! Filter-state lifecycle for the interactive controls.
//!
//! [`FilterController`] is the only place the dashboard mutates a
//! [`FilterState`].  Every operation returns `true` when the filter actually
//! changed so the caller knows whether a recompute is needed.

use evdash_core::models::{FilterState, YearRange};
use evdash_data::analysis::FilterOptions;

// ── FilterController ──────────────────────────────────────────────────────────

/// Owns the current filter and the choices the controls cycle through.
#[derive(Debug, Clone)]
pub struct FilterController {
    state: FilterState,
    options: FilterOptions,
}

impl FilterController {
    pub fn new(initial: FilterState, options: FilterOptions) -> Self {
        Self {
            state: initial,
            options,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Replace the offered choices, e.g. once the dataset finished loading.
    pub fn set_options(&mut self, options: FilterOptions) {
        self.options = options;
    }

    // ── Make selector ─────────────────────────────────────────────────────

    /// Select the next make: `All`, then each available make, then `All` again.
    pub fn next_make(&mut self) -> bool {
        self.step_make(1)
    }

    /// Select the previous make, wrapping around to the last one.
    pub fn prev_make(&mut self) -> bool {
        self.step_make(-1)
    }

    // ── Year range ────────────────────────────────────────────────────────

    /// Move the lower bound by `delta` years.
    ///
    /// Rejected when it would pass the upper bound, or when it would widen
    /// the range beyond the oldest model year in the data.
    pub fn shift_min_year(&mut self, delta: i32) -> bool {
        let range = self.state.year_range;
        let Some(candidate) = range.min().checked_add(delta) else {
            return false;
        };
        if delta < 0 && self.data_bounds().is_some_and(|(lo, _)| candidate < lo) {
            return false;
        }
        self.apply_range(candidate, range.max())
    }

    /// Move the upper bound by `delta` years.
    ///
    /// Rejected when it would pass the lower bound, or when it would widen
    /// the range beyond the newest model year in the data.
    pub fn shift_max_year(&mut self, delta: i32) -> bool {
        let range = self.state.year_range;
        let Some(candidate) = range.max().checked_add(delta) else {
            return false;
        };
        if delta > 0 && self.data_bounds().is_some_and(|(_, hi)| candidate > hi) {
            return false;
        }
        self.apply_range(range.min(), candidate)
    }

    /// Restore the default filter (all makes, default year range).
    pub fn reset(&mut self) -> bool {
        self.replace(FilterState::default())
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn data_bounds(&self) -> Option<(i32, i32)> {
        self.options.year_bounds
    }

    fn step_make(&mut self, step: isize) -> bool {
        let makes = &self.options.makes;
        // Slot 0 is "All"; slot i + 1 is makes[i].
        let slots = makes.len() as isize + 1;
        let current = self
            .state
            .selected_make
            .as_ref()
            .and_then(|selected| makes.iter().position(|m| m == selected))
            .map_or(0, |i| i as isize + 1);

        let next = (current + step).rem_euclid(slots);
        let selected = match next {
            0 => None,
            i => makes.get((i - 1) as usize).cloned(),
        };

        tracing::debug!(make = selected.as_deref().unwrap_or("All"), "make selected");
        self.replace(FilterState::new(selected, self.state.year_range))
    }

    fn apply_range(&mut self, min: i32, max: i32) -> bool {
        match YearRange::new(min, max) {
            Ok(range) => {
                tracing::debug!(min, max, "year range changed");
                self.replace(FilterState::new(self.state.selected_make.clone(), range))
            }
            Err(_) => false,
        }
    }

    fn replace(&mut self, next: FilterState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
