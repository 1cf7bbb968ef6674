//! Synthetic electricity-price signal with a recurring fixed-price window.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Recurring interval during which the price is pinned to a fixed value.
///
/// Active while `elapsed_secs % period_secs < window_secs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideWindow {
    /// Cycle length in seconds.
    pub period_secs: u64,
    /// Length of the pinned part at the start of each cycle.
    pub window_secs: u64,
    /// Price forced while the window is active.
    pub price: f64,
}

impl OverrideWindow {
    /// Whether the window is active `elapsed` after simulation start.
    pub fn is_active(&self, elapsed: Duration) -> bool {
        self.period_secs > 0 && elapsed.as_secs() % self.period_secs < self.window_secs
    }
}

/// Bounded random-walk price process.
///
/// Outside the override window each step draws a uniform perturbation in
/// `[-delta_max, delta_max]` with `delta_max = price * max_change / 60`,
/// then clamps to `[min, max]`.
#[derive(Debug, Clone)]
pub struct PriceProcess {
    /// Lower price bound.
    pub min: f64,
    /// Upper price bound.
    pub max: f64,
    /// Maximum fractional price change per minute.
    pub max_fractional_change_per_minute: f64,
    /// Fixed-price window.
    pub override_window: OverrideWindow,
    rng: StdRng,
}

impl PriceProcess {
    /// Creates a new price process.
    ///
    /// # Arguments
    ///
    /// * `min` - Lower price bound
    /// * `max` - Upper price bound (must be >= `min`)
    /// * `max_fractional_change_per_minute` - e.g. `0.4` for at most 40 % per minute
    /// * `override_window` - Recurring fixed-price window
    /// * `seed` - RNG seed; `None` seeds from OS entropy
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn new(
        min: f64,
        max: f64,
        max_fractional_change_per_minute: f64,
        override_window: OverrideWindow,
        seed: Option<u64>,
    ) -> Self {
        assert!(min <= max, "price min must be <= max");
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            min,
            max,
            max_fractional_change_per_minute: max_fractional_change_per_minute.max(0.0),
            override_window,
            rng,
        }
    }

    /// Draws a starting price uniformly from `[min, max]`.
    pub fn initial_price(&mut self) -> f64 {
        self.rng.random_range(self.min..=self.max)
    }

    /// Computes the next price from `current`, `elapsed` after simulation start.
    ///
    /// The result is always within `[min, max]`, including the override price.
    pub fn next_price(&mut self, current: f64, elapsed: Duration) -> f64 {
        if self.override_window.is_active(elapsed) {
            return self.override_window.price.clamp(self.min, self.max);
        }

        let delta_max = (current * self.max_fractional_change_per_minute / 60.0).abs();
        let change = if delta_max > 0.0 {
            self.rng.random_range(-delta_max..=delta_max)
        } else {
            0.0
        };
        (current + change).clamp(self.min, self.max)
    }
}
