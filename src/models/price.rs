//! Hourly price series.
//!
//! The series length defines the scheduling horizon `H`. Prices are in
//! currency per kWh; the crate never converts units.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered per-hour electricity prices.
///
/// Guaranteed non-empty, with every price finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Creates a price series.
    ///
    /// # Errors
    /// - [`Error::EmptyPriceSeries`] if `prices` is empty.
    /// - [`Error::InvalidPrice`] for negative, NaN or infinite entries.
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if prices.is_empty() {
            return Err(Error::EmptyPriceSeries);
        }
        if let Some((hour, &value)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(Error::InvalidPrice { hour, value });
        }
        Ok(Self { prices })
    }

    /// Number of hourly slots (`H`).
    #[inline]
    pub fn horizon(&self) -> usize {
        self.prices.len()
    }

    /// Price at `hour`.
    ///
    /// # Panics
    /// If `hour >= horizon()`.
    #[inline]
    pub fn price(&self, hour: usize) -> f64 {
        self.prices[hour]
    }

    /// Price at `hour`, or `None` outside the horizon.
    pub fn get(&self, hour: usize) -> Option<f64> {
        self.prices.get(hour).copied()
    }

    /// Prices as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    /// Lowest price.
    pub fn min(&self) -> f64 {
        self.prices.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Highest price.
    pub fn max(&self) -> f64 {
        self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Min-max normalized prices in `[0, 1]`.
    ///
    /// `(p - min) / (max - min + epsilon)`. Ordering is preserved; a flat
    /// series maps to all zeros.
    pub fn normalized(&self, epsilon: f64) -> Vec<f64> {
        let min = self.min();
        let span = self.max() - min + epsilon;
        self.prices.iter().map(|p| (p - min) / span).collect()
    }

    /// Cost of running a `power` kW load during `hours`.
    ///
    /// Hours outside the horizon contribute nothing.
    pub fn cost_of(&self, hours: &[usize], power: f64) -> f64 {
        hours
            .iter()
            .filter_map(|&h| self.get(h))
            .map(|p| p * power)
            .sum()
    }

    /// The `count` cheapest hours among `candidates`, ascending by hour.
    ///
    /// Equal prices are broken by the earlier hour. Returns fewer than
    /// `count` hours if there are not enough candidates.
    pub fn cheapest_hours(&self, count: usize, candidates: &[usize]) -> Vec<usize> {
        let mut ranked: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&h| h < self.horizon())
            .collect();
        ranked.sort_by(|&a, &b| {
            self.prices[a]
                .partial_cmp(&self.prices[b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        ranked.truncate(count);
        ranked.sort_unstable();
        ranked
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = Error;

    fn try_from(prices: Vec<f64>) -> Result<Self> {
        Self::new(prices)
    }
}

impl From<PriceSeries> for Vec<f64> {
    fn from(series: PriceSeries) -> Self {
        series.prices
    }
}
