// Alert threshold domain model
use super::distribution::ParameterError;
use serde::{Deserialize, Serialize};

/// A `(low, high)` alert band. A missing side never fires.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

impl Bounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
        }
    }

    /// `(-limit, limit)`
    pub fn symmetric(limit: f64) -> Self {
        Self::new(-limit, limit)
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.low.is_some() || self.high.is_some()
    }

    /// Strictly above `high` or strictly below `low`.
    pub fn breached_by(&self, value: f64) -> bool {
        self.high.is_some_and(|high| value > high) || self.low.is_some_and(|low| value < low)
    }

    /// Replace whichever sides are given. The result is not checked; call
    /// `validate` before using it.
    pub fn with_overrides(self, low: Option<f64>, high: Option<f64>) -> Self {
        Self {
            low: low.or(self.low),
            high: high.or(self.high),
        }
    }

    /// Both sides finite and `low <= high` when both are set.
    pub fn validate(&self, field: &str) -> Result<(), ParameterError> {
        for side in [self.low, self.high].into_iter().flatten() {
            if !side.is_finite() {
                return Err(ParameterError::new(field, format!("bound {side} is not finite")));
            }
        }
        if let (Some(low), Some(high)) = (self.low, self.high) {
            if low > high {
                return Err(ParameterError::new(
                    field,
                    format!("low bound {low} is above high bound {high}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub volume: Bounds,
    #[serde(default)]
    pub price: Bounds,
    #[serde(default)]
    pub cost: Bounds,
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.volume.validate("thresholds.volume")?;
        self.price.validate("thresholds.price")?;
        self.cost.validate("thresholds.cost")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertFlags {
    pub volume: bool,
    pub price: bool,
    pub cost: bool,
}

impl AlertFlags {
    pub fn evaluate(thresholds: &Thresholds, imbalance_total: f64, price: f64, cost: f64) -> Self {
        Self {
            volume: thresholds.volume.breached_by(imbalance_total),
            price: thresholds.price.breached_by(price),
            cost: thresholds.cost.breached_by(cost),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertCounts {
    pub volume: usize,
    pub price: usize,
    pub cost: usize,
}

impl AlertCounts {
    pub fn record(&mut self, flags: &AlertFlags) {
        self.volume += usize::from(flags.volume);
        self.price += usize::from(flags.price);
        self.cost += usize::from(flags.cost);
    }
}
