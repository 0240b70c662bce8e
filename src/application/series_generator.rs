// Series generator - Synthetic portfolio imbalance table
use crate::application::random_source::RandomSource;
use crate::domain::distribution::{Distributions, ParameterError, PriceDistribution};
use crate::domain::preset::{Anchor, Preset};
use crate::domain::series::{ImbalanceTable, MarketReading, SiteReading, TimePoint};
use crate::domain::site::SiteId;
use crate::domain::thresholds::Thresholds;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// Invalid input to a generation call. No partial table is ever returned.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GenerateError {
    #[error("period must be positive, got {0}")]
    NonPositivePeriod(TimeDelta),
    #[error("window must be non-negative (before {before}, after {after})")]
    NegativeWindow { before: TimeDelta, after: TimeDelta },
    #[error("window around {0} is out of range")]
    WindowOutOfRange(DateTime<Utc>),
    #[error("cannot align reference time {time} to {anchor:?}: {reason}")]
    Alignment {
        time: DateTime<Utc>,
        anchor: Anchor,
        reason: String,
    },
    #[error("invalid distribution parameter {0}")]
    InvalidParameter(#[from] ParameterError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub reference_time: DateTime<Utc>,
    pub anchor: Anchor,
    pub period: TimeDelta,
    pub window_before: TimeDelta,
    pub window_after: TimeDelta,
    pub sites: Vec<SiteId>,
    pub distributions: Distributions,
    pub thresholds: Thresholds,
}

impl GenerationRequest {
    /// Request using a preset's window, period, anchor and distributions.
    pub fn from_preset(
        preset: &Preset,
        reference_time: DateTime<Utc>,
        sites: Vec<SiteId>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            reference_time,
            anchor: preset.anchor,
            period: preset.period(),
            window_before: preset.window_before(),
            window_after: preset.window_after(),
            sites,
            distributions: preset.distributions.clone(),
            thresholds,
        }
    }
}

/// Floor `time` to the top of the hour or to the period boundary.
pub fn align_reference(
    time: DateTime<Utc>,
    anchor: Anchor,
    period: TimeDelta,
) -> Result<DateTime<Utc>, GenerateError> {
    let unit = match anchor {
        Anchor::Hour => TimeDelta::hours(1),
        Anchor::Period => period,
    };
    time.duration_trunc(unit)
        .map_err(|e| GenerateError::Alignment {
            time,
            anchor,
            reason: e.to_string(),
        })
}

/// Inclusive grid over `[reference - before, reference + after]`.
pub fn build_grid(
    reference: DateTime<Utc>,
    before: TimeDelta,
    after: TimeDelta,
    period: TimeDelta,
) -> Result<Vec<DateTime<Utc>>, GenerateError> {
    if period <= TimeDelta::zero() {
        return Err(GenerateError::NonPositivePeriod(period));
    }
    if before < TimeDelta::zero() || after < TimeDelta::zero() {
        return Err(GenerateError::NegativeWindow { before, after });
    }

    let start = reference
        .checked_sub_signed(before)
        .ok_or(GenerateError::WindowOutOfRange(reference))?;
    let end = reference
        .checked_add_signed(after)
        .ok_or(GenerateError::WindowOutOfRange(reference))?;

    let mut grid = Vec::new();
    let mut current = Some(start);
    while let Some(t) = current.filter(|t| *t <= end) {
        grid.push(t);
        current = t.checked_add_signed(period);
    }
    Ok(grid)
}

pub struct SeriesGenerator;

impl SeriesGenerator {
    /// Generate a complete table: per-site values, totals, market fields and alerts.
    ///
    /// Draw order is fixed so that a deterministic source yields a deterministic
    /// table: per site (in selection order) every scheduled draw, then every
    /// actual-noise draw; then every price draw, every activation gate and
    /// every activation magnitude.
    pub fn generate<R: RandomSource + ?Sized>(
        request: &GenerationRequest,
        source: &mut R,
    ) -> Result<ImbalanceTable, GenerateError> {
        request.distributions.validate()?;
        if request.period <= TimeDelta::zero() {
            return Err(GenerateError::NonPositivePeriod(request.period));
        }

        let reference = align_reference(request.reference_time, request.anchor, request.period)?;
        let grid = build_grid(
            reference,
            request.window_before,
            request.window_after,
            request.period,
        )?;
        let n = grid.len();
        let dists = &request.distributions;

        let site_columns: Vec<(&SiteId, Vec<f64>, Vec<f64>)> = request
            .sites
            .iter()
            .map(|site| {
                let d = dists.for_site(site);
                let scheduled: Vec<f64> = (0..n).map(|_| source.normal(d.mean, d.std_dev)).collect();
                let actual: Vec<f64> = scheduled
                    .iter()
                    .map(|s| s + source.normal(0.0, d.noise_std_dev))
                    .collect();
                (site, scheduled, actual)
            })
            .collect();

        let prices: Vec<f64> = (0..n)
            .map(|_| match dists.price {
                PriceDistribution::Normal { mean, std_dev } => source.normal(mean, std_dev),
                PriceDistribution::Uniform { low, high } => source.uniform(low, high),
            })
            .collect();

        let activation = dists.activation;
        let gates: Vec<bool> = (0..n).map(|_| source.bernoulli(activation.probability)).collect();
        let magnitudes: Vec<f64> = (0..n)
            .map(|_| source.uniform(activation.low, activation.high))
            .collect();

        let rows: Vec<TimePoint> = grid
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| {
                let readings = site_columns
                    .iter()
                    .map(|(site, scheduled, actual)| {
                        SiteReading::new((*site).clone(), scheduled[i], actual[i])
                    })
                    .collect();
                let market = MarketReading {
                    imbalance_price: prices[i],
                    balancing_activations: if gates[i] { magnitudes[i] } else { 0.0 },
                };
                TimePoint::new(timestamp, readings, market, &request.thresholds)
            })
            .collect();

        tracing::debug!(
            "Generated {} rows for {} sites around {}",
            rows.len(),
            request.sites.len(),
            reference
        );

        Ok(ImbalanceTable {
            reference_time: reference,
            period: request.period,
            sites: request.sites.clone(),
            thresholds: request.thresholds,
            rows,
        })
    }
}
