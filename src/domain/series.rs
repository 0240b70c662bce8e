// Generated imbalance table domain model
use super::site::SiteId;
use super::thresholds::{AlertCounts, AlertFlags, Thresholds};
use chrono::{DateTime, TimeDelta, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub struct SiteReading {
    pub site: SiteId,
    pub scheduled: f64,
    pub actual: f64,
}

impl SiteReading {
    pub fn new(site: SiteId, scheduled: f64, actual: f64) -> Self {
        Self {
            site,
            scheduled,
            actual,
        }
    }

    pub fn imbalance(&self) -> f64 {
        self.actual - self.scheduled
    }
}

impl Serialize for SiteReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SiteReading", 4)?;
        state.serialize_field("site", &self.site)?;
        state.serialize_field("scheduled", &self.scheduled)?;
        state.serialize_field("actual", &self.actual)?;
        state.serialize_field("imbalance", &self.imbalance())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PortfolioTotals {
    pub scheduled: f64,
    pub actual: f64,
    pub imbalance: f64,
}

impl PortfolioTotals {
    pub fn sum(readings: &[SiteReading]) -> Self {
        readings.iter().fold(Self::default(), |acc, r| Self {
            scheduled: acc.scheduled + r.scheduled,
            actual: acc.actual + r.actual,
            imbalance: acc.imbalance + r.imbalance(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketReading {
    pub imbalance_price: f64,
    pub balancing_activations: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub timestamp: DateTime<Utc>,
    sites: Vec<SiteReading>,
    totals: PortfolioTotals,
    market: MarketReading,
    alerts: AlertFlags,
}

impl TimePoint {
    /// Derive totals, cost and alert flags from the sampled values.
    pub fn new(
        timestamp: DateTime<Utc>,
        sites: Vec<SiteReading>,
        market: MarketReading,
        thresholds: &Thresholds,
    ) -> Self {
        let totals = PortfolioTotals::sum(&sites);
        let cost = totals.imbalance * market.imbalance_price;
        let alerts = AlertFlags::evaluate(thresholds, totals.imbalance, market.imbalance_price, cost);
        Self {
            timestamp,
            sites,
            totals,
            market,
            alerts,
        }
    }

    pub fn sites(&self) -> &[SiteReading] {
        &self.sites
    }

    pub fn site(&self, id: &SiteId) -> Option<&SiteReading> {
        self.sites.iter().find(|r| &r.site == id)
    }

    pub fn totals(&self) -> &PortfolioTotals {
        &self.totals
    }

    pub fn market(&self) -> &MarketReading {
        &self.market
    }

    pub fn imbalance_cost(&self) -> f64 {
        self.totals.imbalance * self.market.imbalance_price
    }

    pub fn alerts(&self) -> &AlertFlags {
        &self.alerts
    }

    fn rethreshold(&self, thresholds: &Thresholds) -> Self {
        Self::new(self.timestamp, self.sites.clone(), self.market, thresholds)
    }
}

impl Serialize for TimePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TimePoint", 6)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("sites", &self.sites)?;
        state.serialize_field("totals", &self.totals)?;
        state.serialize_field("market", &self.market)?;
        state.serialize_field("imbalance_cost", &self.imbalance_cost())?;
        state.serialize_field("alerts", &self.alerts)?;
        state.end()
    }
}

/// One generation result. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImbalanceTable {
    pub reference_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_minutes")]
    pub period: TimeDelta,
    pub sites: Vec<SiteId>,
    pub thresholds: Thresholds,
    pub rows: Vec<TimePoint>,
}

fn serialize_minutes<S: Serializer>(period: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(period.num_minutes())
}

impl ImbalanceTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Same values, alert flags derived from new bounds.
    pub fn with_thresholds(&self, thresholds: &Thresholds) -> Self {
        Self {
            reference_time: self.reference_time,
            period: self.period,
            sites: self.sites.clone(),
            thresholds: *thresholds,
            rows: self.rows.iter().map(|r| r.rethreshold(thresholds)).collect(),
        }
    }

    pub fn alert_counts(&self) -> AlertCounts {
        let mut counts = AlertCounts::default();
        for row in &self.rows {
            counts.record(row.alerts());
        }
        counts
    }

    /// Rows with a non-zero activation volume.
    pub fn activation_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.market.balancing_activations > 0.0)
            .count()
    }

    pub fn activation_energy_mwh(&self) -> f64 {
        self.rows.iter().map(|r| r.market.balancing_activations).sum()
    }

    pub fn mean_price(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let total: f64 = self.rows.iter().map(|r| r.market.imbalance_price).sum();
        Some(total / self.rows.len() as f64)
    }

    pub fn total_cost(&self) -> f64 {
        self.rows.iter().map(TimePoint::imbalance_cost).sum()
    }

    /// `(timestamp, value)` pairs for one column.
    pub fn column<F>(&self, f: F) -> Vec<(DateTime<Utc>, f64)>
    where
        F: Fn(&TimePoint) -> f64,
    {
        self.rows.iter().map(|r| (r.timestamp, f(r))).collect()
    }

    /// Column for one site, empty when the site was not selected.
    pub fn site_column<F>(&self, site: &SiteId, f: F) -> Vec<(DateTime<Utc>, f64)>
    where
        F: Fn(&SiteReading) -> f64,
    {
        self.rows
            .iter()
            .filter_map(|r| r.site(site).map(|reading| (r.timestamp, f(reading))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::thresholds::Bounds;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 11, minute, 0).unwrap()
    }

    fn point(minute: u32, a: (f64, f64), b: (f64, f64), price: f64, thresholds: &Thresholds) -> TimePoint {
        TimePoint::new(
            ts(minute),
            vec![
                SiteReading::new("Site A".into(), a.0, a.1),
                SiteReading::new("Site B".into(), b.0, b.1),
            ],
            MarketReading {
                imbalance_price: price,
                balancing_activations: if minute == 0 { 7.5 } else { 0.0 },
            },
            thresholds,
        )
    }

    fn table(thresholds: Thresholds) -> ImbalanceTable {
        ImbalanceTable {
            reference_time: ts(30),
            period: TimeDelta::minutes(15),
            sites: vec!["Site A".into(), "Site B".into()],
            thresholds,
            rows: vec![
                point(0, (50.0, 53.0), (40.0, 38.0), 100.0, &thresholds),
                point(15, (50.0, 60.0), (40.0, 45.0), 20.0, &thresholds),
                point(30, (50.0, 44.0), (40.0, 40.0), 60.0, &thresholds),
            ],
        }
    }

    #[test]
    fn totals_and_cost_are_derived() {
        let t = table(Thresholds::default());
        let row = &t.rows[1];
        assert_eq!(row.totals().scheduled, 90.0);
        assert_eq!(row.totals().actual, 105.0);
        assert_eq!(row.totals().imbalance, 15.0);
        assert_eq!(row.imbalance_cost(), 300.0);
        assert_eq!(row.site(&"Site A".into()).unwrap().imbalance(), 10.0);
    }

    #[test]
    fn empty_readings_sum_to_zero() {
        assert_eq!(PortfolioTotals::sum(&[]), PortfolioTotals::default());
    }

    #[test]
    fn summary_accessors() {
        let t = table(Thresholds::default());
        assert_eq!(t.activation_count(), 1);
        assert_eq!(t.activation_energy_mwh(), 7.5);
        assert_eq!(t.mean_price(), Some(60.0));
        // 1*100 + 15*20 + (-6)*60
        assert_eq!(t.total_cost(), 40.0);
    }

    #[test]
    fn rethresholding_keeps_values() {
        let t = table(Thresholds::default());
        assert_eq!(t.alert_counts(), AlertCounts::default());

        let strict = Thresholds {
            volume: Bounds::symmetric(5.0),
            price: Bounds::new(25.0, 90.0),
            cost: Bounds::new(-100.0, 100.0),
        };
        let re = t.with_thresholds(&strict);
        assert_eq!(re.thresholds, strict);
        let counts = re.alert_counts();
        assert_eq!(counts.volume, 2);
        assert_eq!(counts.price, 2);
        assert_eq!(counts.cost, 2);
        for (before, after) in t.rows.iter().zip(&re.rows) {
            assert_eq!(before.sites(), after.sites());
            assert_eq!(before.market(), after.market());
        }
    }

    #[test]
    fn site_column_skips_unselected_sites() {
        let t = table(Thresholds::default());
        let a = t.site_column(&"Site A".into(), SiteReading::imbalance);
        assert_eq!(a.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![3.0, 10.0, -6.0]);
        assert!(t.site_column(&"Site C".into(), |r| r.scheduled).is_empty());
    }

    #[test]
    fn serializes_derived_fields() {
        let t = table(Thresholds::default());
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["period"], 15);
        assert_eq!(json["rows"][1]["sites"][0]["imbalance"], 10.0);
        assert_eq!(json["rows"][1]["imbalance_cost"], 300.0);
        assert_eq!(json["rows"][0]["alerts"]["volume"], false);
    }
}
