// Named product configurations
use super::distribution::{
    ActivationDistribution, Distributions, ParameterError, PriceDistribution, SiteDistribution,
};
use super::site::SiteId;
use super::thresholds::{Bounds, Thresholds};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settlement period (PTU) used by every built-in preset.
pub const PTU_MINUTES: i64 = 15;

/// Upper limit for each window side and for the period (one week).
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// How the reference time is floored before the grid is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Hour,
    Period,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PresetError {
    #[error("unknown preset '{0}'")]
    Unknown(String),
    #[error("preset '{name}' is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: ParameterError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub title: String,
    pub window_before_minutes: i64,
    pub window_after_minutes: i64,
    #[serde(default = "default_period")]
    pub period_minutes: i64,
    #[serde(default)]
    pub anchor: Anchor,
    pub sites: Vec<SiteId>,
    pub distributions: Distributions,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub min_flex_mw: Option<f64>,
}

fn default_period() -> i64 {
    PTU_MINUTES
}

/// Saturates instead of panicking; `validate` keeps real presets far below the limits.
fn minutes(value: i64) -> TimeDelta {
    TimeDelta::try_minutes(value).unwrap_or(if value < 0 { TimeDelta::MIN } else { TimeDelta::MAX })
}

impl Preset {
    pub fn window_before(&self) -> TimeDelta {
        minutes(self.window_before_minutes)
    }

    pub fn window_after(&self) -> TimeDelta {
        minutes(self.window_after_minutes)
    }

    pub fn period(&self) -> TimeDelta {
        minutes(self.period_minutes)
    }

    /// Parameter checks that do not depend on a request.
    pub fn validate(&self) -> Result<(), PresetError> {
        let invalid = |field: &str, reason: String| PresetError::Invalid {
            name: self.name.clone(),
            source: ParameterError {
                field: field.to_string(),
                reason,
            },
        };

        if self.period_minutes <= 0 {
            return Err(invalid("period_minutes", format!("{} is not positive", self.period_minutes)));
        }
        if self.period_minutes > MAX_WINDOW_MINUTES {
            return Err(invalid(
                "period_minutes",
                format!("{} exceeds {MAX_WINDOW_MINUTES}", self.period_minutes),
            ));
        }
        for (field, value) in [
            ("window_before_minutes", self.window_before_minutes),
            ("window_after_minutes", self.window_after_minutes),
        ] {
            if value < 0 {
                return Err(invalid(field, format!("{value} is negative")));
            }
            if value > MAX_WINDOW_MINUTES {
                return Err(invalid(field, format!("{value} exceeds {MAX_WINDOW_MINUTES}")));
            }
        }
        if let Some(flex) = self.min_flex_mw {
            if !flex.is_finite() {
                return Err(invalid("min_flex_mw", format!("{flex} is not finite")));
            }
        }
        self.distributions
            .validate()
            .and_then(|()| self.thresholds.validate())
            .map_err(|source| PresetError::Invalid {
                name: self.name.clone(),
                source,
            })
    }

    /// Hour-anchored monitor with a single volume threshold.
    pub fn imbalance_monitor() -> Self {
        Self {
            name: "imbalance-monitor".to_string(),
            title: "Imbalance Data Monitoring".to_string(),
            window_before_minutes: 8 * 60,
            window_after_minutes: 8 * 60,
            period_minutes: PTU_MINUTES,
            anchor: Anchor::Hour,
            sites: abc_sites(),
            distributions: Distributions {
                default_site: SiteDistribution {
                    mean: 50.0,
                    std_dev: 10.0,
                    noise_std_dev: 5.0,
                },
                sites: BTreeMap::new(),
                price: PriceDistribution::Uniform {
                    low: 0.0,
                    high: 200.0,
                },
                activation: ActivationDistribution {
                    probability: 0.2,
                    low: 5.0,
                    high: 15.0,
                },
            },
            thresholds: Thresholds {
                volume: Bounds::symmetric(5.0),
                price: Bounds::unbounded(),
                cost: Bounds::unbounded(),
            },
            min_flex_mw: None,
        }
    }

    /// Volume, price and cost alerts with a flexibility floor.
    pub fn portfolio_flex() -> Self {
        let mut sites = BTreeMap::new();
        sites.insert(
            SiteId::from("Site C"),
            SiteDistribution {
                mean: 30.0,
                std_dev: 6.0,
                noise_std_dev: 3.0,
            },
        );
        Self {
            name: "portfolio-flex".to_string(),
            title: "Portfolio Flexibility".to_string(),
            window_before_minutes: 12 * 60,
            window_after_minutes: 12 * 60,
            period_minutes: PTU_MINUTES,
            anchor: Anchor::Hour,
            sites: abc_sites(),
            distributions: Distributions {
                default_site: SiteDistribution {
                    mean: 50.0,
                    std_dev: 10.0,
                    noise_std_dev: 5.0,
                },
                sites,
                price: PriceDistribution::Normal {
                    mean: 80.0,
                    std_dev: 30.0,
                },
                activation: ActivationDistribution {
                    probability: 0.15,
                    low: 5.0,
                    high: 20.0,
                },
            },
            thresholds: Thresholds {
                volume: Bounds::new(-10.0, 10.0),
                price: Bounds::new(0.0, 150.0),
                cost: Bounds::new(-1_000.0, 1_000.0),
            },
            min_flex_mw: Some(35.0),
        }
    }

    /// Short mFRR-oriented window anchored on the current PTU.
    pub fn intraday() -> Self {
        Self {
            name: "intraday".to_string(),
            title: "Intraday mFRR".to_string(),
            window_before_minutes: 4 * 60,
            window_after_minutes: 4 * 60,
            period_minutes: PTU_MINUTES,
            anchor: Anchor::Period,
            sites: abc_sites(),
            distributions: Distributions {
                default_site: SiteDistribution {
                    mean: 50.0,
                    std_dev: 8.0,
                    noise_std_dev: 3.0,
                },
                sites: BTreeMap::new(),
                price: PriceDistribution::Normal {
                    mean: 120.0,
                    std_dev: 45.0,
                },
                activation: ActivationDistribution {
                    probability: 0.3,
                    low: 2.0,
                    high: 12.0,
                },
            },
            thresholds: Thresholds {
                volume: Bounds::symmetric(8.0),
                price: Bounds::new(-50.0, 250.0),
                cost: Bounds::new(-2_000.0, 2_000.0),
            },
            min_flex_mw: None,
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::imbalance_monitor(), Self::portfolio_flex(), Self::intraday()]
    }
}

fn abc_sites() -> Vec<SiteId> {
    vec!["Site A".into(), "Site B".into(), "Site C".into()]
}

/// Presets by name, validated on insertion.
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    pub fn builtin() -> Result<Self, PresetError> {
        let mut catalog = Self::default();
        for preset in Preset::builtin() {
            catalog.insert(preset)?;
        }
        Ok(catalog)
    }

    /// Insert or replace a preset with the same name.
    pub fn insert(&mut self, preset: Preset) -> Result<(), PresetError> {
        preset.validate()?;
        self.presets.insert(preset.name.clone(), preset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Preset, PresetError> {
        self.presets
            .get(name)
            .ok_or_else(|| PresetError::Unknown(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }
}
