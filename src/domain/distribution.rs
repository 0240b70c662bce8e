// Random distribution parameters for synthetic series
use super::site::SiteId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{field}: {reason}")]
pub struct ParameterError {
    pub field: String,
    pub reason: String,
}

impl ParameterError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Scheduled consumption is drawn from `N(mean, std_dev)`; actual adds `N(0, noise_std_dev)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub noise_std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PriceDistribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
}

/// Activation volume: a `Bernoulli(probability)` gate times a `U(low, high)` magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationDistribution {
    pub probability: f64,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    pub default_site: SiteDistribution,
    #[serde(default)]
    pub sites: BTreeMap<SiteId, SiteDistribution>,
    pub price: PriceDistribution,
    pub activation: ActivationDistribution,
}

impl Distributions {
    pub fn for_site(&self, site: &SiteId) -> &SiteDistribution {
        self.sites.get(site).unwrap_or(&self.default_site)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        self.default_site.validate("default_site")?;
        for (site, dist) in &self.sites {
            dist.validate(&format!("sites.{site}"))?;
        }
        self.price.validate()?;
        self.activation.validate()
    }
}

impl SiteDistribution {
    fn validate(&self, field: &str) -> Result<(), ParameterError> {
        finite(&format!("{field}.mean"), self.mean)?;
        std_dev(&format!("{field}.std_dev"), self.std_dev)?;
        std_dev(&format!("{field}.noise_std_dev"), self.noise_std_dev)
    }
}

impl PriceDistribution {
    fn validate(&self) -> Result<(), ParameterError> {
        match *self {
            Self::Normal { mean, std_dev: sd } => {
                finite("price.mean", mean)?;
                std_dev("price.std_dev", sd)
            }
            Self::Uniform { low, high } => range("price", low, high),
        }
    }
}

impl ActivationDistribution {
    fn validate(&self) -> Result<(), ParameterError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ParameterError::new(
                "activation.probability",
                format!("{} is outside [0, 1]", self.probability),
            ));
        }
        range("activation", self.low, self.high)?;
        if self.low < 0.0 {
            return Err(ParameterError::new(
                "activation.low",
                "activation volume must be non-negative",
            ));
        }
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::new(field, format!("{value} is not finite")))
    }
}

fn std_dev(field: &str, value: f64) -> Result<(), ParameterError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ParameterError::new(
            field,
            format!("standard deviation {value} is negative"),
        ));
    }
    Ok(())
}

fn range(field: &str, low: f64, high: f64) -> Result<(), ParameterError> {
    finite(&format!("{field}.low"), low)?;
    finite(&format!("{field}.high"), high)?;
    if low > high {
        return Err(ParameterError::new(
            field,
            format!("low {low} exceeds high {high}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distributions() -> Distributions {
        Distributions {
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
        }
    }

    #[test]
    fn valid_parameters_pass() {
        assert!(distributions().validate().is_ok());
    }

    #[test]
    fn zero_std_dev_is_allowed() {
        let mut d = distributions();
        d.default_site.std_dev = 0.0;
        d.default_site.noise_std_dev = 0.0;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn negative_site_std_dev_is_rejected() {
        let mut d = distributions();
        d.sites.insert(
            SiteId::from("Site B"),
            SiteDistribution {
                mean: 40.0,
                std_dev: -1.0,
                noise_std_dev: 2.0,
            },
        );
        let err = d.validate().unwrap_err();
        assert_eq!(err.field, "sites.Site B.std_dev");
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        for p in [-0.1, 1.5, f64::NAN] {
            let mut d = distributions();
            d.activation.probability = p;
            let err = d.validate().unwrap_err();
            assert_eq!(err.field, "activation.probability");
        }
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let mut d = distributions();
        d.price = PriceDistribution::Uniform {
            low: 10.0,
            high: 5.0,
        };
        assert_eq!(d.validate().unwrap_err().field, "price");
    }

    #[test]
    fn site_overrides_fall_back_to_default() {
        let mut d = distributions();
        let custom = SiteDistribution {
            mean: 20.0,
            std_dev: 1.0,
            noise_std_dev: 1.0,
        };
        d.sites.insert(SiteId::from("Site A"), custom);
        assert_eq!(d.for_site(&SiteId::from("Site A")), &custom);
        assert_eq!(d.for_site(&SiteId::from("Site C")), &d.default_site);
    }

    #[test]
    fn price_distribution_deserializes_tagged() {
        let price: PriceDistribution =
            serde_json::from_str(r#"{"kind":"normal","mean":80.0,"std_dev":30.0}"#).unwrap();
        assert_eq!(
            price,
            PriceDistribution::Normal {
                mean: 80.0,
                std_dev: 30.0
            }
        );
    }
}
