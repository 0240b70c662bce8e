// Random source seam for series generation

/// Draws used by the series generator. Implementations may assume parameters
/// were validated: standard deviations are non-negative, `low <= high`, and
/// probabilities lie in `[0, 1]`.
pub trait RandomSource {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    fn uniform(&mut self, low: f64, high: f64) -> f64;

    fn bernoulli(&mut self, probability: f64) -> bool;
}
