//! Seeded weighted selection and boolean gates.
//!
//! Both draws build a fresh generator from the seed they are given, so a pick
//! depends only on the distribution and the seed.

use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GroveError, GroveResult};
use crate::seeds::seeded_rng;

/// Allowed distance between the raw weight sum and 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Named options with weights summing to 1.
///
/// Options are kept sorted by name, so the outcome of [`select`](Self::select)
/// never depends on the order the weights were supplied in. Weights are stored
/// divided by their sum.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightDistribution {
    names: Vec<String>,
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl WeightDistribution {
    /// Build a distribution, rejecting weights that do not sum to 1 ± 1e-6.
    pub fn new<I, K>(weights: I) -> GroveResult<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let sorted: BTreeMap<String, f64> = weights
            .into_iter()
            .map(|(name, weight)| (name.into(), weight))
            .collect();

        if sorted.is_empty() {
            return Err(GroveError::EmptyDistribution);
        }

        let sum: f64 = sorted.values().sum();
        let all_valid = sorted.values().all(|w| w.is_finite() && *w >= 0.0);
        if !all_valid || (sum - 1.0).abs() >= WEIGHT_TOLERANCE {
            return Err(GroveError::InvalidWeights { sum });
        }

        let names: Vec<String> = sorted.keys().cloned().collect();
        let weights: Vec<f64> = sorted.values().map(|w| w / sum).collect();
        let index = WeightedIndex::new(&weights).map_err(|_| GroveError::EmptyDistribution)?;

        Ok(Self { names, weights, index })
    }

    /// Draw one option name for `seed`.
    pub fn select(&self, seed: u64) -> &str {
        let mut rng = seeded_rng(seed);
        &self.names[self.index.sample(&mut rng)]
    }

    /// Normalized weight of `name`, if present.
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.names
            .binary_search_by(|n| n.as_str().cmp(name))
            .ok()
            .map(|i| self.weights[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weight(name).is_some()
    }

    /// Option names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PartialEq for WeightDistribution {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.weights == other.weights
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightDistribution {
    type Error = GroveError;

    fn try_from(map: BTreeMap<String, f64>) -> GroveResult<Self> {
        Self::new(map)
    }
}

impl From<WeightDistribution> for BTreeMap<String, f64> {
    fn from(dist: WeightDistribution) -> Self {
        dist.names.into_iter().zip(dist.weights).collect()
    }
}

/// A probability in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub const NEVER: Probability = Probability(0.0);
    pub const HALF: Probability = Probability(0.5);
    pub const ALWAYS: Probability = Probability(1.0);

    /// Validate `value`; `quirk` names the setting in the error.
    pub fn new(quirk: &'static str, value: f64) -> GroveResult<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GroveError::InvalidProbability { quirk, value })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Seeded coin flip: true with likelihood `probability`.
///
/// `Probability::NEVER` is false and `Probability::ALWAYS` is true for every seed.
pub fn gate(seed: u64, probability: Probability) -> bool {
    seeded_rng(seed).gen_bool(probability.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(pairs: &[(&str, f64)]) -> GroveResult<WeightDistribution> {
        WeightDistribution::new(pairs.iter().map(|(k, v)| (*k, *v)))
    }

    #[test]
    fn test_select_returns_known_keys() {
        let d = dist(&[("hills", 0.25), ("valleys", 0.25), ("ridges", 0.5)]).unwrap();
        for seed in 0..1000 {
            let pick = d.select(seed);
            assert!(d.contains(pick), "unexpected option {}", pick);
            assert_eq!(pick, d.select(seed));
        }
    }

    #[test]
    fn test_insertion_order_is_irrelevant() {
        let a = dist(&[("a", 0.3), ("b", 0.3), ("c", 0.4)]).unwrap();
        let b = dist(&[("c", 0.4), ("a", 0.3), ("b", 0.3)]).unwrap();
        assert_eq!(a, b);
        for seed in 0..200 {
            assert_eq!(a.select(seed), b.select(seed));
        }
    }

    #[test]
    fn test_single_option_always_selected() {
        let d = dist(&[("only", 1.0)]).unwrap();
        for seed in 0..500 {
            assert_eq!(d.select(seed), "only");
        }
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let d = dist(&[("never", 0.0), ("always", 1.0)]).unwrap();
        for seed in 0..1000 {
            assert_eq!(d.select(seed), "always");
        }
    }

    #[test]
    fn test_tolerance_boundary() {
        assert!(dist(&[("a", 0.999999), ("b", 0.000001)]).is_ok());
        assert!(matches!(
            dist(&[("a", 0.9), ("b", 0.05)]),
            Err(GroveError::InvalidWeights { .. })
        ));
        assert!(dist(&[("a", 0.5), ("b", 0.5000001)]).is_ok());
        assert!(dist(&[("a", 0.5), ("b", 0.50001)]).is_err());
    }

    #[test]
    fn test_rejects_empty_and_negative() {
        assert!(matches!(dist(&[]), Err(GroveError::EmptyDistribution)));
        assert!(matches!(
            dist(&[("a", 1.5), ("b", -0.5)]),
            Err(GroveError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_weights_are_normalized() {
        let d = dist(&[("a", 0.5), ("b", 0.5000005)]).unwrap();
        let total: f64 = d.names().filter_map(|n| d.weight(n)).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_both_options_reachable() {
        let d = dist(&[("a", 0.5), ("b", 0.5)]).unwrap();
        let picks: std::collections::HashSet<&str> = (0..200).map(|s| d.select(s)).collect();
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_json_round_trip_validates() {
        let d: WeightDistribution = serde_json::from_str(r#"{"hills":0.5,"valleys":0.5}"#).unwrap();
        assert_eq!(d.len(), 2);
        assert!(serde_json::from_str::<WeightDistribution>(r#"{"hills":0.5}"#).is_err());
        let back = serde_json::to_string(&d).unwrap();
        assert_eq!(back, r#"{"hills":0.5,"valleys":0.5}"#);
    }

    #[test]
    fn test_gate_extremes() {
        for seed in 0..1000 {
            assert!(!gate(seed, Probability::NEVER));
            assert!(gate(seed, Probability::ALWAYS));
        }
    }

    #[test]
    fn test_gate_is_deterministic() {
        for seed in 0..200 {
            assert_eq!(gate(seed, Probability::HALF), gate(seed, Probability::HALF));
        }
        let hits = (0..1000).filter(|s| gate(*s, Probability::HALF)).count();
        assert!(hits > 350 && hits < 650, "got {} hits", hits);
    }

    #[test]
    fn test_probability_bounds() {
        assert!(Probability::new("noise", 0.0).is_ok());
        assert!(Probability::new("noise", 1.0).is_ok());
        assert!(Probability::new("noise", 1.5).is_err());
        assert!(Probability::new("noise", f64::NAN).is_err());
    }
}
