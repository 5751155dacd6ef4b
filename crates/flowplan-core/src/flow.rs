//! Resource flow algebra.
//!
//! A [`ResourceFlow`] maps resource types to signed per-minute rates. Positive
//! values are produced or available, negative values consumed. A missing key
//! reads as zero. All operations are total: degenerate numeric input is
//! neutralized here and never reaches callers as an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceRate, ResourceType};

/// Mapping from resource type to quantity per minute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceFlow {
    rates: HashMap<ResourceType, f64>,
}

impl ResourceFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flow from template rates. Repeated resources accumulate.
    pub fn from_rates<'a>(rates: impl IntoIterator<Item = &'a ResourceRate>) -> Self {
        let mut flow = Self::new();
        for rate in rates {
            *flow.rates.entry(rate.resource).or_insert(0.0) += rate.quantity_per_minute;
        }
        flow
    }

    /// Rate for `resource`, or zero when absent.
    pub fn get(&self, resource: ResourceType) -> f64 {
        self.rates.get(&resource).copied().unwrap_or(0.0)
    }

    /// Whether `resource` has an entry (even a zero one).
    pub fn contains(&self, resource: ResourceType) -> bool {
        self.rates.contains_key(&resource)
    }

    pub fn set(&mut self, resource: ResourceType, rate: f64) {
        self.rates.insert(resource, rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterate over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, f64)> + '_ {
        self.rates.iter().map(|(&resource, &rate)| (resource, rate))
    }

    /// Entries sorted by resource type, for stable display and comparison.
    pub fn sorted(&self) -> Vec<(ResourceType, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(resource, _)| *resource);
        entries
    }

    /// Compare two flows key by key, treating absent keys as zero.
    pub fn approx_eq(&self, other: &ResourceFlow, tolerance: f64) -> bool {
        self.rates
            .keys()
            .chain(other.rates.keys())
            .all(|&resource| (self.get(resource) - other.get(resource)).abs() <= tolerance)
    }

    pub fn added(mut self, other: &ResourceFlow) -> Self {
        add(&mut self, other);
        self
    }

    pub fn subtracted(mut self, other: &ResourceFlow) -> Self {
        subtract(&mut self, other);
        self
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        scale(&mut self, factor);
        self
    }
}

impl FromIterator<(ResourceType, f64)> for ResourceFlow {
    fn from_iter<I: IntoIterator<Item = (ResourceType, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// `left[k] += right[k]` for every key of `right`.
pub fn add(left: &mut ResourceFlow, right: &ResourceFlow) {
    for (resource, rate) in right.iter() {
        *left.rates.entry(resource).or_insert(0.0) += rate;
    }
}

/// `left[k] -= right[k]` for every key of `right`.
pub fn subtract(left: &mut ResourceFlow, right: &ResourceFlow) {
    for (resource, rate) in right.iter() {
        *left.rates.entry(resource).or_insert(0.0) -= rate;
    }
}

/// Map a multiplier onto the range the algebra accepts.
///
/// NaN becomes 1 (leave values untouched), negatives including negative
/// infinity become 0, positive infinity becomes 1.
pub fn sanitize_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        return 1.0;
    }
    if factor < 0.0 {
        return 0.0;
    }
    if factor.is_infinite() {
        return 1.0;
    }
    factor
}

/// Multiply every entry of `flow` by the sanitized `factor`.
pub fn scale(flow: &mut ResourceFlow, factor: f64) {
    if factor.is_nan() {
        return;
    }
    let factor = sanitize_factor(factor);
    for rate in flow.rates.values_mut() {
        *rate *= factor;
    }
}

/// Bottleneck fraction: the largest uniform scale-down of `required` that
/// `available` can supply.
///
/// Returns 1 when nothing is required and `f64::NEG_INFINITY` when any
/// required resource is missing from `available` entirely. A 0/0 quotient
/// (a zero requirement of an exhausted resource) places no constraint.
pub fn divide(available: &ResourceFlow, required: &ResourceFlow) -> f64 {
    if required.is_empty() {
        return 1.0;
    }

    let mut ratio = f64::INFINITY;
    for (resource, needed) in required.iter() {
        let Some(&have) = available.rates.get(&resource) else {
            return f64::NEG_INFINITY;
        };
        let quotient = have / needed;
        if quotient < ratio {
            ratio = quotient;
        }
    }
    ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResourceType::*;

    fn flow(entries: &[(ResourceType, f64)]) -> ResourceFlow {
        entries.iter().copied().collect()
    }

    #[test]
    fn add_creates_missing_keys() {
        let mut left = flow(&[(IronOre, 10.0)]);
        add(&mut left, &flow(&[(IronOre, 5.0), (Coal, 3.0)]));
        assert_eq!(left.get(IronOre), 15.0);
        assert_eq!(left.get(Coal), 3.0);
    }

    #[test]
    fn subtract_negates_missing_keys() {
        let mut left = flow(&[(IronOre, 10.0)]);
        subtract(&mut left, &flow(&[(IronOre, 4.0), (Water, 7.5)]));
        assert_eq!(left.get(IronOre), 6.0);
        assert_eq!(left.get(Water), -7.5);
        assert!(left.contains(Water));
    }

    #[test]
    fn absent_reads_as_zero() {
        let f = ResourceFlow::new();
        assert_eq!(f.get(Screw), 0.0);
        assert!(!f.contains(Screw));
    }

    #[test]
    fn from_rates_accumulates_duplicates() {
        let rates = [
            ResourceRate::new(IronIngot, 10.0),
            ResourceRate::new(IronIngot, 5.0),
        ];
        let f = ResourceFlow::from_rates(&rates);
        assert_eq!(f.len(), 1);
        assert_eq!(f.get(IronIngot), 15.0);
    }

    #[test]
    fn scale_guards() {
        let base = flow(&[(IronOre, 30.0), (Coal, 15.0)]);

        let mut nan = base.clone();
        scale(&mut nan, f64::NAN);
        assert_eq!(nan, base);

        let mut inf = base.clone();
        scale(&mut inf, f64::INFINITY);
        assert_eq!(inf, base);

        let mut neg = base.clone();
        scale(&mut neg, -1.0);
        assert_eq!(neg.get(IronOre), 0.0);
        assert_eq!(neg.get(Coal), 0.0);

        let mut neg_inf = base.clone();
        scale(&mut neg_inf, f64::NEG_INFINITY);
        assert_eq!(neg_inf.get(IronOre), 0.0);

        let mut half = base;
        scale(&mut half, 0.5);
        assert_eq!(half.get(IronOre), 15.0);
        assert_eq!(half.get(Coal), 7.5);
    }

    #[test]
    fn divide_empty_requirement_is_one() {
        assert_eq!(divide(&flow(&[(IronOre, 1.0)]), &ResourceFlow::new()), 1.0);
        assert_eq!(divide(&ResourceFlow::new(), &ResourceFlow::new()), 1.0);
    }

    #[test]
    fn divide_missing_resource_is_negative_infinity() {
        let required = flow(&[(IronOre, 30.0)]);
        assert_eq!(divide(&ResourceFlow::new(), &required), f64::NEG_INFINITY);

        let available = flow(&[(IronOre, 60.0)]);
        let both = flow(&[(IronOre, 30.0), (Coal, 10.0)]);
        assert_eq!(divide(&available, &both), f64::NEG_INFINITY);
    }

    #[test]
    fn divide_takes_scarcest_input() {
        let available = flow(&[(IronOre, 15.0), (Coal, 30.0)]);
        let required = flow(&[(IronOre, 30.0), (Coal, 15.0)]);
        assert_eq!(divide(&available, &required), 0.5);
    }

    #[test]
    fn divide_reports_surplus_above_one() {
        let available = flow(&[(IronOre, 60.0)]);
        let required = flow(&[(IronOre, 30.0)]);
        assert_eq!(divide(&available, &required), 2.0);
    }

    #[test]
    fn divide_ignores_zero_over_zero() {
        let available = flow(&[(IronOre, 0.0), (Coal, 10.0)]);
        let required = flow(&[(IronOre, 0.0), (Coal, 20.0)]);
        assert_eq!(divide(&available, &required), 0.5);
    }

    #[test]
    fn divide_negative_pool_goes_negative() {
        let available = flow(&[(IronOre, -5.0)]);
        let required = flow(&[(IronOre, 10.0)]);
        assert!(divide(&available, &required) < 0.0);
    }

    #[test]
    fn approx_eq_treats_missing_as_zero() {
        let a = flow(&[(IronOre, 1.0), (Coal, 0.0)]);
        let b = flow(&[(IronOre, 1.0 + 1e-12)]);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&flow(&[(IronOre, 2.0)]), 1e-9));
    }

    #[test]
    fn sorted_is_canonical() {
        let f = flow(&[(Screw, 1.0), (IronOre, 2.0), (Coal, 3.0)]);
        let keys: Vec<_> = f.sorted().into_iter().map(|(r, _)| r).collect();
        assert_eq!(keys, vec![IronOre, Coal, Screw]);
    }
}
