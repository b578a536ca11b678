use serde::{Deserialize, Serialize};

use crate::internal_util::distance;

use super::{nearest_sample, InterpolationStrategy, Sample};

/// The strategy for the Inverse Distance Weighting (IDW) interpolation.
///
/// A sample closer than `tolerance` to the query point is returned as is.
/// Otherwise each sample weighs `1 / (distance + offset)^weight_power`.
#[derive(Debug, Clone, PartialEq, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IDWStrategy {
    pub tolerance: f64,
    pub offset: f64,
    pub weight_power: f64,
}

impl Default for IDWStrategy {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            offset: 0.1,
            weight_power: 1.0,
        }
    }
}

enum IDWWeight {
    Inside(f64),
    Equal,
}

/// Calculate the IDW weight for a single sample at `distance`.
fn calculate_idw_weight(distance: f64, strategy: &IDWStrategy) -> IDWWeight {
    let shifted = distance + strategy.offset;
    if distance < strategy.tolerance || shifted <= 0.0 {
        return IDWWeight::Equal;
    }
    IDWWeight::Inside(shifted.powf(-strategy.weight_power))
}

/// Calculate the IDW weights of every sample at (x, y).
pub fn calculate_idw_weights(
    samples: &[Sample],
    x: f64,
    y: f64,
    strategy: &IDWStrategy,
) -> Option<Vec<(usize, f64)>> {
    let (nearest, nearest_distance) = nearest_sample(samples, x, y)?;
    if let IDWWeight::Equal = calculate_idw_weight(nearest_distance, strategy) {
        return Some(vec![(nearest, 1.0)]);
    }

    let mut weights = samples
        .iter()
        .enumerate()
        .filter_map(
            |(i, sample)| match calculate_idw_weight(distance(&sample.site, &(x, y)), strategy) {
                IDWWeight::Inside(w) => Some((i, w)),
                IDWWeight::Equal => None,
            },
        )
        .collect::<Vec<_>>();

    let sum = weights.iter().map(|(_, w)| w).sum::<f64>();

    if sum == 0.0 || !sum.is_finite() {
        return Some(vec![(nearest, 1.0)]);
    }

    for (_, w) in &mut weights {
        *w /= sum;
    }

    Some(weights)
}

/// IDW weighting bound to one sample set.
pub struct IDWWeights<'a> {
    samples: &'a [Sample],
    strategy: IDWStrategy,
}

impl<'a> IDWWeights<'a> {
    pub fn new(samples: &'a [Sample], strategy: IDWStrategy) -> Self {
        Self { samples, strategy }
    }
}

impl InterpolationStrategy for IDWWeights<'_> {
    fn calculate_weights(&self, x: f64, y: f64) -> Option<Vec<(usize, f64)>> {
        calculate_idw_weights(self.samples, x, y, &self.strategy)
    }
}
