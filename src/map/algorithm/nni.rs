use naturalneighbor::{Interpolator, Point};
use serde::{Deserialize, Serialize};

use crate::internal_util::all_collinear;

use super::{
    idw::{IDWStrategy, IDWWeights},
    InterpolationStrategy, Sample,
};

/// The strategy for the Natural Neighbor Interpolation (NNI).
///
/// Natural neighbours are only defined inside the convex hull of the samples,
/// so queries outside it, and sample sets without a triangulation, use IDW.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NNIStrategy {
    pub fallback: IDWStrategy,
}

/// NNI weighting bound to one sample set, with the triangulation built once.
pub struct NNIWeights<'a> {
    interpolator: Option<Interpolator>,
    fallback: IDWWeights<'a>,
    tolerance: f64,
    samples: &'a [Sample],
}

impl<'a> NNIWeights<'a> {
    pub fn new(samples: &'a [Sample], strategy: NNIStrategy) -> Self {
        let sites = samples.iter().map(|sample| sample.site).collect::<Vec<_>>();

        let interpolator = if samples.len() < 3 || all_collinear(&sites) {
            None
        } else {
            let points = sites
                .iter()
                .map(|site| Point {
                    x: site.0,
                    y: site.1,
                })
                .collect::<Vec<_>>();
            Some(Interpolator::new(&points))
        };

        Self {
            interpolator,
            fallback: IDWWeights::new(samples, strategy.fallback),
            tolerance: strategy.fallback.tolerance,
            samples,
        }
    }

    fn calculate_nni_weights(&self, x: f64, y: f64) -> Option<Vec<(usize, f64)>> {
        let interpolator = self.interpolator.as_ref()?;

        let mut weights = interpolator
            .query_weights(Point { x, y })
            .ok()??
            .iter()
            .filter(|(idx, weight)| *idx < self.samples.len() && *weight > 0.0)
            .map(|(idx, weight)| (*idx, *weight))
            .collect::<Vec<_>>();

        let sum = weights.iter().map(|(_, w)| w).sum::<f64>();

        if sum == 0.0 || !sum.is_finite() {
            return None;
        }

        for (_, w) in &mut weights {
            *w /= sum;
        }

        Some(weights)
    }
}

impl InterpolationStrategy for NNIWeights<'_> {
    fn calculate_weights(&self, x: f64, y: f64) -> Option<Vec<(usize, f64)>> {
        if let Some((nearest, distance)) = super::nearest_sample(self.samples, x, y) {
            if distance < self.tolerance {
                return Some(vec![(nearest, 1.0)]);
            }
        }

        self.calculate_nni_weights(x, y)
            .or_else(|| self.fallback.calculate_weights(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Sample> {
        vec![
            Sample::new((0.0, 0.0), -40.0),
            Sample::new((10.0, 0.0), -50.0),
            Sample::new((10.0, 10.0), -60.0),
            Sample::new((0.0, 10.0), -70.0),
            Sample::new((5.0, 5.0), -55.0),
        ]
    }

    #[test]
    fn test_weights_inside_hull() {
        let samples = square();
        let weights = NNIWeights::new(&samples, NNIStrategy::default());

        let w = weights.calculate_weights(3.0, 4.0).unwrap();
        let sum = w.iter().map(|(_, w)| w).sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(w.iter().all(|(i, w)| *i < samples.len() && *w > 0.0));
    }

    #[test]
    fn test_outside_hull_still_weighs() {
        let samples = square();
        let weights = NNIWeights::new(&samples, NNIStrategy::default());

        let w = weights.calculate_weights(40.0, -25.0).unwrap();
        let sum = w.iter().map(|(_, w)| w).sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(w.iter().all(|(i, _)| *i < samples.len()));
    }

    #[test]
    fn test_degenerate_sets_use_fallback() {
        let collinear = [
            Sample::new((0.0, 0.0), -40.0),
            Sample::new((1.0, 1.0), -50.0),
            Sample::new((2.0, 2.0), -60.0),
        ];
        let weights = NNIWeights::new(&collinear, NNIStrategy::default());
        assert!(weights.interpolator.is_none());
        assert_eq!(weights.calculate_weights(1.0, 0.0).unwrap().len(), 3);

        let pair = [Sample::new((0.0, 0.0), -40.0), Sample::new((1.0, 0.0), -50.0)];
        let weights = NNIWeights::new(&pair, NNIStrategy::default());
        assert!(weights.interpolator.is_none());
    }
}
