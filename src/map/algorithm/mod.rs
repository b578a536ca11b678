use serde::{Deserialize, Serialize};

use crate::internal_util::square_distance;

use super::lerp::Lerp;

pub mod idw;
pub mod nni;

use idw::{IDWStrategy, IDWWeights};
use nni::{NNIStrategy, NNIWeights};

/// A scalar value known at a site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub site: (f64, f64),
    pub value: f64,
}

impl Sample {
    pub fn new(site: (f64, f64), value: f64) -> Self {
        Self { site, value }
    }
}

pub trait InterpolationStrategy {
    /// Weights of the samples contributing at (x, y), as (sample index, weight).
    /// The weights are positive and sum to one.
    fn calculate_weights(&self, x: f64, y: f64) -> Option<Vec<(usize, f64)>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InterpolationMethod {
    #[serde(rename = "idw")]
    IDW(IDWStrategy),
    #[serde(rename = "nni")]
    NNI(NNIStrategy),
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        Self::IDW(IDWStrategy::default())
    }
}

impl InterpolationMethod {
    /// Prepare the weighting for a fixed sample set.
    pub fn prepare<'a>(&self, samples: &'a [Sample]) -> Box<dyn InterpolationStrategy + 'a> {
        match self {
            Self::IDW(strategy) => Box::new(IDWWeights::new(samples, *strategy)),
            Self::NNI(strategy) => Box::new(NNIWeights::new(samples, *strategy)),
        }
    }
}

/// Index of the sample closest to (x, y), with its distance.
pub(crate) fn nearest_sample(samples: &[Sample], x: f64, y: f64) -> Option<(usize, f64)> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| (i, square_distance(&sample.site, &(x, y))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, sqdist)| (i, sqdist.sqrt()))
}

/// Weighted mean accumulated as a running lerp, so the result never leaves
/// the range of the contributing values.
fn weighted_value(samples: &[Sample], weights: &[(usize, f64)]) -> Option<f64> {
    let mut total_value: Option<f64> = None;
    let mut tmp_weight = 0.0;
    for &(i, weight) in weights {
        if weight <= 0.0 || !weight.is_finite() {
            continue;
        }
        let value = samples.get(i)?.value;
        tmp_weight += weight;
        if let Some(total_value) = total_value.as_mut() {
            *total_value = total_value.lerp(&value, weight / tmp_weight);
        } else {
            total_value = Some(value);
        }
    }
    total_value
}

fn evaluate(strategy: &dyn InterpolationStrategy, samples: &[Sample], x: f64, y: f64) -> f64 {
    strategy
        .calculate_weights(x, y)
        .and_then(|weights| weighted_value(samples, &weights))
        .or_else(|| nearest_sample(samples, x, y).map(|(i, _)| samples[i].value))
        .unwrap_or(f64::NAN)
}

/// Interpolated value at a single point.
///
/// # Panics
/// Panics if `samples` is empty.
pub fn interpolate_at(samples: &[Sample], x: f64, y: f64, method: &InterpolationMethod) -> f64 {
    assert!(!samples.is_empty(), "interpolation needs at least one sample");
    evaluate(method.prepare(samples).as_ref(), samples, x, y)
}

/// Interpolated values at every (x, y) of the axes, indexed `[iy][ix]`.
///
/// # Panics
/// Panics if `samples` is empty. Callers check the sample count first.
pub fn interpolate_grid(
    samples: &[Sample],
    x_axis: &[f64],
    y_axis: &[f64],
    method: &InterpolationMethod,
) -> Vec<Vec<f64>> {
    assert!(!samples.is_empty(), "interpolation needs at least one sample");
    let strategy = method.prepare(samples);

    y_axis
        .iter()
        .map(|&y| {
            x_axis
                .iter()
                .map(|&x| evaluate(strategy.as_ref(), samples, x, y))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::internal_util::linspace;

    fn triangle() -> Vec<Sample> {
        vec![
            Sample::new((0.0, 0.0), -40.0),
            Sample::new((10.0, 0.0), -60.0),
            Sample::new((5.0, 8.0), -80.0),
        ]
    }

    fn methods() -> [InterpolationMethod; 2] {
        [
            InterpolationMethod::IDW(IDWStrategy::default()),
            InterpolationMethod::NNI(NNIStrategy::default()),
        ]
    }

    #[test]
    fn test_reproduces_samples() {
        let samples = triangle();
        for method in methods() {
            for sample in &samples {
                let (x, y) = sample.site;
                assert_eq!(interpolate_at(&samples, x, y, &method), sample.value);
                assert_eq!(interpolate_at(&samples, x + 0.05, y - 0.05, &method), sample.value);
            }
        }
    }

    #[test]
    fn test_far_point_stays_in_range() {
        let samples = triangle();
        let value = interpolate_at(
            &samples,
            1000.0,
            1000.0,
            &InterpolationMethod::IDW(IDWStrategy::default()),
        );
        assert!((-80.0..=-40.0).contains(&value));

        // far away the weights even out towards the plain mean
        assert!((value - (-60.0)).abs() < 1.0);

        let near_first = interpolate_at(
            &samples,
            -3.0,
            -3.0,
            &InterpolationMethod::IDW(IDWStrategy::default()),
        );
        assert!(near_first > -60.0);
    }

    #[test]
    fn test_grid_shape() {
        let samples = triangle();
        let x_axis = linspace(-10.0, 20.0, 30);
        let y_axis = linspace(-10.0, 18.0, 20);
        let grid = interpolate_grid(&samples, &x_axis, &y_axis, &InterpolationMethod::default());

        assert_eq!(grid.len(), 20);
        assert!(grid.iter().all(|row| row.len() == 30));
    }

    #[test]
    fn test_grid_never_extrapolates() {
        let mut rng = StdRng::seed_from_u64(42);

        for round in 0..20 {
            let n = 1 + round % 12;
            let samples = (0..n)
                .map(|_| {
                    Sample::new(
                        (rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
                        rng.gen_range(-100.0..-20.0),
                    )
                })
                .collect::<Vec<_>>();
            let min = samples.iter().map(|s| s.value).fold(f64::MAX, f64::min);
            let max = samples.iter().map(|s| s.value).fold(f64::MIN, f64::max);

            let x_axis = linspace(-70.0, 70.0, 25);
            let y_axis = linspace(-70.0, 70.0, 25);

            for method in methods() {
                let grid = interpolate_grid(&samples, &x_axis, &y_axis, &method);
                for value in grid.iter().flatten() {
                    assert!(
                        *value >= min - 1e-9 && *value <= max + 1e-9,
                        "{} outside [{}, {}]",
                        value,
                        min,
                        max
                    );
                }
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_empty_samples_panics() {
        interpolate_grid(&[], &[0.0], &[0.0], &InterpolationMethod::default());
    }

    #[test]
    fn test_weighted_value_skips_zero_weights() {
        let samples = triangle();
        let value = weighted_value(&samples, &[(0, 0.0), (2, 0.0), (1, 1.0)]);
        assert_eq!(value, Some(-60.0));
        assert_eq!(weighted_value(&samples, &[(0, 0.0)]), None);
    }
}
