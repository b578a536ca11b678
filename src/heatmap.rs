//! Turns a snapshot of the measurement store into a render-ready heatmap.
//!
//! The pipeline is: resolve every valid reading to a site, lay out the grid
//! axes around the sites, interpolate the grid, then attach per-sample
//! classifications and summary statistics. Nothing is kept between calls.

use tracing::{debug, warn};

use crate::{
    config::HeatmapConfig,
    map::{
        algorithm::{InterpolationMethod, Sample},
        lerp::{build_axes, GridAxes, HeatmapGrid, MarginPolicy},
        resolve::CoordinateResolver,
        MeasurementStore,
    },
    quality::{classify, Classification, ClassificationMode},
    HeatmapError, PointId,
};

/// Summary of a set of dBm readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub count: usize,
}

impl Statistics {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0;
        let mut sum = 0.0;
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            max,
            average: sum / count as f64,
            count,
        })
    }
}

/// A measured point as drawn on top of the heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMarker {
    pub id: PointId,
    pub site: (f64, f64),
    pub dbm: f64,
    pub classification: Classification,
}

impl SampleMarker {
    pub fn label(&self) -> String {
        self.id.to_string()
    }

    pub fn as_sample(&self) -> Sample {
        Sample::new(self.site, self.dbm)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapResult {
    pub grid: HeatmapGrid,
    pub samples: Vec<SampleMarker>,
    pub stats: Statistics,
}

/// Builds heatmaps from measurement stores.
/// Only holds its settings; every call works on the store it is given.
#[derive(Debug, Clone)]
pub struct HeatmapGridBuilder<R: CoordinateResolver> {
    resolver: R,
    resolution: usize,
    margin: MarginPolicy,
    min_samples: usize,
    method: InterpolationMethod,
    classification: ClassificationMode,
}

impl<R: CoordinateResolver> HeatmapGridBuilder<R> {
    pub fn new(resolver: R) -> Self {
        let min_samples = resolver.suggested_min_samples();
        Self {
            resolver,
            resolution: 100,
            margin: MarginPolicy::default(),
            min_samples,
            method: InterpolationMethod::default(),
            classification: ClassificationMode::default(),
        }
    }

    pub fn from_config(resolver: R, config: &HeatmapConfig) -> Self {
        let builder = Self::new(resolver)
            .resolution(config.resolution)
            .margin(config.margin)
            .method(config.interpolation)
            .classification(config.classification);
        match config.min_samples {
            Some(min_samples) => builder.min_samples(min_samples),
            None => builder,
        }
    }

    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn margin(mut self, margin: MarginPolicy) -> Self {
        self.margin = margin;
        self
    }

    pub fn min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn classification(mut self, classification: ClassificationMode) -> Self {
        self.classification = classification;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Valid readings with their resolved sites, ordered by point id.
    pub fn extract_samples(&self, store: &MeasurementStore) -> Vec<SampleMarker> {
        let mut samples = store
            .iter()
            .filter_map(|(id, measurement)| {
                let dbm = measurement.signal().dbm()?;
                let Some(site) = self.resolver.resolve(id, measurement) else {
                    warn!(point = %id, "point has no known position, left out of the heatmap");
                    return None;
                };
                Some(SampleMarker {
                    id: id.clone(),
                    site,
                    dbm,
                    classification: classify(dbm, self.classification),
                })
            })
            .collect::<Vec<_>>();
        samples.sort_by(|a, b| a.id.cmp(&b.id));
        samples
    }

    pub fn build_grid(&self, samples: &[SampleMarker]) -> Result<GridAxes, HeatmapError> {
        let sites = samples.iter().map(|sample| sample.site).collect::<Vec<_>>();
        build_axes(&sites, self.resolution, self.margin)
    }

    pub fn generate(&self, store: &MeasurementStore) -> Result<HeatmapResult, HeatmapError> {
        if self.min_samples == 0 {
            return Err(HeatmapError::InvalidMinSamples);
        }

        let samples = self.extract_samples(store);
        if samples.len() < self.min_samples {
            return Err(HeatmapError::InsufficientSamples {
                found: samples.len(),
                required: self.min_samples,
            });
        }

        let stats = Statistics::from_values(samples.iter().map(|sample| sample.dbm)).ok_or(
            HeatmapError::InsufficientSamples {
                found: 0,
                required: self.min_samples,
            },
        )?;

        let axes = self.build_grid(&samples)?;
        debug!(
            samples = samples.len(),
            resolution = self.resolution,
            corners = ?axes.corners,
            "interpolating heatmap grid"
        );

        let points = samples.iter().map(SampleMarker::as_sample).collect::<Vec<_>>();
        let grid = HeatmapGrid::rasterise(&points, axes, &self.method);

        Ok(HeatmapResult {
            grid,
            samples,
            stats,
        })
    }
}
