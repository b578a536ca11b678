use serde::{Deserialize, Serialize};

use crate::{
    internal_util::{corners_of, linspace},
    quality::{classify, ClassificationMode, GradientPalette, Rgb},
    HeatmapError,
};

use super::algorithm::{interpolate_grid, InterpolationMethod, Sample};

pub mod vectorization;

pub type Corners = ((f64, f64), (f64, f64));

pub trait Lerp {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// How far the grid extends past the outermost samples on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginPolicy {
    /// Fixed distance in coordinate units.
    Absolute(f64),
    /// Fraction of the sample range along each axis.
    Proportional(f64),
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self::Absolute(10.0)
    }
}

impl MarginPolicy {
    pub fn validate(&self) -> Result<(), HeatmapError> {
        let value = match self {
            Self::Absolute(value) | Self::Proportional(value) => *value,
        };
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(HeatmapError::InvalidMargin(value))
        }
    }

    /// Expand the corners by this margin.
    /// A proportional margin leaves an axis with zero range unchanged.
    pub fn expand(&self, corners: Corners) -> Corners {
        let ((min_x, min_y), (max_x, max_y)) = corners;
        let (margin_x, margin_y) = match self {
            Self::Absolute(margin) => (*margin, *margin),
            Self::Proportional(ratio) => ((max_x - min_x) * ratio, (max_y - min_y) * ratio),
        };
        ((min_x - margin_x, min_y - margin_y), (max_x + margin_x, max_y + margin_y))
    }
}

/// Evaluation axes of a heatmap grid and the region they span.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxes {
    pub x_axis: Vec<f64>,
    pub y_axis: Vec<f64>,
    pub corners: Corners,
}

/// Lay out `resolution` × `resolution` evaluation points over the bounding box
/// of `sites` expanded by `margin`.
pub fn build_axes(
    sites: &[(f64, f64)],
    resolution: usize,
    margin: MarginPolicy,
) -> Result<GridAxes, HeatmapError> {
    if resolution < 2 {
        return Err(HeatmapError::InvalidResolution(resolution));
    }
    margin.validate()?;
    if sites.is_empty() {
        return Err(HeatmapError::InsufficientSamples {
            found: 0,
            required: 1,
        });
    }

    let corners = margin.expand(corners_of(sites.iter()));
    let ((min_x, min_y), (max_x, max_y)) = corners;

    Ok(GridAxes {
        x_axis: linspace(min_x, max_x, resolution),
        y_axis: linspace(min_y, max_y, resolution),
        corners,
    })
}

/// Interpolated values over a regular grid, indexed `values[iy][ix]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub x_axis: Vec<f64>,
    pub y_axis: Vec<f64>,
    pub corners: Corners,
    pub values: Vec<Vec<f64>>,
}

impl HeatmapGrid {
    /// Interpolate `samples` at every point of `axes`.
    ///
    /// # Panics
    /// Panics if `samples` is empty.
    pub fn rasterise(samples: &[Sample], axes: GridAxes, method: &InterpolationMethod) -> Self {
        let values = interpolate_grid(samples, &axes.x_axis, &axes.y_axis, method);
        Self {
            x_axis: axes.x_axis,
            y_axis: axes.y_axis,
            corners: axes.corners,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.x_axis.len()
    }

    pub fn height(&self) -> usize {
        self.y_axis.len()
    }

    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        self.values.get(iy).and_then(|row| row.get(ix)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((f64, f64), f64)> + '_ {
        self.values.iter().zip(&self.y_axis).flat_map(move |(row, y)| {
            row.iter()
                .zip(&self.x_axis)
                .map(move |(value, x)| ((*x, *y), *value))
        })
    }

    /// Smallest and largest interpolated value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |range, &value| match range {
            None => Some((value, value)),
            Some((min, max)) => Some((value.min(min), value.max(max))),
        })
    }

    /// Continuous colors for every cell, for smooth heatmap rendering.
    pub fn colorize(&self, palette: &GradientPalette) -> Vec<Vec<Rgb>> {
        self.values
            .iter()
            .map(|row| row.iter().map(|value| palette.color_at(*value)).collect())
            .collect()
    }

    /// Discrete tier colors for every cell.
    pub fn classify_cells(&self, mode: ClassificationMode) -> Vec<Vec<Rgb>> {
        self.values
            .iter()
            .map(|row| row.iter().map(|value| classify(*value, mode).color).collect())
            .collect()
    }
}
