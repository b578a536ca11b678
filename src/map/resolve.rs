use std::collections::HashMap;

use crate::PointId;

use super::Measurement;

/// Turns a stored point into the coordinates used for interpolation.
pub trait CoordinateResolver {
    /// `None` when the point cannot be placed; such points are left out of the heatmap.
    fn resolve(&self, id: &PointId, measurement: &Measurement) -> Option<(f64, f64)>;

    /// Smallest number of valid points this layout needs for a meaningful heatmap.
    fn suggested_min_samples(&self) -> usize;
}

/// Points placed freely, e.g. by clicking on a floor plan.
/// Every measurement carries its own coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FreePlacement;

impl CoordinateResolver for FreePlacement {
    fn resolve(&self, _: &PointId, measurement: &Measurement) -> Option<(f64, f64)> {
        Some(measurement.coordinates())
    }

    fn suggested_min_samples(&self) -> usize {
        3
    }
}

/// Points measured at fixed positions inside named locations.
/// A point sits at its location's base offset plus its relative position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridAssignment {
    locations: HashMap<String, (f64, f64)>,
    points: HashMap<String, (f64, f64)>,
}

impl GridAssignment {
    pub fn new(locations: HashMap<String, (f64, f64)>, points: HashMap<String, (f64, f64)>) -> Self {
        Self { locations, points }
    }

    /// `size` × `size` points named `Point 1` .. `Point N`, row by row from the
    /// top, centred on the location origin.
    pub fn square_layout(size: usize, spacing: f64) -> Self {
        let half = (size as f64 - 1.0) / 2.0;
        let points = (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .map(|(row, col)| {
                (
                    format!("Point {}", row * size + col + 1),
                    ((col as f64 - half) * spacing, (half - row as f64) * spacing),
                )
            })
            .collect();
        Self {
            locations: HashMap::new(),
            points,
        }
    }

    /// Five points per location: the centre and the four corners.
    pub fn cross_layout(spacing: f64) -> Self {
        let points = [
            ("Center", (0.0, 0.0)),
            ("Upper Right", (spacing, spacing)),
            ("Upper Left", (-spacing, spacing)),
            ("Lower Right", (spacing, -spacing)),
            ("Lower Left", (-spacing, -spacing)),
        ]
        .into_iter()
        .map(|(name, offset)| (name.to_string(), offset))
        .collect();
        Self {
            locations: HashMap::new(),
            points,
        }
    }

    pub fn with_location(mut self, name: impl Into<String>, origin: (f64, f64)) -> Self {
        self.locations.insert(name.into(), origin);
        self
    }

    pub fn locations(&self) -> impl Iterator<Item = (&String, &(f64, f64))> {
        self.locations.iter()
    }

    /// Number of points in every location.
    pub fn cardinality(&self) -> usize {
        self.points.len()
    }
}

impl CoordinateResolver for GridAssignment {
    fn resolve(&self, id: &PointId, _: &Measurement) -> Option<(f64, f64)> {
        let base = self.locations.get(id.location.as_deref()?)?;
        let relative = self.points.get(&id.name)?;
        Some((base.0 + relative.0, base.1 + relative.1))
    }

    fn suggested_min_samples(&self) -> usize {
        self.cardinality()
    }
}
