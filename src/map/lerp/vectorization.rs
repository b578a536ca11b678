use contour::ContourBuilder;

use crate::HeatmapError;

use super::HeatmapGrid;

/// Region of the grid whose interpolated value lies in `[min, max)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub polygons: Vec<Vec<(f64, f64)>>,
}

impl HeatmapGrid {
    /// Trace the areas between consecutive `thresholds` (ascending) as polygons
    /// in grid coordinates. Pass [`crate::quality::SIX_TIER_EDGES`] for one band
    /// per quality tier.
    pub fn quality_zones(&self, thresholds: &[f64], smooth: bool) -> Result<Vec<Band>, HeatmapError> {
        let width = self.width();
        let height = self.height();
        if thresholds.len() < 2 || width < 2 || height < 2 {
            return Ok(vec![]);
        }

        let raster = self.values.iter().flatten().copied().collect::<Vec<f64>>();

        let ((min_x, min_y), (max_x, max_y)) = self.corners;
        let step_x = (max_x - min_x) / (width - 1) as f64;
        let step_y = (max_y - min_y) / (height - 1) as f64;

        // traced vertices are in cell units
        let result_coord_to_domain = |x: f64, y: f64| {
            (
                (min_x + x * step_x).clamp(min_x, max_x),
                (min_y + y * step_y).clamp(min_y, max_y),
            )
        };

        let bands = ContourBuilder::new(width, height, smooth)
            .isobands(&raster, thresholds)
            .map_err(|e| HeatmapError::Vectorization(e.to_string()))?;

        Ok(bands
            .iter()
            .map(|band| {
                let polygons = band
                    .geometry()
                    .iter()
                    .map(|polygon| {
                        polygon
                            .exterior()
                            .0
                            .iter()
                            .map(|coord| result_coord_to_domain(coord.x, coord.y))
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>();

                Band {
                    min: band.min_v(),
                    max: band.max_v(),
                    polygons,
                }
            })
            .collect())
    }
}
