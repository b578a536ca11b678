use rand::{rngs::StdRng, Rng, SeedableRng};
use signal_heatmap::{
    map::{
        algorithm::{idw::IDWStrategy, nni::NNIStrategy, InterpolationMethod},
        lerp::MarginPolicy,
        resolve::{FreePlacement, GridAssignment},
    },
    quality::{GradientPalette, SIX_TIER_EDGES},
    ClassificationMode, HeatmapGridBuilder, HeatmapResult, MeasurementStore, PointId,
};

fn main() {
    tracing_subscriber::fmt::init();

    std::fs::create_dir_all("data/output").unwrap();

    // a router at (120, 80) on a 400 x 300 floor plan
    let mut rng = StdRng::seed_from_u64(0);
    let mut store = MeasurementStore::new();
    for i in 0..25 {
        let x = rng.gen_range(0.0..400.0);
        let y = rng.gen_range(0.0..300.0);
        let d = ((x - 120.0f64).powi(2) + (y - 80.0f64).powi(2)).sqrt();
        let dbm = (-35.0 - d * 0.15 + rng.gen_range(-3.0..3.0)).max(-95.0);
        store.record(PointId::new(format!("P{}", i + 1)), (x, y), dbm);
    }

    let palette = GradientPalette::default();

    let idw = HeatmapGridBuilder::new(FreePlacement)
        .resolution(300)
        .method(InterpolationMethod::IDW(IDWStrategy::default()))
        .generate(&store)
        .unwrap();
    save_heatmap(&idw, &palette, "data/output/survey-heatmap-idw.png");

    let nni = HeatmapGridBuilder::new(FreePlacement)
        .resolution(300)
        .method(InterpolationMethod::NNI(NNIStrategy::default()))
        .classification(ClassificationMode::Rounded)
        .generate(&store)
        .unwrap();
    save_heatmap(&nni, &palette, "data/output/survey-heatmap-nni.png");

    for band in idw.grid.quality_zones(&SIX_TIER_EDGES, true).unwrap() {
        println!(
            "[{:>6.1}, {:>6.1}) dBm: {} polygons",
            band.min,
            band.max,
            band.polygons.len()
        );
    }

    // two rooms surveyed on a 4 x 4 grid each
    let layout = GridAssignment::square_layout(4, 1.0)
        .with_location("Bathroom", (0.0, 0.0))
        .with_location("Kitchen", (5.0, 0.0));
    let mut rooms = MeasurementStore::new();
    for (location, base) in [("Bathroom", -70.0), ("Kitchen", -45.0)] {
        for n in 1..=16 {
            rooms.record(
                PointId::located(location, format!("Point {}", n)),
                (0.0, 0.0),
                base + rng.gen_range(-6.0..6.0),
            );
        }
    }

    let rooms_heatmap = HeatmapGridBuilder::new(layout)
        .resolution(200)
        .margin(MarginPolicy::Proportional(0.1))
        .generate(&rooms)
        .unwrap();
    save_heatmap(&rooms_heatmap, &palette, "data/output/survey-heatmap-rooms.png");

    for summary in rooms.location_summaries() {
        println!(
            "{}: {}/{} valid, average {:.1} dBm",
            summary.location,
            summary.valid,
            summary.measured,
            summary.average_dbm.unwrap_or(f64::NAN)
        );
    }
}

fn save_heatmap(result: &HeatmapResult, palette: &GradientPalette, filename: &str) {
    let width = result.grid.width();
    let height = result.grid.height();
    let colors = result.grid.colorize(palette);

    let mut image_buf = image::RgbImage::new(width as u32, height as u32);

    // image rows go downwards, the y axis goes upwards
    for (iy, row) in colors.iter().enumerate() {
        for (ix, color) in row.iter().enumerate() {
            image_buf.put_pixel(
                ix as u32,
                (height - 1 - iy) as u32,
                image::Rgb(color.to_array()),
            );
        }
    }

    let ((min_x, min_y), (max_x, max_y)) = result.grid.corners;
    for sample in &result.samples {
        let px = (sample.site.0 - min_x) / (max_x - min_x) * (width - 1) as f64;
        let py = (max_y - sample.site.1) / (max_y - min_y) * (height - 1) as f64;
        let color = image::Rgb(sample.classification.color.to_array());
        for dy in -2i64..=2 {
            for dx in -2i64..=2 {
                let x = px as i64 + dx;
                let y = py as i64 + dy;
                if (0..width as i64).contains(&x) && (0..height as i64).contains(&y) {
                    image_buf.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }

    image_buf.save(filename).unwrap();
    println!(
        "{}: {} samples, {:.1} to {:.1} dBm (average {:.1})",
        filename, result.stats.count, result.stats.min, result.stats.max, result.stats.average
    );
}
