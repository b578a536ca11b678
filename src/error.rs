use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeatmapError {
    #[error("at least {required} measured points are needed to build a heatmap, found {found}")]
    InsufficientSamples { found: usize, required: usize },

    #[error("grid resolution must be at least 2, got {0}")]
    InvalidResolution(usize),

    #[error("grid margin must be finite and non-negative, got {0}")]
    InvalidMargin(f64),

    #[error("minimum sample count must be at least 1")]
    InvalidMinSamples,

    #[error("manual reading must be a whole number between -100 and 0 dBm, got {0:?}")]
    InvalidManualReading(String),

    #[error("invalid point identifier {0:?}")]
    InvalidPointId(String),

    #[error("failed to trace quality zones: {0}")]
    Vectorization(String),
}
