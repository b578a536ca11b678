use serde::{Deserialize, Serialize};

use crate::Signal;

pub mod color;

pub use color::{interpolate_color, GradientPalette, Rgb};

/// Band edges of the six tiers for readings in \[-100, 0\] dBm, ascending.
pub const SIX_TIER_EDGES: [f64; 7] = [-100.0, -70.0, -60.0, -50.0, -40.0, -30.0, 0.0];

/// Inner edges of the 10 dBm bins used by [`ClassificationMode::Rounded`].
const ROUNDED_BIN_EDGES: [f64; 5] = [-75.0, -65.0, -55.0, -45.0, -35.0];
const ROUNDED_FIRST_ANCHOR: f64 = -80.0;

/// Signal quality as a percentage.
///
/// -100 dBm or weaker is 0 %, -50 dBm or stronger is 100 %, linear in between.
/// Missing or unparsable readings are 0 %.
pub fn to_percent(signal: impl Into<Signal>) -> u8 {
    let Some(dbm) = signal.into().dbm() else {
        return 0;
    };
    if dbm <= -100.0 {
        return 0;
    }
    if dbm >= -50.0 {
        return 100;
    }
    (2.0 * (dbm + 100.0)).round_ties_even().clamp(0.0, 100.0) as u8
}

/// The canonical six-tier quality table, plus the no-signal bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityTier {
    NoSignal,
    VeryPoor,
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl QualityTier {
    /// Best first. A reading belongs to the first tier whose threshold it reaches.
    const THRESHOLDS: [(f64, Self); 5] = [
        (-30.0, Self::Excellent),
        (-40.0, Self::VeryGood),
        (-50.0, Self::Good),
        (-60.0, Self::Fair),
        (-70.0, Self::Poor),
    ];

    pub fn from_signal(signal: impl Into<Signal>) -> Self {
        let Some(dbm) = signal.into().dbm() else {
            return Self::NoSignal;
        };
        Self::THRESHOLDS
            .iter()
            .find(|(threshold, _)| dbm >= *threshold)
            .map_or(Self::VeryPoor, |(_, tier)| *tier)
    }

    /// Lowest reading that still falls into this tier.
    pub fn threshold(&self) -> Option<f64> {
        Self::THRESHOLDS
            .iter()
            .find(|(_, tier)| tier == self)
            .map(|(threshold, _)| *threshold)
    }

    pub fn color(&self) -> Rgb {
        match self {
            Self::Excellent => Rgb::from_u32(0x00FFFF),
            Self::VeryGood => Rgb::from_u32(0x90EE90),
            Self::Good => Rgb::from_u32(0xADFF2F),
            Self::Fair => Rgb::from_u32(0xFFA500),
            Self::Poor => Rgb::from_u32(0xFF4500),
            Self::VeryPoor => Rgb::from_u32(0xFF0000),
            Self::NoSignal => Rgb::GRAY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very good",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very poor",
            Self::NoSignal => "No signal",
        }
    }
}

/// Discrete bucket of a reading in the canonical six-tier table.
pub fn to_bucket(signal: impl Into<Signal>) -> QualityTier {
    QualityTier::from_signal(signal)
}

/// Simplified three-level scale keyed on the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoarseQuality {
    Poor,
    Fair,
    Good,
}

impl CoarseQuality {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0..=33 => Self::Poor,
            34..=66 => Self::Fair,
            _ => Self::Good,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Self::Poor => Rgb::from_u32(0xFF0000),
            Self::Fair => Rgb::from_u32(0xFFA500),
            Self::Good => Rgb::from_u32(0x008000),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
        }
    }
}

/// Which table turns a reading into a color and label.
/// The tables disagree for the same reading, so every call site picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Six tiers on absolute dBm breakpoints.
    #[default]
    SixTier,
    /// Snap to the nearest 10 dBm anchor between -80 and -30, then use its tier.
    /// A reading exactly halfway between two anchors goes to the stronger one.
    Rounded,
    /// Three levels on the percentage: up to 33 %, up to 66 %, above.
    Coarse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub percent: u8,
    pub color: Rgb,
    pub label: &'static str,
}

impl Classification {
    fn no_signal() -> Self {
        let tier = QualityTier::NoSignal;
        Self {
            percent: 0,
            color: tier.color(),
            label: tier.label(),
        }
    }
}

/// Nearest 10 dBm anchor of a reading, clamped to \[-80, -30\].
pub fn rounded_anchor(dbm: f64) -> f64 {
    let bin = ROUNDED_BIN_EDGES.iter().filter(|edge| dbm >= **edge).count();
    ROUNDED_FIRST_ANCHOR + 10.0 * bin as f64
}

pub fn classify(signal: impl Into<Signal>, mode: ClassificationMode) -> Classification {
    let signal = signal.into();
    let Some(dbm) = signal.dbm() else {
        return Classification::no_signal();
    };
    let percent = to_percent(signal);

    let (color, label) = match mode {
        ClassificationMode::SixTier => {
            let tier = QualityTier::from_signal(dbm);
            (tier.color(), tier.label())
        }
        ClassificationMode::Rounded => {
            let tier = QualityTier::from_signal(rounded_anchor(dbm));
            (tier.color(), tier.label())
        }
        ClassificationMode::Coarse => {
            let coarse = CoarseQuality::from_percent(percent);
            (coarse.color(), coarse.label())
        }
    };

    Classification {
        percent,
        color,
        label,
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn test_to_percent_fixed_points() {
        assert_eq!(to_percent(-100.0), 0);
        assert_eq!(to_percent(-120.0), 0);
        assert_eq!(to_percent(-50.0), 100);
        assert_eq!(to_percent(-10.0), 100);
        assert_eq!(to_percent(-75.0), 50);
        assert_eq!(to_percent(-67), 66);
        assert_eq!(to_percent(f64::NEG_INFINITY), 0);
        assert_eq!(to_percent(f64::INFINITY), 100);
    }

    #[test]
    fn test_to_percent_fail_soft() {
        assert_eq!(to_percent("N/A"), 0);
        assert_eq!(to_percent(None::<f64>), 0);
        assert_eq!(to_percent("garbage"), 0);
        assert_eq!(to_percent(f64::NAN), 0);
        assert_eq!(to_percent("-60"), 80);
    }

    #[test]
    fn test_to_percent_monotonic() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut values = (0..2000)
            .map(|_| rng.gen_range(-130.0..10.0))
            .chain((-130..=10).map(|v| v as f64))
            .chain((-2010..=-490).map(|v| v as f64 / 10.0))
            .collect::<Vec<f64>>();
        values.sort_by(|a, b| a.total_cmp(b));

        for pair in values.windows(2) {
            assert!(
                to_percent(pair[0]) <= to_percent(pair[1]),
                "{} -> {} but {} -> {}",
                pair[0],
                to_percent(pair[0]),
                pair[1],
                to_percent(pair[1])
            );
        }
    }

    #[test]
    fn test_bucket_boundaries_are_inclusive() {
        assert_eq!(to_bucket(-30.0), QualityTier::Excellent);
        assert_eq!(to_bucket(-30.01), QualityTier::VeryGood);
        assert_eq!(to_bucket(-40.0), QualityTier::VeryGood);
        assert_eq!(to_bucket(-50.0), QualityTier::Good);
        assert_eq!(to_bucket(-60.0), QualityTier::Fair);
        assert_eq!(to_bucket(-70.0), QualityTier::Poor);
        assert_eq!(to_bucket(-70.5), QualityTier::VeryPoor);
        assert_eq!(to_bucket(-99.0), QualityTier::VeryPoor);
        assert_eq!(to_bucket(0.0), QualityTier::Excellent);
        assert_eq!(to_bucket("N/A"), QualityTier::NoSignal);
        assert_eq!(to_bucket("loud"), QualityTier::NoSignal);

        for tier in [
            QualityTier::Excellent,
            QualityTier::VeryGood,
            QualityTier::Good,
            QualityTier::Fair,
            QualityTier::Poor,
        ] {
            let threshold = tier.threshold().unwrap();
            assert_eq!(to_bucket(threshold), tier);
        }
        assert_eq!(QualityTier::VeryPoor.threshold(), None);
    }

    #[test]
    fn test_bucket_colors() {
        assert_eq!(to_bucket(-80).color().to_string(), "#ff0000");
        assert_eq!(to_bucket(-70).color().to_string(), "#ff4500");
        assert_eq!(to_bucket(-60).color().to_string(), "#ffa500");
        assert_eq!(to_bucket(-50).color().to_string(), "#adff2f");
        assert_eq!(to_bucket(-40).color().to_string(), "#90ee90");
        assert_eq!(to_bucket(-30).color().to_string(), "#00ffff");
        assert_eq!(to_bucket("N/A").color(), Rgb::GRAY);
        assert_eq!(to_bucket("N/A").label(), "No signal");
    }

    #[test]
    fn test_rounded_anchor() {
        assert_eq!(rounded_anchor(-100.0), -80.0);
        assert_eq!(rounded_anchor(-80.0), -80.0);
        assert_eq!(rounded_anchor(-75.5), -80.0);
        assert_eq!(rounded_anchor(-75.0), -70.0);
        assert_eq!(rounded_anchor(-52.0), -50.0);
        assert_eq!(rounded_anchor(-44.0), -40.0);
        assert_eq!(rounded_anchor(-31.0), -30.0);
        assert_eq!(rounded_anchor(-10.0), -30.0);
    }

    #[test]
    fn test_classification_modes_differ() {
        let six = classify(-52.0, ClassificationMode::SixTier);
        let rounded = classify(-52.0, ClassificationMode::Rounded);
        let coarse = classify(-52.0, ClassificationMode::Coarse);

        assert_eq!(six.percent, 96);
        assert_eq!(six.label, "Fair");
        assert_eq!(rounded.label, "Good");
        assert_eq!(coarse.label, "Good");
        assert_eq!(coarse.color, Rgb::from_u32(0x008000));

        let coarse = classify(-80.0, ClassificationMode::Coarse);
        assert_eq!(coarse.percent, 40);
        assert_eq!(coarse.label, "Fair");
        let coarse = classify(-85.0, ClassificationMode::Coarse);
        assert_eq!(coarse.label, "Poor");

        for mode in [
            ClassificationMode::SixTier,
            ClassificationMode::Rounded,
            ClassificationMode::Coarse,
        ] {
            let none = classify("N/A", mode);
            assert_eq!(none.percent, 0);
            assert_eq!(none.color, Rgb::GRAY);
            assert_eq!(none.label, "No signal");
        }
    }
}
