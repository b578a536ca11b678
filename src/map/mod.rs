use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::{
    heatmap::Statistics,
    internal_util::corners_of,
    quality::{classify, to_percent, Classification, ClassificationMode, QualityTier},
    scan::ScanOutcome,
    HeatmapError, PointId, Signal,
};

pub mod algorithm;
pub mod lerp;
pub mod resolve;
#[cfg(feature = "serialize")]
pub mod rw;

/// One surveyed point.
/// The coordinates are fixed when the point is first measured; re-measuring
/// replaces the reading and timestamp only.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    coordinates: (f64, f64),
    signal: Signal,
    timestamp: DateTime<Utc>,
}

impl Measurement {
    pub fn new(coordinates: (f64, f64), signal: impl Into<Signal>) -> Self {
        Self::with_timestamp(coordinates, signal, Utc::now())
    }

    pub fn with_timestamp(
        coordinates: (f64, f64),
        signal: impl Into<Signal>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            coordinates,
            signal: signal.into(),
            timestamp,
        }
    }

    pub fn coordinates(&self) -> (f64, f64) {
        self.coordinates
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn percent(&self) -> u8 {
        to_percent(self.signal)
    }

    pub fn bucket(&self) -> QualityTier {
        QualityTier::from_signal(self.signal)
    }

    pub fn classify(&self, mode: ClassificationMode) -> Classification {
        classify(self.signal, mode)
    }

    fn remeasure(&mut self, signal: Signal, timestamp: DateTime<Utc>) {
        self.signal = signal;
        self.timestamp = timestamp;
    }
}

/// Per-room overview of a grid-assignment survey.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSummary {
    pub location: String,
    pub measured: usize,
    pub valid: usize,
    pub average_dbm: Option<f64>,
}

/// Surveyed points by identifier. Holds readings only, never interpolation output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementStore {
    measurements: HashMap<PointId, Measurement>,
}

impl FromIterator<(PointId, Measurement)> for MeasurementStore {
    fn from_iter<I: IntoIterator<Item = (PointId, Measurement)>>(iter: I) -> Self {
        Self {
            measurements: iter.into_iter().collect(),
        }
    }
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PointId, &Measurement)> {
        self.measurements.iter()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn get(&self, id: &PointId) -> Option<&Measurement> {
        self.measurements.get(id)
    }

    pub fn contains(&self, id: &PointId) -> bool {
        self.measurements.contains_key(id)
    }

    /// Insert a complete measurement, replacing any previous entry for the point.
    pub fn insert(&mut self, id: PointId, measurement: Measurement) -> Option<Measurement> {
        self.measurements.insert(id, measurement)
    }

    pub fn remove(&mut self, id: &PointId) -> Option<Measurement> {
        self.measurements.remove(id)
    }

    /// Store a reading for a point.
    /// A new point takes `coordinates`; an existing point keeps its own and only
    /// the reading and timestamp are overwritten.
    pub fn record(
        &mut self,
        id: PointId,
        coordinates: (f64, f64),
        signal: impl Into<Signal>,
    ) -> &Measurement {
        self.record_at(id, coordinates, signal.into(), Utc::now())
    }

    fn record_at(
        &mut self,
        id: PointId,
        coordinates: (f64, f64),
        signal: Signal,
        timestamp: DateTime<Utc>,
    ) -> &Measurement {
        let measurement = self
            .measurements
            .entry(id)
            .and_modify(|measurement| measurement.remeasure(signal, timestamp))
            .or_insert_with(|| Measurement::with_timestamp(coordinates, signal, timestamp));
        &*measurement
    }

    /// Store a manually typed reading after validating it.
    pub fn record_manual(
        &mut self,
        id: PointId,
        coordinates: (f64, f64),
        input: &str,
    ) -> Result<&Measurement, HeatmapError> {
        let signal = Signal::from_manual_input(input)?;
        Ok(self.record(id, coordinates, signal))
    }

    /// Write the result of a background scan into the store.
    pub fn apply_scan(&mut self, outcome: ScanOutcome) -> &Measurement {
        self.record_at(
            outcome.point,
            outcome.coordinates,
            outcome.signal,
            outcome.timestamp,
        )
    }

    /// Remove every measurement at once.
    pub fn clear(&mut self) {
        self.measurements.clear();
    }

    /// Points that carry a reading, with their stored coordinates and dBm value.
    pub fn valid_readings(&self) -> impl Iterator<Item = (&PointId, (f64, f64), f64)> {
        self.measurements
            .iter()
            .filter_map(|(id, measurement)| {
                measurement
                    .signal
                    .dbm()
                    .map(|dbm| (id, measurement.coordinates, dbm))
            })
    }

    /// Get corner coordinates of the range of the points with a reading.
    pub fn corners(&self) -> Option<((f64, f64), (f64, f64))> {
        let sites = self
            .valid_readings()
            .map(|(_, site, _)| site)
            .collect::<Vec<_>>();
        if sites.is_empty() {
            return None;
        }
        Some(corners_of(sites.iter()))
    }

    pub fn statistics(&self) -> Option<Statistics> {
        Statistics::from_values(self.valid_readings().map(|(_, _, dbm)| dbm))
    }

    /// Summaries of every named location, sorted by name.
    pub fn location_summaries(&self) -> Vec<LocationSummary> {
        let mut grouped: BTreeMap<&str, Vec<Signal>> = BTreeMap::new();
        for (id, measurement) in &self.measurements {
            if let Some(location) = id.location.as_deref() {
                grouped.entry(location).or_default().push(measurement.signal);
            }
        }

        grouped
            .into_iter()
            .map(|(location, signals)| {
                let readings = signals.iter().filter_map(Signal::dbm).collect::<Vec<_>>();
                LocationSummary {
                    location: location.to_string(),
                    measured: signals.len(),
                    valid: readings.len(),
                    average_dbm: Statistics::from_values(readings.iter().copied())
                        .map(|stats| stats.average),
                }
            })
            .collect()
    }
}
