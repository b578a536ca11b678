//! Radio acquisition seam.
//!
//! The platform scanner is supplied by the caller through [`SignalScanner`].
//! Single measurements can run on a background thread; the result comes back
//! over a one-shot channel and is written into the store by the owning thread
//! with [`MeasurementStore::apply_scan`](crate::MeasurementStore::apply_scan).

use std::{
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    thread,
    time::Duration,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::{PointId, Signal};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("no wireless interface available")]
    NoInterface,

    #[error("scan failed: {0}")]
    Failed(String),
}

/// One access point seen by a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub ssid: String,
    pub signal_dbm: f64,
}

impl ScanEntry {
    pub fn new(ssid: impl Into<String>, signal_dbm: f64) -> Self {
        Self {
            ssid: ssid.into(),
            signal_dbm,
        }
    }
}

/// A platform radio interface that can list nearby networks.
/// A scan may block for a few seconds.
pub trait SignalScanner: Send + Sync {
    fn scan(&self) -> Result<Vec<ScanEntry>, ScanError>;
}

/// Strongest reading for `ssid`, or [`Signal::NoSignal`] when it was not seen.
pub fn strongest_signal(entries: &[ScanEntry], ssid: &str) -> Signal {
    entries
        .iter()
        .filter(|entry| entry.ssid == ssid && entry.signal_dbm.is_finite())
        .map(|entry| entry.signal_dbm)
        .max_by(f64::total_cmp)
        .into()
}

/// Network names in the order they were first seen, without hidden networks.
pub fn distinct_ssids(entries: &[ScanEntry]) -> Vec<String> {
    let mut ssids: Vec<String> = Vec::new();
    for entry in entries {
        if !entry.ssid.is_empty() && !ssids.contains(&entry.ssid) {
            ssids.push(entry.ssid.clone());
        }
    }
    ssids
}

/// Networks currently visible. A failed scan yields an empty list.
pub fn available_networks<S: SignalScanner + ?Sized>(scanner: &S) -> Vec<String> {
    match scanner.scan() {
        Ok(entries) => distinct_ssids(&entries),
        Err(e) => {
            warn!(error = %e, "network scan failed");
            Vec::new()
        }
    }
}

/// Measure `ssid` once. A failed scan counts as no signal.
pub fn measure<S: SignalScanner + ?Sized>(scanner: &S, ssid: &str) -> Signal {
    match scanner.scan() {
        Ok(entries) => strongest_signal(&entries, ssid),
        Err(e) => {
            warn!(ssid, error = %e, "signal scan failed, recording no signal");
            Signal::NoSignal
        }
    }
}

/// Result of a background measurement, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub point: PointId,
    pub coordinates: (f64, f64),
    pub signal: Signal,
    pub timestamp: DateTime<Utc>,
}

/// Handle to a measurement running on a background thread.
pub struct PendingMeasurement {
    point: PointId,
    rx: Receiver<ScanOutcome>,
}

impl PendingMeasurement {
    pub fn point(&self) -> &PointId {
        &self.point
    }

    /// Block until the measurement finishes.
    /// `None` if the worker died without reporting.
    pub fn wait(self) -> Option<ScanOutcome> {
        self.rx.recv().ok()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<ScanOutcome, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// The outcome if it has arrived, without blocking.
    pub fn try_take(&self) -> Option<ScanOutcome> {
        self.rx.try_recv().ok()
    }
}

/// Measure `ssid` for `point` on a background thread.
pub fn spawn_measurement<S: SignalScanner + 'static>(
    scanner: Arc<S>,
    ssid: impl Into<String>,
    point: PointId,
    coordinates: (f64, f64),
) -> PendingMeasurement {
    let ssid = ssid.into();
    let (tx, rx) = mpsc::sync_channel(1);

    let worker_point = point.clone();
    thread::spawn(move || {
        let signal = measure(scanner.as_ref(), &ssid);
        info!(point = %worker_point, ssid = %ssid, %signal, "background measurement finished");
        // the receiver may already be gone; nothing to do then
        let _ = tx.send(ScanOutcome {
            point: worker_point,
            coordinates,
            signal,
            timestamp: Utc::now(),
        });
    });

    PendingMeasurement { point, rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeasurementStore;

    struct FakeScanner(Result<Vec<ScanEntry>, ScanError>);

    impl SignalScanner for FakeScanner {
        fn scan(&self) -> Result<Vec<ScanEntry>, ScanError> {
            self.0.clone()
        }
    }

    fn entries() -> Vec<ScanEntry> {
        vec![
            ScanEntry::new("home", -67.0),
            ScanEntry::new("", -40.0),
            ScanEntry::new("office", -55.0),
            ScanEntry::new("home", -48.0),
            ScanEntry::new("cafe", -80.0),
            ScanEntry::new("home", -71.0),
            ScanEntry::new("cafe", f64::INFINITY),
        ]
    }

    #[test]
    fn test_strongest_signal() {
        assert_eq!(strongest_signal(&entries(), "home"), Signal::Dbm(-48.0));
        assert_eq!(strongest_signal(&entries(), "cafe"), Signal::Dbm(-80.0));
        assert_eq!(strongest_signal(&entries(), "library"), Signal::NoSignal);
        assert_eq!(strongest_signal(&[], "home"), Signal::NoSignal);
    }

    #[test]
    fn test_distinct_ssids() {
        assert_eq!(distinct_ssids(&entries()), vec!["home", "office", "cafe"]);
    }

    #[test]
    fn test_failed_scan_is_no_signal() {
        let scanner = FakeScanner(Err(ScanError::NoInterface));
        assert_eq!(measure(&scanner, "home"), Signal::NoSignal);
        assert!(available_networks(&scanner).is_empty());

        let scanner = FakeScanner(Ok(entries()));
        assert_eq!(measure(&scanner, "office"), Signal::Dbm(-55.0));
        assert_eq!(available_networks(&scanner).len(), 3);
    }

    #[test]
    fn test_background_measurement() {
        let scanner = Arc::new(FakeScanner(Ok(entries())));
        let point = PointId::located("Kitchen", "Center");
        let pending = spawn_measurement(scanner, "home", point.clone(), (2.0, 3.0));
        assert_eq!(pending.point(), &point);

        let outcome = pending.wait().unwrap();
        assert_eq!(outcome.point, point);
        assert_eq!(outcome.signal, Signal::Dbm(-48.0));

        let mut store = MeasurementStore::new();
        store.apply_scan(outcome);
        assert_eq!(store.get(&point).unwrap().signal(), Signal::Dbm(-48.0));
        assert_eq!(store.get(&point).unwrap().coordinates(), (2.0, 3.0));
    }

    #[test]
    fn test_background_measurement_poll() {
        let scanner = Arc::new(FakeScanner(Err(ScanError::Failed("busy".to_string()))));
        let pending = spawn_measurement(scanner, "home", PointId::new("P1"), (0.0, 0.0));

        let outcome = pending.wait_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.signal, Signal::NoSignal);
        // delivered once only
        assert!(pending.try_take().is_none());
    }
}
