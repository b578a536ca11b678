use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{PointId, Signal, NO_SIGNAL_MARKER};

use super::{Measurement, MeasurementStore};

#[derive(Debug, Error)]
pub enum RwError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed survey json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid point identifier {0:?}")]
    InvalidPointId(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct SurveyDocument {
    metadata: SurveyMetadata,
    measurements: BTreeMap<String, MeasurementRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SurveyMetadata {
    ssid: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: DateTime<Utc>,
    total_points: usize,
    statistics: ExportStatistics,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExportStatistics {
    min_dbm: f64,
    max_dbm: f64,
    avg_dbm: f64,
    points_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct MeasurementRecord {
    dbm: DbmField,
    #[serde(default)]
    coordinates: Value,
    #[serde(default)]
    timestamp: Option<Value>,
}

/// A reading in the export: a number, or the no-signal marker.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum DbmField {
    Value(f64),
    Marker(String),
}

impl From<Signal> for DbmField {
    fn from(signal: Signal) -> Self {
        match signal.dbm() {
            Some(value) => Self::Value(value),
            None => Self::Marker(NO_SIGNAL_MARKER.to_string()),
        }
    }
}

impl From<DbmField> for Signal {
    fn from(field: DbmField) -> Self {
        match field {
            DbmField::Value(value) => Signal::from(value),
            DbmField::Marker(marker) => Signal::parse(&marker),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow {
    point: String,
    dbm: f64,
    x: f64,
    y: f64,
    timestamp: String,
}

static CSV_HEADER: [&str; 5] = ["Point", "dBm", "Coordinate_X", "Coordinate_Y", "Timestamp"];

fn parse_coordinates(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [x, y] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// RFC 3339, or a date and time without an offset, which is read as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Some(timestamp.with_timezone(&Utc));
    }
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp {:?}", s)))
}

/// A survey read back from its JSON export.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSurvey {
    pub ssid: String,
    pub timestamp: DateTime<Utc>,
    pub store: MeasurementStore,
}

impl MeasurementStore {
    fn to_document(&self, ssid: &str, timestamp: DateTime<Utc>) -> SurveyDocument {
        let statistics = self
            .statistics()
            .map(|stats| ExportStatistics {
                min_dbm: stats.min,
                max_dbm: stats.max,
                avg_dbm: stats.average,
                points_count: stats.count,
            })
            .unwrap_or_default();

        let measurements = self
            .iter()
            .map(|(id, measurement)| {
                let (x, y) = measurement.coordinates();
                (
                    id.to_string(),
                    MeasurementRecord {
                        dbm: measurement.signal().into(),
                        coordinates: Value::from(vec![x, y]),
                        timestamp: Some(Value::from(format_timestamp(measurement.timestamp()))),
                    },
                )
            })
            .collect();

        SurveyDocument {
            metadata: SurveyMetadata {
                ssid: ssid.to_string(),
                timestamp,
                total_points: self.len(),
                statistics,
            },
            measurements,
        }
    }

    pub fn to_json_string(&self, ssid: &str) -> Result<String, RwError> {
        Ok(serde_json::to_string_pretty(
            &self.to_document(ssid, Utc::now()),
        )?)
    }

    pub fn write_json<W: Write>(&self, writer: W, ssid: &str) -> Result<(), RwError> {
        serde_json::to_writer_pretty(writer, &self.to_document(ssid, Utc::now()))?;
        Ok(())
    }

    pub fn write_json_to_file<P: AsRef<Path>>(&self, path: P, ssid: &str) -> Result<(), RwError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer, ssid)?;
        writer.flush()?;

        info!(path = %path.display(), points = self.len(), "exported survey");
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<ImportedSurvey, RwError> {
        let document: SurveyDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_json_str(s: &str) -> Result<ImportedSurvey, RwError> {
        let document: SurveyDocument = serde_json::from_str(s)?;
        Self::from_document(document)
    }

    pub fn read_json_from_file<P: AsRef<Path>>(path: P) -> Result<ImportedSurvey, RwError> {
        let path = path.as_ref();
        let survey = Self::read_json(BufReader::new(File::open(path)?))?;

        info!(
            path = %path.display(),
            ssid = %survey.ssid,
            points = survey.store.len(),
            "imported survey"
        );
        Ok(survey)
    }

    fn from_document(document: SurveyDocument) -> Result<ImportedSurvey, RwError> {
        let SurveyDocument {
            metadata,
            measurements,
        } = document;

        let store = measurements
            .into_iter()
            .map(|(key, record)| {
                let id = key
                    .parse::<PointId>()
                    .map_err(|_| RwError::InvalidPointId(key.clone()))?;

                let coordinates = parse_coordinates(&record.coordinates).unwrap_or_else(|| {
                    warn!(point = %id, "measurement without valid coordinates, placed at the origin");
                    (0.0, 0.0)
                });
                let timestamp = record
                    .timestamp
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(parse_timestamp)
                    .unwrap_or_else(|| {
                        warn!(point = %id, "measurement without valid timestamp, using the survey time");
                        metadata.timestamp
                    });

                let signal = Signal::from(record.dbm);
                Ok((id, Measurement::with_timestamp(coordinates, signal, timestamp)))
            })
            .collect::<Result<MeasurementStore, RwError>>()?;

        Ok(ImportedSurvey {
            ssid: metadata.ssid,
            timestamp: metadata.timestamp,
            store,
        })
    }

    /// Valid readings only, ordered by point id.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), RwError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(CSV_HEADER)?;

        let mut rows = self
            .iter()
            .filter_map(|(id, measurement)| Some((id, measurement.signal().dbm()?, measurement)))
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.0.cmp(b.0));

        for (id, dbm, measurement) in rows {
            let (x, y) = measurement.coordinates();
            wtr.serialize(CsvRow {
                point: id.to_string(),
                dbm,
                x,
                y,
                timestamp: format_timestamp(measurement.timestamp()),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RwError> {
        let path = path.as_ref();
        self.write_csv(File::create(path)?)?;

        info!(path = %path.display(), "exported survey csv");
        Ok(())
    }
}
