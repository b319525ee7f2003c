//! CSV loading for the meeting-metrics dataset

use super::{Dataset, DatasetBuilder, DatasetError, DatasetResult};
use crate::filter::Level;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reads a dataset from CSV.
///
/// The header row must name `project`, `meeting_number` and
/// `speaker_number`; every other column is treated as a numeric metric.
/// Identifier cells must parse as integers (`3` or `3.0`); metric cells that
/// are empty or unparsable are stored as missing.
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn load(path: &Path) -> DatasetResult<Dataset> {
        info!("Loading dataset from {:?}", path);
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} records with {} metric columns",
            dataset.len(),
            dataset.metric_names().count()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> DatasetResult<Dataset> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let mut id_positions = [0usize; 3];
        for (slot, level) in id_positions.iter_mut().zip(Level::ALL) {
            *slot = position(level.column())?;
        }

        let metric_positions: Vec<usize> = (0..headers.len())
            .filter(|i| !id_positions.contains(i))
            .filter(|&i| !headers[i].is_empty())
            .collect();
        let mut builder = DatasetBuilder::new(metric_positions.iter().map(|&i| &headers[i]));

        let mut values = Vec::with_capacity(metric_positions.len());
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let mut ids = [0i64; 3];
            for ((id, level), &idx) in ids.iter_mut().zip(Level::ALL).zip(&id_positions) {
                *id = parse_identifier(&record, idx, level.column(), line)?;
            }
            let [project, meeting, speaker] = ids;

            values.clear();
            values.extend(
                metric_positions
                    .iter()
                    .map(|&i| record.get(i).and_then(parse_metric)),
            );
            builder.push(project, meeting, speaker, &values)?;
        }

        let dataset = builder.build();
        debug!("Parsed {} CSV records", dataset.len());
        Ok(dataset)
    }
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn load_csv(path: impl AsRef<Path>) -> DatasetResult<Dataset> {
        DatasetLoader::load(path.as_ref())
    }
}

/// Float bounds of `i64`: `-2^63` is exact, `2^63` is the first value past `i64::MAX`
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn parse_identifier(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> DatasetResult<i64> {
    let raw = record.get(idx).unwrap_or_default();
    let invalid = || DatasetError::InvalidIdentifier {
        column: column.to_string(),
        value: raw.to_string(),
        line,
    };

    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    // pandas writes integer columns holding NaN as floats
    match raw.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&f) => Ok(f as i64),
        _ => Err(invalid()),
    }
}

fn parse_metric(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
