//! Input time series: timestamped demand and solar availability rows.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::sim::SimError;

/// One input row: time, step duration, and the two exogenous power signals.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeriesRow {
    /// Simulation time at the start of the step (min).
    pub time_min: f64,
    /// Step duration (min).
    pub dt_min: f64,
    /// Demand (MW).
    pub demand_mw: f64,
    /// Available solar power (MW).
    pub solar_mw: f64,
}

/// An ordered series of input rows covering the whole simulated window.
///
/// Construction does not validate; call [`validate`](Self::validate) (the
/// runner does) before stepping through the rows.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    rows: Vec<SeriesRow>,
}

impl TimeSeries {
    /// Wraps pre-built rows.
    pub fn new(rows: Vec<SeriesRow>) -> Self {
        Self { rows }
    }

    /// The rows in series order.
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    /// Mutable access to the rows, for scenario adjustments.
    pub fn rows_mut(&mut self) -> &mut [SeriesRow] {
        &mut self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total simulated duration (min), the sum of all step durations.
    pub fn total_minutes(&self) -> f64 {
        self.rows.iter().map(|r| r.dt_min).sum()
    }

    /// Checks every row for usable values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] naming the first offending row when a step
    /// duration is not positive, a power value is negative or non-finite, or
    /// the timestamps are not strictly increasing.
    pub fn validate(&self) -> Result<(), SimError> {
        let mut prev_time = f64::NEG_INFINITY;
        for (i, row) in self.rows.iter().enumerate() {
            if !row.dt_min.is_finite() || row.dt_min <= 0.0 {
                return Err(SimError::data(
                    i,
                    format!("dt_min must be finite and > 0, got {}", row.dt_min),
                ));
            }
            if !row.demand_mw.is_finite() || row.demand_mw < 0.0 {
                return Err(SimError::data(
                    i,
                    format!("demand_mw must be finite and >= 0, got {}", row.demand_mw),
                ));
            }
            if !row.solar_mw.is_finite() || row.solar_mw < 0.0 {
                return Err(SimError::data(
                    i,
                    format!("solar_mw must be finite and >= 0, got {}", row.solar_mw),
                ));
            }
            if !row.time_min.is_finite() || row.time_min <= prev_time {
                return Err(SimError::data(
                    i,
                    format!("time_min must be strictly increasing, got {}", row.time_min),
                ));
            }
            prev_time = row.time_min;
        }
        Ok(())
    }

    /// Reads a series from CSV with a `time_min,dt_min,demand_mw,solar_mw`
    /// header.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] naming the offending record when a row
    /// cannot be parsed.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, SimError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for (i, result) in csv_reader.deserialize::<SeriesRow>().enumerate() {
            let row = result.map_err(|e| SimError::data(i, e.to_string()))?;
            rows.push(row);
        }
        Ok(Self::new(rows))
    }

    /// Reads a series from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] when the file cannot be opened or a row
    /// cannot be parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, SimError> {
        let file = std::fs::File::open(path).map_err(|e| {
            SimError::data(0, format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_csv_reader(file)
    }
}
