//! CSV export for per-timestep records and sweep results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::StepRecord;
use crate::sweep::SweepCase;

/// Column header for the per-timestep record export.
const HEADER: &str = "step,time_min,dt_min,demand_mw,solar_mw,\
                      power_request_mw,power_output_mw,power_ramp_mw_min,\
                      heat_input_mw,efficiency_pct,\
                      batt_charge_mwmin,batt_increase_mw,batt_decrease_mw,\
                      batt_charge_rate_mw,batt_discharge_rate_mw,batt_ramp_mw,\
                      solar_used_mw,load_shed_mw,deficit_mw,grid_used_mw,\
                      emissions_tons";

/// Column header for the battery-sweep summary export.
const SWEEP_HEADER: &str = "capacity_mwh,lcoe_per_kwh,fuel_cost_dollars,\
                            emissions_tons,solar_curtail_pct,deficit_pct_time,\
                            deficit_pct_energy";

/// Exports per-timestep records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per record. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_records_csv(records: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_records_csv(records, buf)
}

/// Writes per-timestep records as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_records_csv(records: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.step.to_string(),
            format!("{:.2}", r.time_min),
            format!("{:.2}", r.dt_min),
            format!("{:.4}", r.demand_mw),
            format!("{:.4}", r.solar_mw),
            format!("{:.4}", r.power_request_mw),
            format!("{:.4}", r.power_output_mw),
            format!("{:.4}", r.power_ramp_mw_min),
            format!("{:.4}", r.heat_input_mw),
            format!("{:.4}", r.efficiency_pct),
            format!("{:.4}", r.batt_charge_mwmin),
            format!("{:.4}", r.batt_increase_mw),
            format!("{:.4}", r.batt_decrease_mw),
            format!("{:.4}", r.batt_charge_rate_mw),
            format!("{:.4}", r.batt_discharge_rate_mw),
            format!("{:.4}", r.batt_ramp_mw),
            format!("{:.4}", r.solar_used_mw),
            format!("{:.4}", r.load_shed_mw),
            format!("{:.6}", r.deficit_mw),
            format!("{:.4}", r.grid_used_mw),
            format!("{:.6}", r.emissions_tons),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports battery-sweep results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_sweep_csv(cases: &[SweepCase], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_sweep_csv(cases, buf)
}

/// Writes battery-sweep results as CSV to any writer, one row per case.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_sweep_csv(cases: &[SweepCase], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(SWEEP_HEADER.split(',').map(str::trim))?;

    for c in cases {
        wtr.write_record(&[
            format!("{:.2}", c.capacity_mwh),
            format!("{:.6}", c.summary.lcoe_per_kwh),
            format!("{:.2}", c.summary.fuel_cost_dollars),
            format!("{:.4}", c.summary.emissions_tons),
            format!("{:.4}", c.summary.solar_curtail_pct),
            format!("{:.4}", c.summary.deficit_pct_time),
            format!("{:.4}", c.summary.deficit_pct_energy),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(step: usize) -> StepRecord {
        StepRecord {
            step,
            time_min: step as f64,
            dt_min: 1.0,
            demand_mw: 45.0,
            solar_mw: 10.0,
            power_request_mw: 35.0,
            power_output_mw: 35.0,
            power_ramp_mw_min: 0.0,
            heat_input_mw: 68.0,
            efficiency_pct: 51.5,
            batt_charge_mwmin: 120.0,
            batt_increase_mw: 0.0,
            batt_decrease_mw: 0.0,
            batt_charge_rate_mw: 0.0,
            batt_discharge_rate_mw: 0.0,
            batt_ramp_mw: 0.0,
            solar_used_mw: 10.0,
            load_shed_mw: 0.0,
            deficit_mw: 0.0,
            grid_used_mw: 0.0,
            emissions_tons: 0.2,
        }
    }

    #[test]
    fn header_has_one_column_per_record_field() {
        let records = vec![make_record(0)];
        let mut buf = Vec::new();
        write_records_csv(&records, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(first_line.split(',').count(), 21);
        assert!(first_line.starts_with("step,time_min,dt_min,demand_mw"));
        assert!(first_line.ends_with("emissions_tons"));
    }

    #[test]
    fn row_count_matches_record_count() {
        let records: Vec<StepRecord> = (0..24).map(make_record).collect();
        let mut buf = Vec::new();
        write_records_csv(&records, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 24 data rows
        assert_eq!(lines.len(), 25);
    }

    #[test]
    fn deterministic_output() {
        let records: Vec<StepRecord> = (0..5).map(make_record).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_records_csv(&records, &mut buf1).ok();
        write_records_csv(&records, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn every_data_cell_parses_as_a_number() {
        let records: Vec<StepRecord> = (0..3).map(make_record).collect();
        let mut buf = Vec::new();
        write_records_csv(&records, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(21));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.as_ref();
            for i in 0..21 {
                let val: Result<f64, _> = rec.unwrap()[i].parse();
                assert!(val.is_ok(), "column {i} should parse as f64");
            }
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }
}
