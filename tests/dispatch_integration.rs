//! Integration tests for the dispatch loop: energy balance closure, ramp
//! limits, island-mode deficits, and determinism.

mod common;

use hres_sim::config::{GridConfig, PlantConfig, ScenarioConfig, StorageConfig};
use hres_sim::io::write_records_csv;
use hres_sim::profile::build_series;
use hres_sim::sim::{RunOutput, SimulationRunner};

fn run(cfg: &ScenarioConfig, series: &hres_sim::series::TimeSeries) -> RunOutput {
    let mut runner = SimulationRunner::from_config(cfg).expect("valid config");
    runner.run(series).expect("run succeeds")
}

/// Scenario with no plant and no storage, for island and grid tests.
fn bare_config(grid_capacity_mw: f64) -> ScenarioConfig {
    let mut cfg = common::plant_only_config();
    cfg.plant = PlantConfig {
        capacity_mw: 0.0,
        max_efficiency_pct: 100.0,
        ..PlantConfig::default()
    };
    cfg.grid = GridConfig {
        capacity_mw: grid_capacity_mw,
        ..GridConfig::default()
    };
    cfg
}

#[test]
fn energy_balance_closes_when_the_plant_covers_demand() {
    let cfg = common::plant_only_config();
    let series = build_series(&cfg);
    let out = run(&cfg, &series);

    assert_eq!(out.records.len(), series.len());
    for r in &out.records {
        assert!(
            r.deficit_mw.abs() < 1e-6,
            "residual {} at step {}",
            r.deficit_mw,
            r.step
        );
        assert!(r.load_shed_mw.abs() < 1e-6);
    }
}

#[test]
fn plant_output_tracks_the_daily_demand_swing() {
    let cfg = common::plant_only_config();
    let series = build_series(&cfg);
    let out = run(&cfg, &series);

    // After the first step the ramp capability dwarfs the per-minute demand
    // change, so output equals demand exactly.
    for (r, row) in out.records.iter().zip(series.rows()).skip(1) {
        assert!((r.power_output_mw - row.demand_mw).abs() < 1e-9);
        assert!(r.heat_input_mw > r.power_output_mw, "sub-100% efficiency");
    }
    assert!(out.summary.efficiency_pct > 0.0);
    assert!(out.summary.efficiency_pct <= cfg.plant.max_efficiency_pct + 1e-9);
}

#[test]
fn ramp_limit_bounds_every_output_change() {
    let mut cfg = common::plant_only_config();
    cfg.plant.ramp_rate_mw_min = 0.5;
    // Constant 50 MW demand; the plant starts at 51.3 MW and walks down.
    let series = common::constant_series(10, 50.0, 0.0);
    let out = run(&cfg, &series);

    let mut previous = cfg.plant.capacity_mw;
    for r in &out.records {
        let change = (r.power_output_mw - previous).abs();
        assert!(change <= 0.5 + 1e-9, "step {} moved {change}", r.step);
        assert!(r.power_ramp_mw_min.abs() <= 0.5 + 1e-9);
        previous = r.power_output_mw;
    }
    // 1.3 MW gap closes within three steps and holds.
    let settled = &out.records[3..];
    for r in settled {
        assert!((r.power_output_mw - 50.0).abs() < 1e-9);
    }
    // While output exceeds demand the excess is shed, never lost silently.
    for r in &out.records {
        assert!(r.deficit_mw.abs() < 1e-6);
    }
}

#[test]
fn island_mode_reports_all_demand_unmet() {
    let cfg = bare_config(0.0);
    let series = common::constant_series(60, 10.0, 0.0);
    let out = run(&cfg, &series);

    for r in &out.records {
        assert!((r.deficit_mw + 10.0).abs() < 1e-6);
        assert!(r.grid_used_mw.abs() < 1e-9);
    }
    assert!((out.summary.deficit_min_mw + 10.0).abs() < 1e-6);
    assert!((out.summary.deficit_pct_time - 100.0).abs() < 1e-9);
    assert!((out.summary.deficit_pct_energy - 100.0).abs() < 1e-6);
}

#[test]
fn grid_backstop_eliminates_the_deficit() {
    let cfg = bare_config(100.0);
    let series = common::constant_series(60, 10.0, 0.0);
    let out = run(&cfg, &series);

    for r in &out.records {
        assert!((r.grid_used_mw - 10.0).abs() < 1e-9);
        assert!(r.deficit_mw.abs() < 1e-6);
    }
    assert!((out.summary.grid_used_mwh - 10.0).abs() < 1e-9);
    assert!(out.summary.emissions_tons > 0.0);
}

#[test]
fn surplus_fills_the_battery_then_curtails() {
    let mut cfg = bare_config(0.0);
    cfg.storage = StorageConfig::default(); // 30 MWh, 30 MW, empty
    // 35 MW of surplus every minute; the battery absorbs 30 of it.
    let series = common::constant_series(120, 5.0, 40.0);
    let out = run(&cfg, &series);

    let first = &out.records[0];
    assert!((first.batt_charge_rate_mw - 30.0).abs() < 1e-9);
    assert!((first.solar_used_mw - 35.0).abs() < 1e-9);

    // 27 MW·min stored per step fills 1800 MW·min before the run ends.
    let last = &out.records[out.records.len() - 1];
    assert!((last.batt_charge_mwmin - 1800.0).abs() < 1e-6);
    assert!(last.batt_charge_rate_mw.abs() < 1e-9);
    assert!((last.solar_used_mw - 5.0).abs() < 1e-9);

    for r in &out.records {
        assert!(r.batt_charge_mwmin <= 1800.0 + 1e-6);
        assert!(r.deficit_mw.abs() < 1e-6);
    }
    assert!(out.summary.solar_curtail_pct > 0.0);
}

#[test]
fn battery_bridges_a_demand_spike_before_the_grid() {
    let mut cfg = bare_config(100.0);
    cfg.storage = StorageConfig {
        initial_charge_mwh: 10.0,
        ..StorageConfig::default()
    };
    // 600 MW·min stored; tau 30 derates the first discharge to 20 MW.
    let series = common::constant_series(5, 50.0, 0.0);
    let out = run(&cfg, &series);

    let first = &out.records[0];
    assert!((first.batt_discharge_rate_mw - 20.0).abs() < 1e-9);
    assert!((first.grid_used_mw - 30.0).abs() < 1e-9);

    // The battery drains, so the grid share grows step over step.
    for pair in out.records.windows(2) {
        assert!(pair[1].batt_discharge_rate_mw < pair[0].batt_discharge_rate_mw);
        assert!(pair[1].grid_used_mw > pair[0].grid_used_mw);
        assert!(pair[1].deficit_mw.abs() < 1e-6);
    }
}

#[test]
fn identical_runs_produce_identical_records_and_csv() {
    let cfg = common::plant_only_config();
    let series = build_series(&cfg);

    let out1 = run(&cfg, &series);
    let out2 = run(&cfg, &series);
    assert_eq!(out1.records, out2.records);
    assert_eq!(out1.summary, out2.summary);

    let mut buf1 = Vec::new();
    let mut buf2 = Vec::new();
    write_records_csv(&out1.records, &mut buf1).expect("csv writes");
    write_records_csv(&out2.records, &mut buf2).expect("csv writes");
    assert_eq!(buf1, buf2);
}
