//! Shared test fixtures for integration tests.

use hres_sim::config::{GridConfig, ScenarioConfig, SolarFieldConfig, StorageConfig};
use hres_sim::series::{SeriesRow, TimeSeries};

/// Scenario where the default combined-cycle plant alone covers every step:
/// deterministic demand between 35 and 45 MW, no solar, no storage, no grid.
pub fn plant_only_config() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::ccgt();
    cfg.demand.base_mw = 40.0;
    cfg.demand.amp_mw = 5.0;
    cfg.demand.noise_std_mw = 0.0;
    cfg.solar = SolarFieldConfig {
        capacity_mw: 0.0,
        noise_std_mw: 0.0,
        ..SolarFieldConfig::default()
    };
    cfg.storage = StorageConfig {
        capacity_mwh: 0.0,
        ..StorageConfig::default()
    };
    cfg.grid = GridConfig {
        capacity_mw: 0.0,
        ..GridConfig::default()
    };
    cfg
}

/// One-minute series with constant demand and solar.
pub fn constant_series(steps: usize, demand_mw: f64, solar_mw: f64) -> TimeSeries {
    let rows = (0..steps)
        .map(|i| SeriesRow {
            time_min: i as f64,
            dt_min: 1.0,
            demand_mw,
            solar_mw,
        })
        .collect();
    TimeSeries::new(rows)
}
