//! Parameter sweeps over battery capacity.

use rayon::prelude::*;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::profile::build_series;
use crate::series::TimeSeries;
use crate::sim::{SimError, SimulationRunner, SummaryResult};

/// Summary for one swept battery size.
#[derive(Debug, Clone)]
pub struct SweepCase {
    /// Battery capacity used for this case (MWh).
    pub capacity_mwh: f64,
    /// Run summary for this case.
    pub summary: SummaryResult,
}

/// Runs the base scenario once per battery capacity and collects the
/// summaries, in the order the capacities were given.
///
/// All cases share one input series built from the base configuration, so
/// differences between cases come from the battery size alone. Both power
/// ratings follow the capacity (a battery sized at its energy rating), and
/// the initial charge is clamped to the swept capacity. Cases run in
/// parallel.
///
/// # Errors
///
/// Returns the first [`SimError`] produced by any case; validation failures
/// surface before any stepping happens.
pub fn run_battery_sweep(
    base: &ScenarioConfig,
    capacities_mwh: &[f64],
) -> Result<Vec<SweepCase>, SimError> {
    let series = build_series(base);
    run_battery_sweep_over(base, capacities_mwh, &series)
}

/// Same as [`run_battery_sweep`], against a caller-provided series.
///
/// # Errors
///
/// Returns the first [`SimError`] produced by any case.
pub fn run_battery_sweep_over(
    base: &ScenarioConfig,
    capacities_mwh: &[f64],
    series: &TimeSeries,
) -> Result<Vec<SweepCase>, SimError> {
    info!(cases = capacities_mwh.len(), "starting battery sweep");
    capacities_mwh
        .par_iter()
        .map(|&capacity_mwh| {
            let mut cfg = base.clone();
            cfg.storage.capacity_mwh = capacity_mwh;
            cfg.storage.charge_rate_max_mw = capacity_mwh;
            cfg.storage.discharge_rate_max_mw = capacity_mwh;
            cfg.storage.initial_charge_mwh = cfg.storage.initial_charge_mwh.min(capacity_mwh);

            let mut runner = SimulationRunner::from_config(&cfg)?;
            let output = runner.run(series)?;
            Ok(SweepCase {
                capacity_mwh,
                summary: output.summary,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> ScenarioConfig {
        let mut cfg = ScenarioConfig::solar_battery_grid();
        cfg.simulation.steps_per_day = 96;
        cfg.simulation.days = 1;
        cfg
    }

    #[test]
    fn results_follow_input_order() {
        let capacities = [10.0, 40.0, 20.0];
        let cases = run_battery_sweep(&quick_config(), &capacities).expect("sweep succeeds");
        let got: Vec<f64> = cases.iter().map(|c| c.capacity_mwh).collect();
        assert_eq!(got, capacities);
    }

    #[test]
    fn initial_charge_is_clamped_to_swept_capacity() {
        let mut cfg = quick_config();
        cfg.storage.initial_charge_mwh = 25.0;
        // 5 MWh case would fail validation without the clamp.
        let cases = run_battery_sweep(&cfg, &[5.0]).expect("sweep succeeds");
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn sweep_is_deterministic() {
        let cfg = quick_config();
        let capacities = [10.0, 20.0];
        let a = run_battery_sweep(&cfg, &capacities).expect("sweep succeeds");
        let b = run_battery_sweep(&cfg, &capacities).expect("sweep succeeds");
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.summary, y.summary);
        }
    }

    #[test]
    fn invalid_base_config_fails_the_sweep() {
        let mut cfg = quick_config();
        cfg.storage.tau_min = 0.0;
        assert!(run_battery_sweep(&cfg, &[10.0]).is_err());
    }
}
