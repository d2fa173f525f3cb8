use tracing::{debug, info};

use crate::config::ScenarioConfig;
use crate::series::TimeSeries;

use super::dispatch::DispatchEngine;
use super::error::SimError;
use super::types::{POWER_EPS_MW, RunOutput, StepRecord, SummaryResult};

/// Minutes in an average year, used to scale simulated totals to annual
/// figures for LCOE.
const MINUTES_PER_YEAR: f64 = 365.25 * 24.0 * 60.0;

/// Drives the timestep loop and aggregates the results.
///
/// Iterates the input series strictly in order, invoking the dispatch
/// engine once per row, then computes summary statistics over the records
/// after discarding an initial warm-up window (`omit_period` samples) so
/// start-up transients do not distort steady-state metrics.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    engine: DispatchEngine,
    cfg: ScenarioConfig,
}

impl SimulationRunner {
    /// Validates the configuration and builds the runner.
    ///
    /// # Errors
    ///
    /// Returns the first [`SimError::Config`] when any static parameter is
    /// out of range; nothing is simulated in that case.
    pub fn from_config(cfg: &ScenarioConfig) -> Result<Self, SimError> {
        if let Some(err) = cfg.validate().into_iter().next() {
            return Err(SimError::from(err));
        }
        Ok(Self {
            engine: DispatchEngine::from_config(cfg),
            cfg: cfg.clone(),
        })
    }

    /// Returns a reference to the dispatch engine.
    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Returns a mutable reference to the dispatch engine, for scenario
    /// setup such as stopping the plant before the run.
    pub fn engine_mut(&mut self) -> &mut DispatchEngine {
        &mut self.engine
    }

    /// Runs the full series and returns the performance records and summary.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Data`] with the offending row index when the
    /// series is malformed (non-positive dt, negative or non-finite
    /// demand/solar, non-monotonic time); no partial output is produced.
    pub fn run(&mut self, series: &TimeSeries) -> Result<RunOutput, SimError> {
        series.validate()?;

        let mut records = Vec::with_capacity(series.len());
        for (step, row) in series.rows().iter().enumerate() {
            records.push(self.engine.step(step, row));
        }
        debug!(steps = records.len(), "simulation loop complete");

        let summary = self.summarize(&records);
        info!(
            demand_mwh = summary.demand_mwh,
            lcoe = summary.lcoe_per_kwh,
            "run complete"
        );
        Ok(RunOutput { records, summary })
    }

    /// Computes summary statistics over the post-warm-up records.
    fn summarize(&self, records: &[StepRecord]) -> SummaryResult {
        // Keep everything when the series is shorter than the omit window.
        let omit = self.cfg.simulation.omit_period;
        let window = if records.len() > omit {
            &records[omit..]
        } else {
            records
        };

        let mut demand_mwh = 0.0;
        let mut solar_mwh = 0.0;
        let mut power_output_mwh = 0.0;
        let mut heat_input_mwh = 0.0;
        let mut solar_used_mwh = 0.0;
        let mut load_shed_mwh = 0.0;
        let mut deficit_mwh = 0.0;
        let mut grid_used_mwh = 0.0;
        let mut emissions_tons = 0.0;

        let mut deficit_max_mw = f64::NEG_INFINITY;
        let mut deficit_min_mw = f64::INFINITY;
        let mut t_total_min = 0.0;
        let mut t_under_min = 0.0;
        let mut t_shed_min = 0.0;

        for r in window {
            let hours = r.dt_min / 60.0;
            demand_mwh += r.demand_mw * hours;
            solar_mwh += r.solar_mw * hours;
            power_output_mwh += r.power_output_mw * hours;
            heat_input_mwh += r.heat_input_mw * hours;
            solar_used_mwh += r.solar_used_mw * hours;
            load_shed_mwh += r.load_shed_mw * hours;
            deficit_mwh += r.deficit_mw * hours;
            grid_used_mwh += r.grid_used_mw * hours;
            emissions_tons += r.emissions_tons;

            deficit_max_mw = deficit_max_mw.max(r.deficit_mw);
            deficit_min_mw = deficit_min_mw.min(r.deficit_mw);
            t_total_min += r.dt_min;
            if r.deficit_mw < -POWER_EPS_MW {
                t_under_min += r.dt_min;
            }
            if r.load_shed_mw > POWER_EPS_MW {
                t_shed_min += r.dt_min;
            }
        }
        if window.is_empty() {
            deficit_max_mw = 0.0;
            deficit_min_mw = 0.0;
        }

        let fuel_cost_dollars = heat_input_mwh * self.cfg.fuel.cost_per_mwh_th;

        let efficiency_pct = if heat_input_mwh > 0.0 {
            power_output_mwh / heat_input_mwh * 100.0
        } else {
            0.0
        };

        let (deficit_pct_time, deficit_pct_energy) = if t_under_min > 0.0 {
            (
                t_under_min / t_total_min * 100.0,
                -deficit_mwh / demand_mwh * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        let solar_curtail_pct = if solar_mwh > 0.0 {
            100.0 - solar_used_mwh / solar_mwh * 100.0
        } else {
            0.0
        };

        // Shed energy is reported against plant output, per the reference
        // accounting.
        let load_shed_pct_energy = if power_output_mwh > 0.0 {
            load_shed_mwh / power_output_mwh * 100.0
        } else {
            0.0
        };
        let load_shed_pct_time = if t_shed_min > 0.0 {
            t_shed_min / t_total_min * 100.0
        } else {
            0.0
        };

        let lcoe_per_kwh = self.lcoe(t_total_min, power_output_mwh, grid_used_mwh, demand_mwh, fuel_cost_dollars);

        SummaryResult {
            demand_mwh,
            solar_mwh,
            power_output_mwh,
            heat_input_mwh,
            solar_used_mwh,
            load_shed_mwh,
            grid_used_mwh,
            fuel_cost_dollars,
            lcoe_per_kwh,
            efficiency_pct,
            emissions_tons,
            deficit_max_mw,
            deficit_min_mw,
            deficit_pct_time,
            deficit_pct_energy,
            solar_curtail_pct,
            load_shed_pct_energy,
            load_shed_pct_time,
        }
    }

    /// Levelized cost of electricity ($/kWh): annualized install cost plus
    /// annual O&M and fuel, over annualized demand energy.
    fn lcoe(
        &self,
        t_total_min: f64,
        power_output_mwh: f64,
        grid_used_mwh: f64,
        demand_mwh: f64,
        fuel_cost_dollars: f64,
    ) -> f64 {
        if t_total_min <= 0.0 {
            return 0.0;
        }
        let scale = MINUTES_PER_YEAR / t_total_min;

        let plant = &self.cfg.plant;
        let solar = &self.cfg.solar;
        let storage = &self.cfg.storage;

        // Install costs are $/kW against MW (or MWh for storage) capacities.
        let install = plant.cost_install_per_kw * 1000.0 * plant.capacity_mw
            + solar.cost_install_per_kw * 1000.0 * solar.capacity_mw
            + storage.cost_install_per_kw * 1000.0 * storage.capacity_mwh;
        let annual_install = annualized_payment(
            install,
            self.cfg.finance.interest_rate,
            self.cfg.finance.lifetime_yr,
        );

        let annual_om = plant.cost_om_var_per_mwh * scale * power_output_mwh
            + plant.cost_om_fix_per_kw_yr * 1000.0 * plant.capacity_mw
            + solar.cost_om_fix_per_kw_yr * 1000.0 * solar.capacity_mw
            + storage.cost_om_fix_per_kw_yr * 1000.0 * storage.capacity_mwh
            + self.cfg.grid.cost_om_var_per_mwh * scale * grid_used_mwh;

        let annual_fuel = scale * fuel_cost_dollars;
        let annual_demand_kwh = scale * demand_mwh * 1000.0;

        if annual_demand_kwh > 0.0 {
            (annual_install + annual_om + annual_fuel) / annual_demand_kwh
        } else {
            0.0
        }
    }
}

/// Fixed annual payment amortizing `principal` over `years` at `rate`.
///
/// The standard annuity formula; a zero rate degenerates to straight-line
/// repayment.
pub fn annualized_payment(principal: f64, rate: f64, years: u32) -> f64 {
    if years == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return principal / f64::from(years);
    }
    principal * rate / (1.0 - (1.0 + rate).powi(-(years as i32)))
}
