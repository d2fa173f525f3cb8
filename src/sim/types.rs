//! Core result types: per-timestep records and run summaries.

use std::fmt;

/// Rounding threshold for the energy balance (MW). Differences below this
/// are treated as zero; it also defines the deficit/shed time-counting
/// threshold in the summary.
pub const POWER_EPS_MW: f64 = 0.001;

/// Complete record of one simulated timestep.
///
/// Echoes the input row and captures plant, battery, solar, grid, and
/// emission outcomes. One record per timestep, append-only, owned by the
/// run.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Timestep index within the series.
    pub step: usize,
    /// Simulation time at the start of the step (min).
    pub time_min: f64,
    /// Step duration (min).
    pub dt_min: f64,
    /// Demand (MW).
    pub demand_mw: f64,
    /// Available solar (MW).
    pub solar_mw: f64,

    /// Power requested from the plant (MW).
    pub power_request_mw: f64,
    /// Plant output (MW).
    pub power_output_mw: f64,
    /// Plant output change (MW/min).
    pub power_ramp_mw_min: f64,
    /// Plant thermal input (MW thermal).
    pub heat_input_mw: f64,
    /// Plant efficiency (%); -1 while inactive.
    pub efficiency_pct: f64,

    /// Battery charge after the step (MW·min).
    pub batt_charge_mwmin: f64,
    /// Net charging power stored, after efficiency loss (MW).
    pub batt_increase_mw: f64,
    /// Power withdrawn from the battery (MW).
    pub batt_decrease_mw: f64,
    /// Gross charging power (MW).
    pub batt_charge_rate_mw: f64,
    /// Discharging power (MW).
    pub batt_discharge_rate_mw: f64,
    /// Battery charge change rate (MW).
    pub batt_ramp_mw: f64,

    /// Solar power delivered to demand (MW); below `solar_mw` when curtailed.
    pub solar_used_mw: f64,
    /// Surplus left after battery charging and solar curtailment (MW).
    /// Bookkeeping residual, ~0 in well-formed scenarios.
    pub load_shed_mw: f64,
    /// Energy-balance residual (MW). Negative values are unmet demand;
    /// anything else beyond tolerance flags an allocation inconsistency.
    pub deficit_mw: f64,
    /// Grid import (MW).
    pub grid_used_mw: f64,
    /// Net CO2 emitted this step (tons).
    pub emissions_tons: f64,
}

/// Aggregate statistics computed once after a complete run.
///
/// Energy figures cover the post-warm-up window; percentages follow the
/// conventions of the summary analyzer (see `runner`).
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    /// Demand energy (MWh).
    pub demand_mwh: f64,
    /// Available solar energy (MWh).
    pub solar_mwh: f64,
    /// Plant output energy (MWh).
    pub power_output_mwh: f64,
    /// Plant thermal input energy (MWh thermal).
    pub heat_input_mwh: f64,
    /// Solar energy delivered (MWh).
    pub solar_used_mwh: f64,
    /// Load shed energy (MWh).
    pub load_shed_mwh: f64,
    /// Grid import energy (MWh).
    pub grid_used_mwh: f64,
    /// Fuel cost over the simulated window ($).
    pub fuel_cost_dollars: f64,
    /// Levelized cost of electricity ($/kWh).
    pub lcoe_per_kwh: f64,
    /// Effective plant efficiency (%), output over heat input.
    pub efficiency_pct: f64,
    /// Net CO2 emitted (tons).
    pub emissions_tons: f64,
    /// Largest positive residual observed (MW).
    pub deficit_max_mw: f64,
    /// Most negative residual observed (MW); unmet demand shows up here.
    pub deficit_min_mw: f64,
    /// Share of simulated time with unmet demand (%).
    pub deficit_pct_time: f64,
    /// Unmet demand energy relative to demand energy (%).
    pub deficit_pct_energy: f64,
    /// Share of available solar energy curtailed (%).
    pub solar_curtail_pct: f64,
    /// Shed energy relative to plant output energy (%).
    pub load_shed_pct_energy: f64,
    /// Share of simulated time with load shed above threshold (%).
    pub load_shed_pct_time: f64,
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Summary ---")?;
        writeln!(f, "Demand:            {:>12.2} MWh", self.demand_mwh)?;
        writeln!(f, "Solar available:   {:>12.2} MWh", self.solar_mwh)?;
        writeln!(f, "Solar used:        {:>12.2} MWh", self.solar_used_mwh)?;
        writeln!(f, "Plant output:      {:>12.2} MWh", self.power_output_mwh)?;
        writeln!(f, "Heat input:        {:>12.2} MWh", self.heat_input_mwh)?;
        writeln!(f, "Grid used:         {:>12.2} MWh", self.grid_used_mwh)?;
        writeln!(f, "Plant efficiency:  {:>12.2} %", self.efficiency_pct)?;
        writeln!(f, "Solar curtailed:   {:>12.2} %", self.solar_curtail_pct)?;
        writeln!(f, "Deficit time:      {:>12.2} %", self.deficit_pct_time)?;
        writeln!(f, "Deficit energy:    {:>12.2} %", self.deficit_pct_energy)?;
        writeln!(f, "Emissions:         {:>12.2} tons", self.emissions_tons)?;
        writeln!(f, "Fuel cost:         {:>12.2} $", self.fuel_cost_dollars)?;
        write!(f, "LCOE:              {:>12.4} $/kWh", self.lcoe_per_kwh)
    }
}

/// Output of a complete simulation run: the per-timestep performance series
/// and its summary.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One record per input row, in series order.
    pub records: Vec<StepRecord>,
    /// Aggregate statistics over the post-warm-up window.
    pub summary: SummaryResult,
}
