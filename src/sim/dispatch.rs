use tracing::{trace, warn};

use crate::config::{FuelConfig, ScenarioConfig};
use crate::series::SeriesRow;

use super::grid::GridLink;
use super::plant::ThermalPlant;
use super::storage::StorageDevice;
use super::types::{POWER_EPS_MW, StepRecord};

/// Per-timestep energy-balance engine.
///
/// Owns the thermal plant, storage device, and grid link, and allocates
/// supply against demand one timestep at a time. Strictly sequential: each
/// step depends on the plant output and battery charge left by the previous
/// one.
///
/// Allocation priorities:
/// - On a surplus: charge the battery, then curtail solar, then book the
///   irreducible remainder as load shed.
/// - On a deficit: discharge the battery, then import from the grid; what
///   remains is unmet demand, carried in the record's residual.
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    plant: ThermalPlant,
    storage: StorageDevice,
    grid: GridLink,
    fuel: FuelConfig,
}

impl DispatchEngine {
    /// Creates an engine from its components.
    pub fn new(
        plant: ThermalPlant,
        storage: StorageDevice,
        grid: GridLink,
        fuel: FuelConfig,
    ) -> Self {
        Self {
            plant,
            storage,
            grid,
            fuel,
        }
    }

    /// Builds the engine from a validated scenario configuration.
    pub fn from_config(cfg: &ScenarioConfig) -> Self {
        Self::new(
            ThermalPlant::new(&cfg.plant),
            StorageDevice::new(&cfg.storage),
            GridLink::new(&cfg.grid),
            cfg.fuel.clone(),
        )
    }

    /// Returns a reference to the thermal plant.
    pub fn plant(&self) -> &ThermalPlant {
        &self.plant
    }

    /// Returns a mutable reference to the thermal plant, for issuing
    /// start/stop commands between steps.
    pub fn plant_mut(&mut self) -> &mut ThermalPlant {
        &mut self.plant
    }

    /// Returns a reference to the storage device.
    pub fn storage(&self) -> &StorageDevice {
        &self.storage
    }

    /// Returns a reference to the grid link.
    pub fn grid(&self) -> &GridLink {
        &self.grid
    }

    /// Executes one timestep of the dispatch algorithm and returns its
    /// performance record.
    pub fn step(&mut self, step: usize, row: &SeriesRow) -> StepRecord {
        let dt = row.dt_min;
        let demand = row.demand_mw;
        let solar = row.solar_mw;

        let batt_charge_avail = self.storage.available_charge_rate_mw(dt);
        let batt_discharge_avail = self.storage.available_discharge_rate_mw(dt);

        // Plant control: request only what solar and the battery cannot
        // cover, but never leave the operating range.
        if self.plant.capacity_mw > 0.0 {
            let min_request = self.plant.min_power_request_mw();
            let min_gen = min_request + solar;

            let mut request = if min_gen > demand || (min_gen - demand).abs() < POWER_EPS_MW {
                min_request
            } else {
                demand - solar - batt_discharge_avail
            };
            if request > self.plant.capacity_mw {
                request = self.plant.capacity_mw;
            }
            if request < min_request {
                request = min_request;
            }
            if request < POWER_EPS_MW {
                request = POWER_EPS_MW;
            }

            self.plant.update(request, dt);
        }

        // Energy balance.
        let supply = self.plant.power_output_mw + solar;
        let mut diff = supply - demand;

        let mut batt_increase = 0.0;
        let mut batt_decrease = 0.0;
        let mut solar_used = 0.0;
        let mut load_shed = 0.0;
        let mut grid_used = 0.0;

        if diff.abs() < POWER_EPS_MW {
            // Supply matches demand: all solar is consumed.
            solar_used = solar;
        } else if diff > 0.0 {
            // Surplus: battery first.
            batt_increase = diff.min(batt_charge_avail);
            diff -= batt_increase;

            // Then curtail solar.
            solar_used = if diff < solar { solar - diff } else { 0.0 };
            diff -= solar - solar_used;

            // Whatever is left cannot be placed anywhere.
            load_shed = diff;
            if load_shed > POWER_EPS_MW {
                warn!(
                    step,
                    load_shed_mw = load_shed,
                    "surplus exceeds battery and solar curtailment; shedding load"
                );
            }
        } else {
            // Deficit: no surplus to curtail, solar fully used.
            solar_used = solar;

            batt_decrease = diff.abs().min(batt_discharge_avail);
            diff += batt_decrease;

            grid_used = diff.abs().min(self.grid.capacity_mw);
        }

        // Emissions: grid plus fuel burn, net of capture.
        let hour_of_day = (row.time_min / 60.0) % 24.0;
        let co2_produced = grid_used * dt * self.grid.emission_factor(hour_of_day)
            + self.plant.heat_input_mw / 60.0 * dt * self.fuel.emissions_tons_per_mwh_th;
        let co2_captured = co2_produced * (self.plant.co2_capture_pct / 100.0);
        let emissions = co2_produced - co2_captured;

        self.storage.update(dt, batt_increase, batt_decrease);

        // Energy-balance residual; unmet demand lands here as a negative
        // value, anything else beyond tolerance is an allocation bug.
        let energy_in = solar + self.plant.power_output_mw + batt_decrease + grid_used;
        let energy_out = demand + batt_increase + load_shed + (solar - solar_used);
        let deficit = energy_in - energy_out;
        if deficit > POWER_EPS_MW {
            warn!(
                step,
                residual_mw = deficit,
                "positive energy-balance residual; allocation inconsistency"
            );
        }

        trace!(
            step,
            supply,
            demand,
            batt_increase,
            batt_decrease,
            grid_used,
            deficit,
            "dispatch step"
        );

        StepRecord {
            step,
            time_min: row.time_min,
            dt_min: dt,
            demand_mw: demand,
            solar_mw: solar,
            power_request_mw: self.plant.power_request_mw,
            power_output_mw: self.plant.power_output_mw,
            power_ramp_mw_min: self.plant.power_ramp_mw_min,
            heat_input_mw: self.plant.heat_input_mw,
            efficiency_pct: self.plant.efficiency_pct,
            batt_charge_mwmin: self.storage.charge_mwmin,
            batt_increase_mw: self.storage.increase_mw,
            batt_decrease_mw: self.storage.decrease_mw,
            batt_charge_rate_mw: self.storage.charge_rate_mw,
            batt_discharge_rate_mw: self.storage.discharge_rate_mw,
            batt_ramp_mw: self.storage.ramp_mw,
            solar_used_mw: solar_used,
            load_shed_mw: load_shed,
            deficit_mw: deficit,
            grid_used_mw: grid_used,
            emissions_tons: emissions,
        }
    }
}
