//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline combined-cycle scenario.
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or pick a named
/// preset with [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Synthetic demand profile parameters.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Solar field parameters.
    #[serde(default)]
    pub solar: SolarFieldConfig,
    /// Thermal plant parameters.
    #[serde(default)]
    pub plant: PlantConfig,
    /// Energy storage parameters.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Grid import parameters.
    #[serde(default)]
    pub grid: GridConfig,
    /// Fuel cost and emission parameters.
    #[serde(default)]
    pub fuel: FuelConfig,
    /// Financing parameters for the cost analysis.
    #[serde(default)]
    pub finance: FinanceConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of timesteps per simulated day (must be > 0).
    pub steps_per_day: usize,
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Master random seed for the profile generators.
    pub seed: u64,
    /// Leading timesteps excluded from the summary statistics.
    pub omit_period: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 1440,
            days: 3,
            seed: 42,
            omit_period: 0,
        }
    }
}

/// Synthetic demand profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Baseline demand (MW).
    pub base_mw: f64,
    /// Sinusoidal amplitude (MW).
    pub amp_mw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std_mw: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_mw: 45.0,
            amp_mw: 10.0,
            phase_rad: 1.2,
            noise_std_mw: 0.5,
        }
    }
}

/// Solar field parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarFieldConfig {
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Hour of day when generation begins.
    pub sunrise_hr: f64,
    /// Hour of day when generation ends.
    pub sunset_hr: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std_mw: f64,
    /// Installed cost ($/kW).
    pub cost_install_per_kw: f64,
    /// Fixed O&M cost ($/kW/year).
    pub cost_om_fix_per_kw_yr: f64,
}

impl Default for SolarFieldConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 32.3,
            sunrise_hr: 6.0,
            sunset_hr: 18.0,
            noise_std_mw: 0.2,
            cost_install_per_kw: 2004.0,
            cost_om_fix_per_kw_yr: 22.02,
        }
    }
}

/// Thermal plant parameters. Defaults describe a combined-cycle gas turbine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Rated capacity (MW); 0 removes the plant from the scenario.
    pub capacity_mw: f64,
    /// Efficiency at the top of the part-load curve (%).
    pub max_efficiency_pct: f64,
    /// Maximum output change per minute (MW/min).
    pub ramp_rate_mw_min: f64,
    /// Lower bound of the operating range as a fraction of capacity (0-1).
    pub min_load_fraction: f64,
    /// Minutes from a start command until the unit can produce.
    pub start_time_min: f64,
    /// Minimum shutdown duration (min).
    pub stop_time_min: f64,
    /// Quadratic efficiency curve coefficient A (over load percent).
    pub eff_a: f64,
    /// Quadratic efficiency curve coefficient B.
    pub eff_b: f64,
    /// Quadratic efficiency curve coefficient C.
    pub eff_c: f64,
    /// Installed cost ($/kW).
    pub cost_install_per_kw: f64,
    /// Fixed O&M cost ($/kW/year).
    pub cost_om_fix_per_kw_yr: f64,
    /// Variable O&M cost ($/MWh).
    pub cost_om_var_per_mwh: f64,
    /// CO2 capture efficiency (%).
    pub co2_capture_pct: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 51.3,
            max_efficiency_pct: 53.44,
            ramp_rate_mw_min: 64.94,
            min_load_fraction: 0.3643,
            start_time_min: 33.13,
            stop_time_min: 5.0,
            eff_a: -6.94e-3,
            eff_b: 1.28,
            eff_c: 40.8,
            cost_install_per_kw: 1260.0,
            cost_om_fix_per_kw_yr: 11.11,
            cost_om_var_per_mwh: 3.54,
            co2_capture_pct: 0.0,
        }
    }
}

impl PlantConfig {
    /// Open-cycle gas turbine characteristics: faster to start and ramp,
    /// less efficient, cheaper to install.
    pub fn ocgt() -> Self {
        Self {
            max_efficiency_pct: 38.33,
            ramp_rate_mw_min: 72.77,
            min_load_fraction: 0.4611,
            start_time_min: 10.0,
            eff_a: -1.09e-2,
            eff_b: 2.03,
            eff_c: 5.44,
            cost_install_per_kw: 750.0,
            cost_om_fix_per_kw_yr: 17.67,
            ..Self::default()
        }
    }
}

/// Energy storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Energy capacity (MWh); 0 removes storage from the scenario.
    pub capacity_mwh: f64,
    /// Maximum gross charging power (MW).
    pub charge_rate_max_mw: f64,
    /// Maximum discharging power (MW).
    pub discharge_rate_max_mw: f64,
    /// Round-trip efficiency (%), applied on the charging side.
    pub round_trip_eff_pct: f64,
    /// Discharge derating divisor (min).
    pub tau_min: f64,
    /// Charge at the start of the run (MWh).
    pub initial_charge_mwh: f64,
    /// Installed cost ($/kW).
    pub cost_install_per_kw: f64,
    /// Fixed O&M cost ($/kW/year).
    pub cost_om_fix_per_kw_yr: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity_mwh: 30.0,
            charge_rate_max_mw: 30.0,
            discharge_rate_max_mw: 30.0,
            round_trip_eff_pct: 90.0,
            tau_min: 30.0,
            initial_charge_mwh: 0.0,
            cost_install_per_kw: 2067.0,
            cost_om_fix_per_kw_yr: 35.6,
        }
    }
}

impl StorageConfig {
    /// A battery sized at `capacity_mwh` with the same power rating in both
    /// directions.
    pub fn battery(capacity_mwh: f64, rate_mw: f64) -> Self {
        Self {
            capacity_mwh,
            charge_rate_max_mw: rate_mw,
            discharge_rate_max_mw: rate_mw,
            ..Self::default()
        }
    }
}

/// Grid import parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Maximum import (MW); 0 disables grid supply (island mode).
    pub capacity_mw: f64,
    /// Emission factor at the top of the hourly curve (tons CO2/MWh).
    pub max_emissions_tons_per_mwh: f64,
    /// Variable O&M cost of imported energy ($/MWh).
    pub cost_om_var_per_mwh: f64,
    /// Hour-of-day keys for the emission curve (ascending, within 0-24).
    pub curve_hours: Vec<f64>,
    /// Emission curve values (% of the maximum) at each keyed hour.
    pub curve_pct: Vec<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 0.0,
            max_emissions_tons_per_mwh: 0.5,
            cost_om_var_per_mwh: 100.0,
            curve_hours: (1..=24).map(f64::from).collect(),
            curve_pct: vec![100.0; 24],
        }
    }
}

/// Fuel cost and emission parameters. Defaults describe natural gas.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    /// Fuel cost per thermal MWh ($).
    pub cost_per_mwh_th: f64,
    /// Emissions per thermal MWh (tons CO2).
    pub emissions_tons_per_mwh_th: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            cost_per_mwh_th: 23.27,
            emissions_tons_per_mwh_th: 0.18,
        }
    }
}

/// Financing parameters for the cost analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceConfig {
    /// Annual interest rate as a fraction.
    pub interest_rate: f64,
    /// Amortization period (years).
    pub lifetime_yr: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            interest_rate: 0.02,
            lifetime_yr: 20,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"storage.tau_min"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the combined-cycle baseline scenario (island mode, no grid).
    pub fn ccgt() -> Self {
        Self::default()
    }

    /// Returns the open-cycle variant of the baseline scenario.
    pub fn ocgt() -> Self {
        Self {
            plant: PlantConfig::ocgt(),
            ..Self::default()
        }
    }

    /// Returns the solar-battery-grid scenario: no thermal plant, storage
    /// dispatch backed by unconstrained grid import.
    pub fn solar_battery_grid() -> Self {
        Self {
            plant: PlantConfig {
                capacity_mw: 0.0,
                max_efficiency_pct: 100.0,
                ..PlantConfig::default()
            },
            grid: GridConfig {
                capacity_mw: 1000.0,
                ..GridConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["ccgt", "ocgt", "solar_battery_grid"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ccgt" => Ok(Self::ccgt()),
            "ocgt" => Ok(Self::ocgt()),
            "solar_battery_grid" => Ok(Self::solar_battery_grid()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.steps_per_day == 0 {
            errors.push(ConfigError::new("simulation.steps_per_day", "must be > 0"));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }

        let d = &self.demand;
        if d.base_mw < 0.0 {
            errors.push(ConfigError::new("demand.base_mw", "must be >= 0"));
        }
        if d.noise_std_mw < 0.0 {
            errors.push(ConfigError::new("demand.noise_std_mw", "must be >= 0"));
        }

        let sol = &self.solar;
        if sol.capacity_mw < 0.0 {
            errors.push(ConfigError::new("solar.capacity_mw", "must be >= 0"));
        }
        if !(0.0..24.0).contains(&sol.sunrise_hr) {
            errors.push(ConfigError::new("solar.sunrise_hr", "must be in [0, 24)"));
        }
        if sol.sunrise_hr >= sol.sunset_hr || sol.sunset_hr > 24.0 {
            errors.push(ConfigError::new(
                "solar.sunset_hr",
                "must be > solar.sunrise_hr and <= 24",
            ));
        }
        if sol.noise_std_mw < 0.0 {
            errors.push(ConfigError::new("solar.noise_std_mw", "must be >= 0"));
        }

        let p = &self.plant;
        if p.capacity_mw < 0.0 {
            errors.push(ConfigError::new("plant.capacity_mw", "must be >= 0"));
        }
        if p.capacity_mw > 0.0 {
            if !(p.max_efficiency_pct > 0.0 && p.max_efficiency_pct <= 100.0) {
                errors.push(ConfigError::new(
                    "plant.max_efficiency_pct",
                    "must be in (0, 100]",
                ));
            }
            if p.ramp_rate_mw_min <= 0.0 {
                errors.push(ConfigError::new("plant.ramp_rate_mw_min", "must be > 0"));
            }
            if !(p.min_load_fraction > 0.0 && p.min_load_fraction <= 1.0) {
                errors.push(ConfigError::new(
                    "plant.min_load_fraction",
                    "must be in (0, 1]",
                ));
            }
            if p.start_time_min < 0.0 {
                errors.push(ConfigError::new("plant.start_time_min", "must be >= 0"));
            }
            if p.stop_time_min < 0.0 {
                errors.push(ConfigError::new("plant.stop_time_min", "must be >= 0"));
            }
            if !(0.0..=100.0).contains(&p.co2_capture_pct) {
                errors.push(ConfigError::new(
                    "plant.co2_capture_pct",
                    "must be in [0, 100]",
                ));
            }
            // The curve must yield a usable efficiency across the whole
            // operating range; a quadratic is monotone or single-peaked, so
            // checking both endpoints and the vertex covers it.
            let mut loads = vec![p.min_load_fraction * 100.0, 100.0];
            if p.eff_a != 0.0 {
                let vertex = -p.eff_b / (2.0 * p.eff_a);
                if vertex > loads[0] && vertex < 100.0 {
                    loads.push(vertex);
                }
            }
            for load_pct in loads {
                let frac = p.eff_a * load_pct * load_pct + p.eff_b * load_pct + p.eff_c;
                if !(frac > 0.0 && frac <= 100.0) {
                    errors.push(ConfigError::new(
                        "plant.eff_a",
                        format!("efficiency curve yields {frac:.2}% at {load_pct:.1}% load, must be in (0, 100]"),
                    ));
                    break;
                }
            }
        }

        let st = &self.storage;
        if st.capacity_mwh < 0.0 {
            errors.push(ConfigError::new("storage.capacity_mwh", "must be >= 0"));
        }
        if st.charge_rate_max_mw < 0.0 {
            errors.push(ConfigError::new("storage.charge_rate_max_mw", "must be >= 0"));
        }
        if st.discharge_rate_max_mw < 0.0 {
            errors.push(ConfigError::new(
                "storage.discharge_rate_max_mw",
                "must be >= 0",
            ));
        }
        if !(st.round_trip_eff_pct > 0.0 && st.round_trip_eff_pct <= 100.0) {
            errors.push(ConfigError::new(
                "storage.round_trip_eff_pct",
                "must be in (0, 100]",
            ));
        }
        if st.tau_min <= 0.0 {
            errors.push(ConfigError::new("storage.tau_min", "must be > 0"));
        }
        if st.initial_charge_mwh < 0.0 || st.initial_charge_mwh > st.capacity_mwh {
            errors.push(ConfigError::new(
                "storage.initial_charge_mwh",
                "must be in [0, storage.capacity_mwh]",
            ));
        }

        let g = &self.grid;
        if g.capacity_mw < 0.0 {
            errors.push(ConfigError::new("grid.capacity_mw", "must be >= 0"));
        }
        if g.max_emissions_tons_per_mwh < 0.0 {
            errors.push(ConfigError::new(
                "grid.max_emissions_tons_per_mwh",
                "must be >= 0",
            ));
        }
        if g.curve_hours.is_empty() {
            errors.push(ConfigError::new("grid.curve_hours", "must not be empty"));
        }
        if g.curve_hours.len() != g.curve_pct.len() {
            errors.push(ConfigError::new(
                "grid.curve_pct",
                "must have the same length as grid.curve_hours",
            ));
        }
        if g.curve_hours.windows(2).any(|w| w[0] >= w[1]) {
            errors.push(ConfigError::new(
                "grid.curve_hours",
                "must be strictly increasing",
            ));
        }
        if g.curve_hours.iter().any(|h| !(0.0..=24.0).contains(h)) {
            errors.push(ConfigError::new("grid.curve_hours", "must be in [0, 24]"));
        }
        if g.curve_pct.iter().any(|p| *p < 0.0) {
            errors.push(ConfigError::new("grid.curve_pct", "must be >= 0"));
        }

        let f = &self.fuel;
        if f.cost_per_mwh_th < 0.0 {
            errors.push(ConfigError::new("fuel.cost_per_mwh_th", "must be >= 0"));
        }
        if f.emissions_tons_per_mwh_th < 0.0 {
            errors.push(ConfigError::new(
                "fuel.emissions_tons_per_mwh_th",
                "must be >= 0",
            ));
        }

        let fin = &self.finance;
        if fin.interest_rate < 0.0 {
            errors.push(ConfigError::new("finance.interest_rate", "must be >= 0"));
        }
        if fin.lifetime_yr == 0 {
            errors.push(ConfigError::new("finance.lifetime_yr", "must be > 0"));
        }

        errors
    }
}
