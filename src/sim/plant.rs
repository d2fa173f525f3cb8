use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::config::PlantConfig;

/// Sentinel for state fields that are not currently meaningful
/// (efficiency while off, time counters that are not running).
pub const INACTIVE: f64 = -1.0;

/// Operating state of the thermal plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantStatus {
    /// No output; the unit may be counting time since shutdown.
    Off,
    /// Counting up to the start time; no output yet.
    Starting,
    /// Dispatching power, subject to ramp limits.
    On,
}

impl fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantStatus::Off => write!(f, "OFF"),
            PlantStatus::Starting => write!(f, "STARTING"),
            PlantStatus::On => write!(f, "ON"),
        }
    }
}

/// Rejected `start()`/`stop()` command; the plant state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {action} request while plant is {status}")]
pub struct TransitionError {
    /// The rejected command (`"start"` or `"stop"`).
    pub action: &'static str,
    /// Plant status at the time of the request.
    pub status: PlantStatus,
}

/// A dispatchable thermal generator with a start/stop state machine, ramp
/// limits, and a quadratic part-load efficiency curve.
///
/// Power is in MW, time in minutes, efficiency in percent. The unit is
/// created in the `On` state at full load, matching a plant that has been
/// running long enough to be at steady state when the simulation begins.
///
/// # Invariants
///
/// - While `On`, `power_output_mw` stays within
///   `[min_power_request_mw(), capacity_mw]`.
/// - `heat_input_mw = power_output_mw / (efficiency_pct / 100)` whenever
///   `efficiency_pct > 0`.
#[derive(Debug, Clone)]
pub struct ThermalPlant {
    /// Rated capacity (MW).
    pub capacity_mw: f64,
    /// Efficiency at the top of the curve (%).
    pub max_efficiency_pct: f64,
    /// Maximum rate of output change (MW/min).
    pub ramp_rate_mw_min: f64,
    /// Lower bound of the operating range as a fraction of capacity (0–1).
    pub min_load_fraction: f64,
    /// Time from `start()` until the unit can produce (min).
    pub start_time_min: f64,
    /// Minimum shutdown duration (min).
    pub stop_time_min: f64,
    /// CO2 capture efficiency (%).
    pub co2_capture_pct: f64,
    eff_a: f64,
    eff_b: f64,
    eff_c: f64,

    /// Current operating state.
    pub status: PlantStatus,
    /// Output as a fraction of capacity.
    pub load_fraction: f64,
    /// Current efficiency (%); [`INACTIVE`] while not producing.
    pub efficiency_pct: f64,
    /// Most recent requested power (MW).
    pub power_request_mw: f64,
    /// Current output (MW).
    pub power_output_mw: f64,
    /// Output change over the last update (MW/min).
    pub power_ramp_mw_min: f64,
    /// Thermal input implied by output and efficiency (MW thermal).
    pub heat_input_mw: f64,
    /// Minutes since the last `start()`; [`INACTIVE`] when not counting.
    pub time_since_start_min: f64,
    /// Minutes since the last shutdown; [`INACTIVE`] when not counting.
    pub time_since_stop_min: f64,
}

impl ThermalPlant {
    /// Creates a plant from validated static parameters, initially `On` at
    /// full load.
    pub fn new(cfg: &PlantConfig) -> Self {
        let max_efficiency_pct = cfg.max_efficiency_pct;
        let heat_input_mw = if max_efficiency_pct > 0.0 {
            cfg.capacity_mw / (max_efficiency_pct / 100.0)
        } else {
            0.0
        };
        Self {
            capacity_mw: cfg.capacity_mw,
            max_efficiency_pct,
            ramp_rate_mw_min: cfg.ramp_rate_mw_min,
            min_load_fraction: cfg.min_load_fraction,
            start_time_min: cfg.start_time_min,
            stop_time_min: cfg.stop_time_min,
            co2_capture_pct: cfg.co2_capture_pct,
            eff_a: cfg.eff_a,
            eff_b: cfg.eff_b,
            eff_c: cfg.eff_c,
            status: PlantStatus::On,
            load_fraction: 1.0,
            efficiency_pct: max_efficiency_pct,
            power_request_mw: cfg.capacity_mw,
            power_output_mw: cfg.capacity_mw,
            power_ramp_mw_min: 0.0,
            heat_input_mw,
            time_since_start_min: cfg.start_time_min,
            time_since_stop_min: INACTIVE,
        }
    }

    /// Lowest allowed power request while dispatching (MW).
    pub fn min_power_request_mw(&self) -> f64 {
        self.min_load_fraction * self.capacity_mw
    }

    /// Begins the start-up sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] (and logs a warning) if the unit is not
    /// `Off`; the state is unchanged.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.status == PlantStatus::Off {
            self.status = PlantStatus::Starting;
            Ok(())
        } else {
            let err = TransitionError {
                action: "start",
                status: self.status,
            };
            warn!(status = %self.status, "start requested while unit is not off");
            Err(err)
        }
    }

    /// Shuts the unit down from `On` or `Starting`.
    ///
    /// Resets load fraction, efficiency, output, and heat input, and stops
    /// the start-time counter.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] (and logs a warning) if the unit is
    /// already `Off`; the state is unchanged.
    pub fn stop(&mut self) -> Result<(), TransitionError> {
        match self.status {
            PlantStatus::On | PlantStatus::Starting => {
                self.status = PlantStatus::Off;
                self.load_fraction = 0.0;
                self.efficiency_pct = INACTIVE;
                self.power_output_mw = 0.0;
                self.heat_input_mw = 0.0;
                self.time_since_start_min = INACTIVE;
                Ok(())
            }
            PlantStatus::Off => {
                let err = TransitionError {
                    action: "stop",
                    status: self.status,
                };
                warn!("stop requested while unit is already off");
                Err(err)
            }
        }
    }

    /// Advances the plant by one timestep toward `request_mw`.
    ///
    /// - `Off`: advances the time-since-stop counter when it is running.
    /// - `Starting`: advances the start counter and switches to `On` at the
    ///   minimum load point once `start_time_min` has elapsed.
    /// - `On`: ramp-limited move toward the request; requests outside
    ///   `[min_power_request_mw(), capacity_mw]` are rejected with a logged
    ///   warning and the prior output is held.
    ///
    /// Callers must not update a zero-capacity plant; the dispatch engine
    /// skips the plant entirely in that case.
    ///
    /// # Returns
    ///
    /// `(power_output_mw, heat_input_mw, efficiency_pct)` after the update.
    pub fn update(&mut self, request_mw: f64, dt_min: f64) -> (f64, f64, f64) {
        self.power_request_mw = request_mw;
        match self.status {
            PlantStatus::Off => {
                if self.time_since_stop_min > 0.0 {
                    self.time_since_stop_min += dt_min;
                }
            }
            PlantStatus::Starting => {
                self.time_since_start_min += dt_min;
                if self.time_since_start_min > self.start_time_min {
                    self.status = PlantStatus::On;
                    self.time_since_stop_min = INACTIVE;
                    self.init_power();
                }
            }
            PlantStatus::On => {
                self.time_since_start_min += dt_min;
                self.update_power(request_mw, dt_min);
            }
        }
        (self.power_output_mw, self.heat_input_mw, self.efficiency_pct)
    }

    /// Efficiency (%) the curve yields at a hypothetical output, or `None`
    /// when the implied load percent falls outside the operating range.
    ///
    /// Pure; usable by a control scheme to probe operating points without
    /// touching plant state.
    pub fn calc_efficiency(&self, power_mw: f64) -> Option<f64> {
        let load_pct = power_mw / self.capacity_mw * 100.0;
        if load_pct < self.min_load_fraction * 100.0 || load_pct > 100.0 {
            return None;
        }
        let eff_fraction = self.eff_a * load_pct * load_pct + self.eff_b * load_pct + self.eff_c;
        Some(self.max_efficiency_pct * eff_fraction / 100.0)
    }

    /// Initializes production at the bottom of the operating range when the
    /// start-up sequence completes.
    fn init_power(&mut self) {
        self.load_fraction = self.min_load_fraction;
        self.power_output_mw = self.load_fraction * self.capacity_mw;
        self.efficiency_pct = self
            .calc_efficiency(self.power_output_mw)
            .unwrap_or(INACTIVE);
        self.heat_input_mw = if self.efficiency_pct > 0.0 {
            self.power_output_mw / (self.efficiency_pct / 100.0)
        } else {
            0.0
        };
    }

    /// Ramp-limited move toward the requested output (On state only).
    fn update_power(&mut self, request_mw: f64, dt_min: f64) {
        let previous_mw = self.power_output_mw;

        if self.min_power_request_mw() <= request_mw && request_mw <= self.capacity_mw {
            let ramp_requested = (self.power_output_mw - request_mw).abs();
            let ramp_possible = self.ramp_rate_mw_min * dt_min;
            let ramp = ramp_requested.min(ramp_possible);

            if request_mw < self.power_output_mw {
                self.power_output_mw -= ramp;
            } else if self.power_output_mw < request_mw {
                self.power_output_mw += ramp;
            }
        } else {
            warn!(
                request_mw,
                min_mw = self.min_power_request_mw(),
                max_mw = self.capacity_mw,
                "power request out of range, holding prior output"
            );
        }

        self.load_fraction = self.power_output_mw / self.capacity_mw;
        self.efficiency_pct = self
            .calc_efficiency(self.power_output_mw)
            .unwrap_or(INACTIVE);
        self.heat_input_mw = if self.efficiency_pct > 0.0 {
            self.power_output_mw / (self.efficiency_pct / 100.0)
        } else {
            0.0
        };
        self.power_ramp_mw_min = (self.power_output_mw - previous_mw) / dt_min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlantConfig;

    const TOL: f64 = 1e-9;

    fn ccgt() -> ThermalPlant {
        ThermalPlant::new(&PlantConfig::default())
    }

    #[test]
    fn starts_on_at_full_load() {
        let plant = ccgt();
        assert_eq!(plant.status, PlantStatus::On);
        assert!((plant.power_output_mw - 51.3).abs() < TOL);
        assert!((plant.load_fraction - 1.0).abs() < TOL);
        assert!((plant.heat_input_mw - 51.3 / 0.5344).abs() < 1e-6);
    }

    #[test]
    fn min_power_request_follows_load_fraction() {
        let plant = ccgt();
        assert!((plant.min_power_request_mw() - 0.3643 * 51.3).abs() < TOL);
    }

    #[test]
    fn efficiency_curve_endpoints_in_range() {
        let plant = ccgt();
        let at_min = plant.calc_efficiency(plant.min_power_request_mw());
        let at_max = plant.calc_efficiency(plant.capacity_mw);
        for eff in [at_min, at_max] {
            let eff = eff.expect("endpoint inside operating range");
            assert!(eff > 0.0 && eff <= plant.max_efficiency_pct + TOL);
        }
    }

    #[test]
    fn efficiency_out_of_range_is_none() {
        let plant = ccgt();
        assert_eq!(plant.calc_efficiency(plant.min_power_request_mw() - 1.0), None);
        assert_eq!(plant.calc_efficiency(plant.capacity_mw + 1.0), None);
    }

    #[test]
    fn update_respects_ramp_rate() {
        let mut plant = ccgt();
        plant.ramp_rate_mw_min = 2.0;
        // Full output is 51.3; request the minimum and watch it step down.
        let request = plant.min_power_request_mw();
        let before = plant.power_output_mw;
        plant.update(request, 1.0);
        assert!((before - plant.power_output_mw - 2.0).abs() < TOL);
        assert!((plant.power_ramp_mw_min + 2.0).abs() < TOL);
    }

    #[test]
    fn update_does_not_overshoot_request() {
        let mut plant = ccgt();
        let request = plant.capacity_mw - 0.5;
        plant.update(request, 1.0); // ramp capability far exceeds 0.5 MW
        assert!((plant.power_output_mw - request).abs() < TOL);
        plant.update(request, 1.0);
        assert!((plant.power_output_mw - request).abs() < TOL);
        assert!(plant.power_ramp_mw_min.abs() < TOL);
    }

    #[test]
    fn out_of_range_request_holds_output() {
        let mut plant = ccgt();
        let before = plant.power_output_mw;
        plant.update(plant.capacity_mw + 10.0, 1.0);
        assert!((plant.power_output_mw - before).abs() < TOL);
        assert_eq!(plant.status, PlantStatus::On);
    }

    #[test]
    fn heat_input_matches_efficiency_while_on() {
        let mut plant = ccgt();
        plant.update(40.0, 1.0);
        assert!(plant.efficiency_pct > 0.0);
        let expected = plant.power_output_mw / (plant.efficiency_pct / 100.0);
        assert!((plant.heat_input_mw - expected).abs() < TOL);
    }

    #[test]
    fn stop_resets_operating_state() {
        let mut plant = ccgt();
        plant.stop().expect("stop from on");
        assert_eq!(plant.status, PlantStatus::Off);
        assert!((plant.power_output_mw).abs() < TOL);
        assert!((plant.heat_input_mw).abs() < TOL);
        assert!((plant.efficiency_pct - INACTIVE).abs() < TOL);
        assert!((plant.time_since_start_min - INACTIVE).abs() < TOL);
    }

    #[test]
    fn stop_when_off_is_rejected_without_change() {
        let mut plant = ccgt();
        plant.stop().expect("first stop");
        let before = plant.clone();
        let err = plant.stop().expect_err("second stop must fail");
        assert_eq!(err.action, "stop");
        assert_eq!(plant.status, before.status);
        assert_eq!(plant.power_output_mw, before.power_output_mw);
    }

    #[test]
    fn start_only_from_off() {
        let mut plant = ccgt();
        assert!(plant.start().is_err());
        plant.stop().expect("stop from on");
        plant.start().expect("start from off");
        assert_eq!(plant.status, PlantStatus::Starting);
        assert!(plant.start().is_err());
    }

    #[test]
    fn starting_unit_comes_online_at_minimum_load() {
        let mut plant = ccgt();
        plant.stop().expect("stop");
        plant.start().expect("start");
        // Counter resumes from the inactive sentinel, as in stepping the
        // original model: the unit produces nothing until the start time
        // has elapsed.
        let mut steps = 0;
        while plant.status == PlantStatus::Starting {
            let (output, _, _) = plant.update(20.0, 1.0);
            if plant.status == PlantStatus::Starting {
                assert!(output.abs() < TOL);
            }
            steps += 1;
            assert!(steps < 100, "start-up must terminate");
        }
        assert_eq!(plant.status, PlantStatus::On);
        assert!((plant.power_output_mw - plant.min_power_request_mw()).abs() < TOL);
        assert!(plant.efficiency_pct > 0.0);
    }

    #[test]
    fn off_unit_ignores_requests() {
        let mut plant = ccgt();
        plant.stop().expect("stop");
        let (output, heat, eff) = plant.update(30.0, 1.0);
        assert!(output.abs() < TOL);
        assert!(heat.abs() < TOL);
        assert!((eff - INACTIVE).abs() < TOL);
    }
}
