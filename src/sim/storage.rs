use crate::config::StorageConfig;

/// Battery or generic energy storage.
///
/// Charge is tracked in MW·min (power × minutes) so that charge arithmetic
/// stays in the same units as plant power over minute timesteps; the
/// configured capacity in MWh is converted on construction.
///
/// The device reports the charge and discharge rates that are *available*
/// for the coming timestep and trusts callers to stay within them:
/// [`update`](Self::update) applies whatever it is given without clamping.
/// The dispatch engine is responsible for honoring the rates it queried,
/// which keeps the charge within `[0, charge_max_mwmin]` at all times.
#[derive(Debug, Clone)]
pub struct StorageDevice {
    /// Storage capacity (MWh) as configured.
    pub capacity_mwh: f64,
    /// Maximum gross charging power (MW).
    pub charge_rate_max_mw: f64,
    /// Maximum discharging power (MW).
    pub discharge_rate_max_mw: f64,
    /// Round-trip efficiency (%), applied on the charging side only.
    pub round_trip_eff_pct: f64,
    /// Discharge derating divisor (min); slows discharge near empty.
    pub tau_min: f64,
    /// Upper charge bound (MW·min), `capacity_mwh * 60`.
    pub charge_max_mwmin: f64,

    /// Current charge (MW·min).
    pub charge_mwmin: f64,
    /// Gross charging power applied last step (MW).
    pub charge_rate_mw: f64,
    /// Discharging power applied last step (MW).
    pub discharge_rate_mw: f64,
    /// Net charging power after efficiency loss (MW).
    pub increase_mw: f64,
    /// Power withdrawn last step (MW).
    pub decrease_mw: f64,
    /// Rate of charge change over the last step (MW).
    pub ramp_mw: f64,
}

impl StorageDevice {
    /// Creates a storage device from validated parameters, starting at the
    /// configured initial charge.
    pub fn new(cfg: &StorageConfig) -> Self {
        Self {
            capacity_mwh: cfg.capacity_mwh,
            charge_rate_max_mw: cfg.charge_rate_max_mw,
            discharge_rate_max_mw: cfg.discharge_rate_max_mw,
            round_trip_eff_pct: cfg.round_trip_eff_pct,
            tau_min: cfg.tau_min,
            charge_max_mwmin: cfg.capacity_mwh * 60.0,
            charge_mwmin: cfg.initial_charge_mwh * 60.0,
            charge_rate_mw: 0.0,
            discharge_rate_mw: 0.0,
            increase_mw: 0.0,
            decrease_mw: 0.0,
            ramp_mw: 0.0,
        }
    }

    /// Charging power (MW) that can be accepted this timestep without
    /// overshooting capacity.
    pub fn available_charge_rate_mw(&self, dt_min: f64) -> f64 {
        if self.charge_mwmin < self.charge_max_mwmin {
            ((self.charge_max_mwmin - self.charge_mwmin) / dt_min).min(self.charge_rate_max_mw)
        } else {
            0.0
        }
    }

    /// Discharging power (MW) available this timestep.
    ///
    /// The division by `tau_min` is a flat per-call derating that slows
    /// discharge as the device approaches empty; it is not integrated over
    /// time.
    pub fn available_discharge_rate_mw(&self, dt_min: f64) -> f64 {
        if self.charge_mwmin > 0.0 {
            (self.charge_mwmin / dt_min / self.tau_min).min(self.discharge_rate_max_mw)
        } else {
            0.0
        }
    }

    /// Applies one timestep of gross charging (`increase_mw`) and
    /// discharging (`decrease_mw`).
    ///
    /// The round-trip efficiency is taken out of the charging flow; the
    /// discharge flow passes through unchanged. Callers must keep both rates
    /// within the values returned by the availability queries for the same
    /// `dt_min`.
    pub fn update(&mut self, dt_min: f64, increase_mw: f64, decrease_mw: f64) {
        let charge_old = self.charge_mwmin;

        self.charge_rate_mw = increase_mw;
        self.discharge_rate_mw = decrease_mw;
        self.increase_mw = increase_mw * self.round_trip_eff_pct / 100.0;
        self.decrease_mw = decrease_mw;
        self.charge_mwmin += self.increase_mw * dt_min - self.decrease_mw * dt_min;

        self.ramp_mw = (self.charge_mwmin - charge_old) / dt_min;
    }
}
