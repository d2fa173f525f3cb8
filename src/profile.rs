//! Synthetic demand and solar profiles for scenarios without measured data.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::ScenarioConfig;
use crate::series::{SeriesRow, TimeSeries};

/// Standard-normal sample via Box-Muller.
fn gaussian_noise(rng: &mut StdRng, std: f64) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std
}

/// Sinusoidal daily demand with configurable baseline, amplitude, phase,
/// and Gaussian noise. Demand never goes negative.
#[derive(Debug, Clone)]
pub struct DemandProfile {
    /// Baseline demand (MW).
    pub base_mw: f64,
    /// Amplitude of the sinusoidal variation (MW).
    pub amp_mw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std_mw: f64,
    rng: StdRng,
}

impl DemandProfile {
    /// Creates a demand profile with the given seed for reproducible noise.
    pub fn new(base_mw: f64, amp_mw: f64, phase_rad: f64, noise_std_mw: f64, seed: u64) -> Self {
        Self {
            base_mw,
            amp_mw,
            phase_rad,
            noise_std_mw,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Demand (MW) at the given hour of day.
    pub fn demand_mw(&mut self, hour_of_day: f64) -> f64 {
        let angle = 2.0 * std::f64::consts::PI * hour_of_day / 24.0 + self.phase_rad;
        let mw = self.base_mw + self.amp_mw * angle.sin() + gaussian_noise(&mut self.rng, self.noise_std_mw);
        mw.max(0.0)
    }
}

/// Half-cosine solar generation between sunrise and sunset, with additive
/// Gaussian noise during daylight.
#[derive(Debug, Clone)]
pub struct SolarProfile {
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Hour of day when generation begins.
    pub sunrise_hr: f64,
    /// Hour of day when generation ends.
    pub sunset_hr: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std_mw: f64,
    rng: StdRng,
}

impl SolarProfile {
    /// Creates a solar profile with the given seed for reproducible noise.
    ///
    /// Callers are expected to have validated `sunrise_hr < sunset_hr`.
    pub fn new(
        capacity_mw: f64,
        sunrise_hr: f64,
        sunset_hr: f64,
        noise_std_mw: f64,
        seed: u64,
    ) -> Self {
        Self {
            capacity_mw,
            sunrise_hr,
            sunset_hr,
            noise_std_mw,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fraction of peak output at the given hour: 0 outside daylight, a
    /// half-cosine bump peaking midway between sunrise and sunset.
    fn daylight_frac(&self, hour_of_day: f64) -> f64 {
        if hour_of_day < self.sunrise_hr || hour_of_day >= self.sunset_hr {
            return 0.0;
        }
        let span = self.sunset_hr - self.sunrise_hr;
        let pos = (hour_of_day - self.sunrise_hr) / span;
        (std::f64::consts::PI * pos).sin()
    }

    /// Available solar power (MW) at the given hour of day, never negative.
    pub fn solar_mw(&mut self, hour_of_day: f64) -> f64 {
        let frac = self.daylight_frac(hour_of_day);
        if frac <= 0.0 {
            return 0.0;
        }
        let mw = self.capacity_mw * frac + gaussian_noise(&mut self.rng, self.noise_std_mw);
        mw.max(0.0)
    }
}

/// Builds the full input series for a scenario from its profile parameters.
///
/// The step duration is `24 * 60 / steps_per_day` minutes and the two
/// profiles draw from independent generators seeded off the master seed, so
/// the same configuration always yields the same series.
pub fn build_series(cfg: &ScenarioConfig) -> TimeSeries {
    let steps_per_day = cfg.simulation.steps_per_day.max(1);
    let dt_min = 24.0 * 60.0 / steps_per_day as f64;
    let total_steps = steps_per_day * cfg.simulation.days;

    let mut demand = DemandProfile::new(
        cfg.demand.base_mw,
        cfg.demand.amp_mw,
        cfg.demand.phase_rad,
        cfg.demand.noise_std_mw,
        cfg.simulation.seed,
    );
    let mut solar = SolarProfile::new(
        cfg.solar.capacity_mw,
        cfg.solar.sunrise_hr,
        cfg.solar.sunset_hr,
        cfg.solar.noise_std_mw,
        cfg.simulation.seed.wrapping_add(1),
    );

    let mut rows = Vec::with_capacity(total_steps);
    for step in 0..total_steps {
        let time_min = step as f64 * dt_min;
        let hour_of_day = (time_min / 60.0) % 24.0;
        rows.push(SeriesRow {
            time_min,
            dt_min,
            demand_mw: demand.demand_mw(hour_of_day),
            solar_mw: solar.solar_mw(hour_of_day),
        });
    }
    TimeSeries::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;

    #[test]
    fn demand_stays_non_negative() {
        let mut profile = DemandProfile::new(1.0, 5.0, 0.0, 2.0, 42);
        for step in 0..200 {
            let hour = (step % 24) as f64;
            assert!(profile.demand_mw(hour) >= 0.0);
        }
    }

    #[test]
    fn noiseless_demand_follows_the_sinusoid() {
        let mut profile = DemandProfile::new(45.0, 10.0, 0.0, 0.0, 42);
        assert!((profile.demand_mw(0.0) - 45.0).abs() < 1e-9);
        // Quarter day: sin peaks.
        assert!((profile.demand_mw(6.0) - 55.0).abs() < 1e-9);
        assert!((profile.demand_mw(18.0) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn solar_is_dark_outside_daylight() {
        let mut profile = SolarProfile::new(32.3, 6.0, 18.0, 0.0, 42);
        for hour in [0.0, 5.9, 18.0, 23.5] {
            assert_eq!(profile.solar_mw(hour), 0.0);
        }
    }

    #[test]
    fn solar_peaks_at_midday() {
        let mut profile = SolarProfile::new(32.3, 6.0, 18.0, 0.0, 42);
        let noon = profile.solar_mw(12.0);
        assert!((noon - 32.3).abs() < 1e-9);
        assert!(profile.solar_mw(7.0) < noon);
        assert!(profile.solar_mw(17.0) < noon);
    }

    #[test]
    fn solar_is_symmetric_about_midday() {
        let mut profile = SolarProfile::new(30.0, 6.0, 18.0, 0.0, 42);
        let morning = profile.solar_mw(9.0);
        let afternoon = profile.solar_mw(15.0);
        assert!((morning - afternoon).abs() < 1e-9);
    }

    #[test]
    fn same_seed_reproduces_the_series() {
        let cfg = ScenarioConfig::default();
        let a = build_series(&cfg);
        let b = build_series(&cfg);
        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn different_seeds_differ() {
        let mut cfg = ScenarioConfig::default();
        let a = build_series(&cfg);
        cfg.simulation.seed = 43;
        let b = build_series(&cfg);
        assert_ne!(a.rows(), b.rows());
    }

    #[test]
    fn series_covers_the_configured_window() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.steps_per_day = 720;
        cfg.simulation.days = 2;
        let series = build_series(&cfg);
        assert_eq!(series.len(), 1440);
        assert!((series.rows()[0].dt_min - 2.0).abs() < 1e-9);
        assert!((series.total_minutes() - 2880.0).abs() < 1e-9);
        assert!(series.validate().is_ok());
    }
}
