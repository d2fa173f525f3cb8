use crate::config::GridConfig;

/// Capacity-limited grid import used as a backstop supply.
///
/// A capacity of zero disables the link. The link keeps no state between
/// timesteps; only the emission-factor lookup depends on the time of day.
#[derive(Debug, Clone)]
pub struct GridLink {
    /// Maximum import (MW); 0 disables grid supply.
    pub capacity_mw: f64,
    /// Emission factor at the top of the curve (tons CO2 per MWh electric).
    pub max_emissions_tons_per_mwh: f64,
    /// Variable O&M cost ($/MWh).
    pub cost_om_var_per_mwh: f64,
    curve_hours: Vec<f64>,
    curve_pct: Vec<f64>,
}

impl GridLink {
    /// Creates a grid link from validated parameters.
    pub fn new(cfg: &GridConfig) -> Self {
        Self {
            capacity_mw: cfg.capacity_mw,
            max_emissions_tons_per_mwh: cfg.max_emissions_tons_per_mwh,
            cost_om_var_per_mwh: cfg.cost_om_var_per_mwh,
            curve_hours: cfg.curve_hours.clone(),
            curve_pct: cfg.curve_pct.clone(),
        }
    }

    /// Emission factor (tons CO2 per MWh electric) at the given hour of day.
    ///
    /// The factor is `max_emissions` scaled by the hour-of-day percentage
    /// curve, linearly interpolated with wraparound across midnight. The
    /// default flat 100% curve yields a constant factor regardless of hour.
    pub fn emission_factor(&self, hour_of_day: f64) -> f64 {
        let pct = interp_wrapped(&self.curve_hours, &self.curve_pct, hour_of_day);
        self.max_emissions_tons_per_mwh * pct / 100.0
    }
}

/// Linear interpolation over an hour-keyed curve, wrapping across the 24 h
/// boundary for query hours outside the keyed span.
fn interp_wrapped(hours: &[f64], values: &[f64], hour: f64) -> f64 {
    debug_assert_eq!(hours.len(), values.len());
    if hours.len() == 1 {
        return values[0];
    }
    let first = 0;
    let last = hours.len() - 1;
    if hour < hours[first] {
        // Segment from the last keyed hour (shifted back a day) to the first.
        let span = hours[first] - (hours[last] - 24.0);
        let frac = (hour - (hours[last] - 24.0)) / span;
        return values[last] + frac * (values[first] - values[last]);
    }
    if hour > hours[last] {
        // Segment from the last keyed hour to the first of the next day.
        let span = hours[first] + 24.0 - hours[last];
        let frac = (hour - hours[last]) / span;
        return values[last] + frac * (values[first] - values[last]);
    }
    for i in 0..last {
        if hour <= hours[i + 1] {
            let span = hours[i + 1] - hours[i];
            if span <= 0.0 {
                return values[i];
            }
            let frac = (hour - hours[i]) / span;
            return values[i] + frac * (values[i + 1] - values[i]);
        }
    }
    values[last]
}
