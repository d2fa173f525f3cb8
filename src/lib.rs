//! Hybrid renewable energy system dispatch simulator.
//!
//! Simulates the minute-by-minute operation of a dispatchable thermal plant,
//! solar PV input, battery storage, and optional grid import against a
//! demand/solar time series, producing a per-timestep performance series and
//! summary statistics including LCOE.

pub mod config;
pub mod io;
pub mod logging;
pub mod profile;
pub mod series;
/// Dispatch core: plant, storage, grid, energy balance, and run loop.
pub mod sim;
pub mod sweep;
