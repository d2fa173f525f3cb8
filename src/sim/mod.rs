//! Dispatch core: component models, energy balance, and the run loop.

/// Per-timestep energy-balance allocation.
pub mod dispatch;
pub mod error;
/// Capacity-limited grid import with an emission-factor curve.
pub mod grid;
pub mod plant;
pub mod runner;
/// Battery / generic storage charge model.
pub mod storage;
pub mod types;

pub use dispatch::DispatchEngine;
pub use error::SimError;
pub use grid::GridLink;
pub use plant::{PlantStatus, ThermalPlant};
pub use runner::SimulationRunner;
pub use storage::StorageDevice;
pub use types::{RunOutput, StepRecord, SummaryResult};
