//! # Risk Sim (Monte Carlo Engine)
//!
//! The stochastic half of the cyrisk workspace. Consumes an
//! [`ExecutionPlan`](risk_plan::ExecutionPlan) produced by the planner and
//! runs repeated random trials:
//!
//! - [`rng`]: seeded, reproducible random number generation
//! - [`copula`]: Gaussian-copula uniforms via Cholesky factorisation
//! - [`frequency`]: per-trial event counts (Poisson, gamma, hierarchical
//!   gamma-Poisson)
//! - [`severity`]: per-event loss magnitudes (lognormal, gamma, mixture)
//! - [`engine`]: single-scenario trial loop
//! - [`portfolio`]: orchestration across scenarios, control-state sampling
//!   and aggregation
//! - [`result`]: metrics, distribution artifacts and the result type
//! - [`envelope`]: conversion into the engine-agnostic result envelope
//!
//! Every sampling call threads an explicit [`SimRng`](rng::SimRng); there
//! is no process-wide random state. Fixed seeds give bit-identical runs.

pub mod copula;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod frequency;
pub mod portfolio;
pub mod result;
pub mod rng;
pub mod severity;

pub use engine::{run_scenario, run_scenario_document};
pub use error::SimError;
pub use frequency::{FrequencyModel, RateMultiplier};
pub use portfolio::{run_portfolio_simulation, PortfolioRunConfig};
pub use result::{Distribution, Metadata, Metrics, SimulationResult};
pub use rng::SimRng;
