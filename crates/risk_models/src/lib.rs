//! # Risk Models (Document Layer)
//!
//! Serde data model for the declarative risk documents consumed by the
//! planner and the engine:
//!
//! - [`scenario`]: threat scenarios (frequency + severity assumptions)
//! - [`portfolio`]: asset inventories, scenario bindings, control postures,
//!   aggregation semantics and dependency structure
//! - [`packs`]: control catalog and control assessment packs
//! - [`envelope`]: the engine-agnostic result envelope (measures/artifacts)
//!
//! Documents reach this layer already schema-validated; the types here are
//! deliberately tolerant about numeric formatting (see [`numberish`]) and
//! strict about structure.

pub mod envelope;
pub mod meta;
pub mod numberish;
pub mod packs;
pub mod portfolio;
pub mod scenario;

pub use meta::Meta;
pub use portfolio::{
    AggregationMethod, Asset, Binding, CopulaSpec, Coverage, Dependency, Portfolio,
    PortfolioControl, PortfolioDocument, ScenarioRef, Semantics,
};
pub use scenario::{
    ControlRef, FrequencyBasis, FrequencyParams, FrequencySpec, ScenarioDocument, ScenarioSpec,
    SeverityComponent, SeverityParams, SeveritySpec,
};
