//! # Risk Plan (Portfolio Planner)
//!
//! Resolves a portfolio document, together with the scenario documents and
//! control packs it references, into a self-contained
//! [`ExecutionPlan`](plan::ExecutionPlan):
//!
//! - binds scenarios to assets and computes exposure cardinality
//! - resolves control effectiveness through the inventory → assessment →
//!   scenario precedence chain into clamped combined values
//! - normalises the optional Gaussian-copula dependency into a validated
//!   correlation matrix
//!
//! Planning is randomness-free and never raises: problems accumulate as
//! structured [`PlanMessage`](message::PlanMessage) entries and a plan is
//! produced only when zero errors exist. Warnings never block.
//!
//! Document access goes through the injectable
//! [`DocumentSource`](source::DocumentSource) so planning is testable
//! without a filesystem.

pub mod message;
pub mod plan;
pub mod planner;
pub mod source;

pub use message::{MessageLevel, PlanMessage};
pub use plan::{CopulaPlan, ExecutionPlan, PlanReport, ResolvedScenario, ResolvedScenarioControl};
pub use planner::plan_portfolio;
pub use source::{DocumentSource, FsDocumentSource, MemoryDocumentSource, SourceError};
