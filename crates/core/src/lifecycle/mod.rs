//! Report lifecycle management.
//!
//! This module implements the draft → submitted → approved → archived state
//! machine, the report store abstraction, and the orchestrator that ties
//! guards, derivation, and persistence together.
//!
//! # Modules
//!
//! - `types` - ReportStatus, LifecycleAction, LifecycleTransition
//! - `service` - Permission and state guards
//! - `store` - Repository interface and query type
//! - `memory` - In-memory store
//! - `archive` - Age-based archive policy
//! - `manager` - Report operations for an actor

pub mod archive;
pub mod manager;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod manager_tests;
#[cfg(test)]
mod service_props;

pub use archive::ArchivePolicy;
pub use manager::{ReportFilter, ReportManager, apply_transition};
pub use memory::{InMemoryReportStore, newest_period_first};
pub use service::LifecycleService;
pub use store::{ReportQuery, ReportStore};
pub use types::{LifecycleAction, LifecycleTransition, ReportStatus};
