//! Core business logic for Hospifin.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `report` - Financial line-item schema, periods, and the derivation engine
//! - `lifecycle` - Report status state machine, report store, and orchestration
//! - `access` - Role to permission policy, password hashing, user rules
//! - `dashboard` - Snapshot statistics over approved reports
//! - `settings` - Per-hospital configuration
//! - `review` - Review schedules attached to reports
//! - `export` - Report export artifacts

pub mod access;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod report;
pub mod review;
pub mod settings;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use validation::ValidationError;
