//! Core domain: inventory model, wave planner, execution state machine,
//! replication port, and reporting aggregator.

pub mod discovery;
pub mod error;
pub mod execution;
pub mod inventory;
pub mod planner;
pub mod replication;
pub mod report;
pub mod service;
