//! Error taxonomy for migration-factory operations.
//!
//! Every public operation returns a tagged result with one of these variants
//! rather than aborting the caller. All variants are input-driven and
//! recoverable; invariant violations (e.g. a plan that does not partition its
//! inventory) are programming bugs and are asserted in tests instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactoryError {
    /// Malformed or empty input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Discovery scope could not be resolved into an inventory.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Unsatisfiable partition or cyclic dependency graph.
    #[error("wave planning failed: {0}")]
    Planning(String),

    /// A phase failed while driving a wave execution.
    #[error("wave execution failed: {0}")]
    Execution(String),

    /// Required aggregate inputs missing from a report request.
    #[error("report generation failed: {0}")]
    Reporting(String),
}

impl FactoryError {
    /// Stable machine-readable code for the API error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            FactoryError::Validation(_) => "validation_failed",
            FactoryError::Discovery(_) => "discovery_failed",
            FactoryError::Planning(_) => "planning_failed",
            FactoryError::Execution(_) => "execution_failed",
            FactoryError::Reporting(_) => "reporting_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, FactoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            FactoryError::Validation("x".into()).code(),
            "validation_failed"
        );
        assert_eq!(FactoryError::Planning("x".into()).code(), "planning_failed");
        assert_eq!(
            FactoryError::Execution("x".into()).code(),
            "execution_failed"
        );
    }

    #[test]
    fn display_includes_detail() {
        let e = FactoryError::Planning("cycle involving srv-003".into());
        assert!(e.to_string().contains("srv-003"));
    }
}
