//! The result algebra utilities report through.
//!
//! Utilities produce an [`ExecutionResult`]: value-computing utilities emit a
//! [`UtilityOutcome`], file-mutating operations emit an [`OperationOutcome`].
//! The engine wraps every invocation in a [`PerformResult`], which also covers
//! the cases where the utility never ran (skipped by condition or dependency)
//! or failed before executing.

use crate::error::UtilityError;
use crate::value::Value;

/// Outcome of a value-computing utility execution.
#[derive(Debug, Clone)]
pub enum UtilityOutcome {
    /// The utility ran but produced nothing.
    Null,
    Value(Value),
    Warning {
        value: Option<Value>,
        details: String,
        warnings: Vec<UtilityError>,
    },
    Error(UtilityError),
}

impl UtilityOutcome {
    pub fn warning(details: impl Into<String>, value: Option<Value>) -> Self {
        UtilityOutcome::Warning {
            value,
            details: details.into(),
            warnings: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, UtilityOutcome::Error(_))
    }

    /// The produced value, for `Value` and value-carrying `Warning` outcomes.
    pub fn value(&self) -> Option<&Value> {
        match self {
            UtilityOutcome::Value(value) => Some(value),
            UtilityOutcome::Warning { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&UtilityError> {
        match self {
            UtilityOutcome::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Outcome of a file-mutating operation execution.
#[derive(Debug, Clone)]
pub enum OperationOutcome {
    Success {
        details: String,
    },
    /// Nothing needed to change.
    NoOp {
        details: String,
    },
    Warning {
        details: String,
        warnings: Vec<UtilityError>,
    },
    Error {
        error: UtilityError,
        details: String,
    },
}

impl OperationOutcome {
    pub fn success(details: impl Into<String>) -> Self {
        OperationOutcome::Success {
            details: details.into(),
        }
    }

    pub fn no_op(details: impl Into<String>) -> Self {
        OperationOutcome::NoOp {
            details: details.into(),
        }
    }

    pub fn warning(details: impl Into<String>, warnings: Vec<UtilityError>) -> Self {
        OperationOutcome::Warning {
            details: details.into(),
            warnings,
        }
    }

    pub fn error(error: UtilityError, details: impl Into<String>) -> Self {
        OperationOutcome::Error {
            error,
            details: details.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationOutcome::Error { .. })
    }

    pub fn details(&self) -> &str {
        match self {
            OperationOutcome::Success { details }
            | OperationOutcome::NoOp { details }
            | OperationOutcome::Warning { details, .. }
            | OperationOutcome::Error { details, .. } => details,
        }
    }

    pub fn get_error(&self) -> Option<&UtilityError> {
        match self {
            OperationOutcome::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// What a utility execution reported, by utility family.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Utility(UtilityOutcome),
    Operation(OperationOutcome),
}

impl ExecutionResult {
    pub fn is_exception(&self) -> bool {
        match self {
            ExecutionResult::Utility(outcome) => outcome.is_error(),
            ExecutionResult::Operation(outcome) => outcome.is_error(),
        }
    }

    pub fn error(&self) -> Option<&UtilityError> {
        match self {
            ExecutionResult::Utility(outcome) => outcome.error(),
            ExecutionResult::Operation(outcome) => outcome.get_error(),
        }
    }
}

/// The engine's record of one utility invocation.
#[derive(Debug, Clone)]
pub enum PerformResult {
    /// The utility ran; what happened is in the execution result.
    Executed(ExecutionResult),
    /// The `execute_if` condition did not hold.
    SkippedCondition { details: String },
    /// At least one dependency had not produced a non-failure result.
    SkippedDependency { details: String },
    /// The utility failed before or outside its own execution.
    Error {
        error: UtilityError,
        details: Option<String>,
    },
}

impl PerformResult {
    pub fn skipped_condition(details: impl Into<String>) -> Self {
        PerformResult::SkippedCondition {
            details: details.into(),
        }
    }

    pub fn skipped_dependency(details: impl Into<String>) -> Self {
        PerformResult::SkippedDependency {
            details: details.into(),
        }
    }

    pub fn error(error: UtilityError) -> Self {
        PerformResult::Error {
            error,
            details: None,
        }
    }

    /// True when this result carries a failure, either directly or through
    /// an error-tagged execution result.
    pub fn is_exception(&self) -> bool {
        match self {
            PerformResult::SkippedCondition { .. } | PerformResult::SkippedDependency { .. } => {
                false
            }
            PerformResult::Error { .. } => true,
            PerformResult::Executed(result) => result.is_exception(),
        }
    }

    /// Dependency-failure criterion: dependents of a utility with a result
    /// for which this holds are skipped.
    pub fn is_dependency_failure(&self) -> bool {
        match self {
            PerformResult::SkippedCondition { .. }
            | PerformResult::SkippedDependency { .. }
            | PerformResult::Error { .. } => true,
            PerformResult::Executed(result) => result.is_exception(),
        }
    }

    pub fn execution_result(&self) -> Option<&ExecutionResult> {
        match self {
            PerformResult::Executed(result) => Some(result),
            _ => None,
        }
    }

    pub fn utility_outcome(&self) -> Option<&UtilityOutcome> {
        match self.execution_result() {
            Some(ExecutionResult::Utility(outcome)) => Some(outcome),
            _ => None,
        }
    }

    pub fn operation_outcome(&self) -> Option<&OperationOutcome> {
        match self.execution_result() {
            Some(ExecutionResult::Operation(outcome)) => Some(outcome),
            _ => None,
        }
    }

    /// The failure behind this result, whichever layer it occurred at.
    pub fn get_error(&self) -> Option<&UtilityError> {
        match self {
            PerformResult::Error { error, .. } => Some(error),
            PerformResult::Executed(result) => result.error(),
            _ => None,
        }
    }
}
