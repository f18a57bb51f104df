//! Fatal phase errors.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// When a validation action runs relative to the phase body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStage {
    Pre,
    Post,
}

impl std::fmt::Display for ActionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStage::Pre => write!(f, "pre"),
            ActionStage::Post => write!(f, "post"),
        }
    }
}

/// Failure reported by a validation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// The invariant that does not hold.
    pub invariant: String,
    /// Individual findings backing the failure.
    pub violations: Vec<String>,
}

impl ValidationFailure {
    pub fn new(invariant: impl Into<String>) -> Self {
        Self {
            invariant: invariant.into(),
            violations: Vec::new(),
        }
    }

    pub fn with_violations(mut self, violations: impl IntoIterator<Item = String>) -> Self {
        self.violations.extend(violations);
        self
    }
}

/// A fault raised by a phase body.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionFault {
    #[error("entry point '{name}' does not resolve to a declaration")]
    #[diagnostic(
        code(kiln::phase::unresolved_entry_point),
        help("set [entry] name in kiln.toml to a function of the program")
    )]
    UnresolvedEntryPoint { name: String },

    #[error("{registry} registry is not available")]
    #[diagnostic(code(kiln::phase::missing_registry))]
    MissingRegistry { registry: &'static str },

    #[error("backend checks found {errors} error(s)")]
    #[diagnostic(code(kiln::phase::checks_failed))]
    ChecksFailed { errors: usize },

    #[error("malformed IR: {message}")]
    #[diagnostic(code(kiln::phase::malformed_ir))]
    MalformedIr { message: String },
}

impl ExecutionFault {
    pub fn malformed(message: impl Into<String>) -> Self {
        ExecutionFault::MalformedIr {
            message: message.into(),
        }
    }
}

/// A fatal error surfaced by [`PhaseEngine::run_phase`](super::PhaseEngine::run_phase).
#[derive(Debug, Error, Diagnostic)]
pub enum PhaseError {
    /// A pre- or post-action rejected the phase artifact.
    #[error("{stage}-condition of phase '{phase}' violated: {invariant}")]
    #[diagnostic(code(kiln::phase::validation))]
    Validation {
        phase: &'static str,
        stage: ActionStage,
        invariant: String,
        violations: Vec<String>,
    },

    /// The phase body failed.
    #[error("phase '{phase}' failed: {fault}")]
    #[diagnostic(code(kiln::phase::execution))]
    Execution {
        phase: &'static str,
        #[source]
        fault: ExecutionFault,
    },
}

impl PhaseError {
    /// Name of the phase the error is attributed to.
    pub fn phase(&self) -> &'static str {
        match self {
            PhaseError::Validation { phase, .. } | PhaseError::Execution { phase, .. } => phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = PhaseError::Validation {
            phase: "addEntryPoint",
            stage: ActionStage::Post,
            invariant: "IR is structurally well-formed".into(),
            violations: vec![],
        };

        assert_eq!(
            err.to_string(),
            "post-condition of phase 'addEntryPoint' violated: IR is structurally well-formed"
        );
        assert_eq!(err.phase(), "addEntryPoint");
    }

    #[test]
    fn test_execution_message() {
        let err = PhaseError::Execution {
            phase: "addEntryPoint",
            fault: ExecutionFault::UnresolvedEntryPoint {
                name: "app.main".into(),
            },
        };

        assert_eq!(
            err.to_string(),
            "phase 'addEntryPoint' failed: entry point 'app.main' does not resolve to a declaration"
        );
    }
}
