//! Error types for quantifier validation, configuration, and solver outcomes.

use std::fmt;

/// Result type for fallible operations across the crate.
pub type CheckResult<T = ()> = Result<T, CheckError>;

/// An error raised while validating input or encoding a hyperproperty.
#[derive(Debug)]
pub struct CheckError {
    pub kind: CheckErrorKind,
    pub explanation: String,
}

/// The kind of error.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckErrorKind {
    /// Raised by an external front-end's grammar or MDP-file parser. The
    /// core never constructs this variant itself; it exists so a caller can
    /// report parse failures through the same error type.
    ParseFailure,

    /// State or stutter quantifier indices are not named `1..n` in order.
    MalformedQuantifierPrefix,

    /// A quantified state has no stutter quantifier associated with it, or
    /// a stutter quantifier's associated state index is not quantified.
    QuantifierCoverage,

    /// A stutter variable is referenced in the body without being
    /// quantified, or vice versa.
    QuantifierScoping,

    /// A formula node this encoder does not support, e.g. a universal
    /// scheduler quantifier.
    UnsupportedOperator { node: String },

    /// The solver returned `unknown`.
    SolverUnknown,

    /// The solver signaled an internal failure.
    SolverFailure,

    /// An `EncoderConfig` value failed its own validity check.
    InvalidConfig,

    /// An `Mdp` value failed a construction-time invariant check.
    MalformedMdp,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CheckErrorKind::ParseFailure => write!(f, "parse failure: {}", self.explanation),
            CheckErrorKind::MalformedQuantifierPrefix => {
                write!(f, "malformed quantifier prefix: {}", self.explanation)
            }
            CheckErrorKind::QuantifierCoverage => {
                write!(f, "quantifier coverage error: {}", self.explanation)
            }
            CheckErrorKind::QuantifierScoping => {
                write!(f, "quantifier scoping error: {}", self.explanation)
            }
            CheckErrorKind::UnsupportedOperator { node } => {
                write!(f, "unsupported operator '{}': {}", node, self.explanation)
            }
            CheckErrorKind::SolverUnknown => {
                write!(f, "solver returned unknown: {}", self.explanation)
            }
            CheckErrorKind::SolverFailure => write!(f, "solver failure: {}", self.explanation),
            CheckErrorKind::InvalidConfig => write!(f, "invalid configuration: {}", self.explanation),
            CheckErrorKind::MalformedMdp => write!(f, "malformed MDP: {}", self.explanation),
        }
    }
}

impl std::error::Error for CheckError {}

impl CheckError {
    fn new(kind: CheckErrorKind, explanation: impl Into<String>) -> Self {
        Self {
            kind,
            explanation: explanation.into(),
        }
    }

    pub fn parse_failure(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::ParseFailure, explanation)
    }

    pub fn malformed_quantifier_prefix(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::MalformedQuantifierPrefix, explanation)
    }

    pub fn quantifier_coverage(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::QuantifierCoverage, explanation)
    }

    pub fn quantifier_scoping(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::QuantifierScoping, explanation)
    }

    pub fn unsupported_operator(node: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            kind: CheckErrorKind::UnsupportedOperator { node: node.into() },
            explanation: explanation.into(),
        }
    }

    pub fn solver_unknown(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::SolverUnknown, explanation)
    }

    pub fn solver_failure(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::SolverFailure, explanation)
    }

    pub fn invalid_config(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::InvalidConfig, explanation)
    }

    pub fn malformed_mdp(explanation: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::MalformedMdp, explanation)
    }
}
