//! Error types for the bean-cp core library
//!
//! Configuration problems (statement ordering, unresolved coverage, missing
//! constructors) surface while the mapper is being built. Execution problems
//! (no applicable mapping, failing callbacks) surface from the mapping call
//! that hit them.

use std::fmt;
use thiserror::Error;

/// Main error type for mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic configuration errors detected while building a mapper
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A declarative map statement appeared after a statement it must precede
    #[error("Invalid statement order: {statement} cannot follow {previous}")]
    InvalidStatementOrder {
        statement: &'static str,
        previous: &'static str,
    },

    /// A statement that may appear at most once was repeated
    #[error("Duplicate statement: {statement} may be declared at most once")]
    DuplicateStatement { statement: &'static str },

    /// A destination type has neither a factory nor an instantiation hook
    #[error("Cannot construct instance of {type_name}")]
    NotConstructible { type_name: String },

    /// A convention configured to fail on partial coverage found unmapped members
    #[error("Not all {side} members of {type_name} are mapped: {}", members.join(", "))]
    CoverageViolation {
        side: MemberSide,
        type_name: String,
        members: Vec<String>,
    },

    /// No converter, declarative map or convention applies to the requested pair
    #[error("No mapping available from {from} to {to}")]
    NoMapping { from: String, to: String },

    /// An erased value did not hold the type it was read as
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A member was read or written through an accessor missing that capability
    #[error("Member access error: {member} - {message}")]
    MemberAccess { member: String, message: String },

    /// A user callback or converter function failed
    #[error("Callback failed: {source}")]
    Callback {
        #[source]
        source: anyhow::Error,
    },

    /// An object lock was poisoned by a panic in another mapping call
    #[error("Lock poisoned for object of type {type_name}")]
    LockPoisoned { type_name: String },

    /// Operation attempted in the wrong lifecycle state
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// A member-name include/exclude pattern failed to compile
    #[error("Invalid member pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of a mapping a coverage check ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSide {
    Source,
    Destination,
}

impl fmt::Display for MemberSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberSide::Source => write!(f, "source"),
            MemberSide::Destination => write!(f, "destination"),
        }
    }
}

impl Error {
    /// Wrap an error returned from user code.
    ///
    /// Engine errors that travelled through an `anyhow::Error` (a nested
    /// `map_to` inside a converter, for example) are unwrapped so callers see
    /// the engine variant unchanged.
    pub fn from_callback(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(inner) => inner,
            Err(other) => Error::Callback { source: other },
        }
    }

    pub(crate) fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// True for errors raised while configuring or building a mapper
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. }
                | Error::InvalidStatementOrder { .. }
                | Error::DuplicateStatement { .. }
                | Error::NotConstructible { .. }
                | Error::CoverageViolation { .. }
                | Error::Pattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoMapping {
            from: "Order".to_string(),
            to: "OrderDto".to_string(),
        };
        assert_eq!(err.to_string(), "No mapping available from Order to OrderDto");
    }

    #[test]
    fn test_coverage_violation_lists_members() {
        let err = Error::CoverageViolation {
            side: MemberSide::Destination,
            type_name: "OrderDto".to_string(),
            members: vec!["total".to_string(), "notes".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Not all destination members of OrderDto are mapped: total, notes"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_callback_unwraps_engine_errors() {
        let nested = anyhow::Error::new(Error::NotConstructible {
            type_name: "Widget".to_string(),
        });
        assert!(matches!(
            Error::from_callback(nested),
            Error::NotConstructible { .. }
        ));

        let foreign = anyhow::anyhow!("boom");
        let err = Error::from_callback(foreign);
        assert!(matches!(err, Error::Callback { .. }));
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "Callback failed: boom");
    }
}
