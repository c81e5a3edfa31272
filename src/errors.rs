// Copyright 2025 Cowboy AI, LLC.

//! Error types for financial domain operations

use thiserror::Error;

/// Errors that can occur in financial domain operations
///
/// Structural variants describe malformed inputs rejected at a value-type or
/// entity boundary. [`FinanceError::BusinessRuleViolation`] describes an
/// advisory outcome (an unhealthy profile, an unreachable goal) that callers
/// may present as a warning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinanceError {
    /// Monetary amount could not be constructed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic or comparison between amounts of different currencies
    #[error("Currency mismatch in {operation}: {left} and {right}")]
    CurrencyMismatch {
        /// Operation that was attempted
        operation: &'static str,
        /// Currency of the receiver
        left: String,
        /// Currency of the argument
        right: String,
    },

    /// Rate outside [0, 100] or not finite
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Period with negative or non-finite components
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Invariant violation
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Business rule violation
    #[error("Business rule violation: {rule}")]
    BusinessRuleViolation {
        /// Description of the violated rule
        rule: String,
    },

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    EntityNotFound {
        /// Type of entity that wasn't found
        entity_type: String,
        /// ID that was searched for
        id: String,
    },

    /// Planning policy could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A nested calculation failed
    #[error("{context}: {source}")]
    Calculation {
        /// Which sub-calculation failed
        context: String,
        /// Underlying failure
        #[source]
        source: Box<FinanceError>,
    },
}

/// Result type for financial domain operations
pub type FinanceResult<T> = Result<T, FinanceError>;

impl From<serde_json::Error> for FinanceError {
    fn from(err: serde_json::Error) -> Self {
        FinanceError::Configuration(err.to_string())
    }
}

impl FinanceError {
    /// Create a business rule violation
    pub fn business_rule(rule: impl Into<String>) -> Self {
        FinanceError::BusinessRuleViolation { rule: rule.into() }
    }

    /// Create a not-found error for the given entity type
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        FinanceError::EntityNotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Wrap this error with the name of the calculation that failed
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FinanceError::Calculation {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every calculation context
    pub fn root_cause(&self) -> &FinanceError {
        let mut current = self;
        while let FinanceError::Calculation { source, .. } = current {
            current = source;
        }
        current
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), FinanceError::EntityNotFound { .. })
    }

    /// Check if this is a business rule outcome rather than malformed input
    pub fn is_business_rule(&self) -> bool {
        matches!(self.root_cause(), FinanceError::BusinessRuleViolation { .. })
    }

    /// Check if this is a structural invariant violation
    pub fn is_structural(&self) -> bool {
        matches!(
            self.root_cause(),
            FinanceError::InvalidAmount(_)
                | FinanceError::CurrencyMismatch { .. }
                | FinanceError::InvalidRate(_)
                | FinanceError::InvalidPeriod(_)
                | FinanceError::InvariantViolation(_)
                | FinanceError::ValidationError(_)
        )
    }
}

/// Attach calculation context to a failed result
pub trait ResultExt<T> {
    /// Wrap the error, if any, with the name of the failing calculation
    fn context(self, context: &str) -> FinanceResult<T>;
}

impl<T> ResultExt<T> for FinanceResult<T> {
    fn context(self, context: &str) -> FinanceResult<T> {
        self.map_err(|err| err.with_context(context))
    }
}
