//! Error taxonomy for the scoring core.
//!
//! Every failure is fatal for the whole run: population-relative ranks are
//! meaningless over a partial population, so nothing is skipped or recovered.

use std::fmt;

use thiserror::Error;

/// The three RFM metric dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Recency => "recency",
            Metric::Frequency => "frequency",
            Metric::Monetary => "monetary",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RfmError {
    #[error("Invalid input for customer {customer_id}: {reason}")]
    InvalidInput { customer_id: String, reason: String },

    #[error(
        "Insufficient population for {metric}: {population} customers cannot form {bins} distinct quantile bins"
    )]
    InsufficientPopulation {
        metric: Metric,
        population: usize,
        bins: usize,
    },

    #[error("RF code {code} is not matched by any segment pattern")]
    UnmappedSegment { code: String },

    #[error("Unknown segment: {name}")]
    UnknownSegment { name: String },
}

impl RfmError {
    pub(crate) fn invalid(customer_id: &str, reason: impl Into<String>) -> Self {
        RfmError::InvalidInput {
            customer_id: customer_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for scoring-core operations
pub type RfmResult<T> = std::result::Result<T, RfmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = RfmError::invalid("cust-7", "monetary is negative");
        assert_eq!(
            err.to_string(),
            "Invalid input for customer cust-7: monetary is negative"
        );

        let err = RfmError::InsufficientPopulation {
            metric: Metric::Monetary,
            population: 1,
            bins: 5,
        };
        assert!(err.to_string().contains("monetary"));
    }
}
