use rust_decimal::Decimal;

use super::Identifier;
use crate::errors::{FailureReason, LookupError};

/// Terminal result of one identifier's task.
///
/// Exactly one outcome is produced per dispatched identifier.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupOutcome {
    /// A positive price was resolved.
    Priced { identifier: Identifier, price: Decimal },

    /// No usable price.
    Failed {
        identifier: Identifier,
        reason: FailureReason,
        diagnostic: String,
    },
}

impl LookupOutcome {
    pub fn failed(identifier: Identifier, error: &LookupError) -> Self {
        Self::Failed {
            identifier,
            reason: error.reason(),
            diagnostic: error.diagnostic(),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Self::Priced { identifier, .. } | Self::Failed { identifier, .. } => identifier,
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, Self::Priced { .. })
    }
}

/// Counters for a completed pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Identifiers handed to workers.
    pub dispatched: usize,
    /// Outcomes routed to the success sink.
    pub priced: usize,
    /// Outcomes routed to the failure sink.
    pub failed: usize,
    /// Records that could not be written to their sink.
    pub write_errors: usize,
}

impl PipelineReport {
    /// Every dispatched identifier produced exactly one routed outcome.
    pub fn is_complete(&self) -> bool {
        self.priced + self.failed == self.dispatched
    }
}
