//! Accept/reject decision for a cleaned file

use super::error::JobError;

/// Outcome of the acceptance check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Persist the valid subset
    Accept,
    /// Persist nothing
    Reject,
}

/// Reject when strictly more than half the rows are invalid.
pub fn evaluate(invalid_count: usize, total_count: usize) -> Decision {
    // 2 * invalid > total, without the rounding of an integer half
    if invalid_count.saturating_mul(2) > total_count {
        Decision::Reject
    } else {
        Decision::Accept
    }
}

/// [`evaluate`], turning a rejection into [`JobError::TooManyInvalidRows`].
pub fn enforce(invalid_count: usize, total_count: usize) -> Result<(), JobError> {
    match evaluate(invalid_count, total_count) {
        Decision::Accept => Ok(()),
        Decision::Reject => Err(JobError::TooManyInvalidRows {
            invalid: invalid_count,
            total: total_count,
        }),
    }
}
