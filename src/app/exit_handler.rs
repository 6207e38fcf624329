//! Exit code logic for the dlist process.
//!
//! Single responsibility: map a download outcome to the process exit outcome.

use dlist_core::Outcome;

use crate::ProcessExit;

/// Determines the process exit outcome from a finished download.
pub(crate) fn determine_exit_outcome(outcome: &Outcome) -> ProcessExit {
    match outcome {
        Outcome::Succeeded { .. } => ProcessExit::Success,
        Outcome::Cancelled => ProcessExit::Cancelled,
        Outcome::Failed { .. } => ProcessExit::Failure,
    }
}
