//! Consensus voting state machine
//!
//! Quorum policy: a submission stays `pending_validation` until one side of
//! the tally reaches the quorum threshold; upvotes reaching it first finalize
//! to `validated`, downvotes to `rejected`. Ties below threshold stay
//! pending. Terminal states are immutable; the store refuses further votes.

use crate::models::{SubmissionStatus, Verdict};

/// Quorum-based consensus engine. Pure decision logic; the store owns the
/// read-modify-write around it.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusEngine {
    quorum: u32,
}

impl ConsensusEngine {
    pub fn new(quorum: u32) -> Self {
        debug_assert!(quorum >= 1);
        Self { quorum }
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    /// Apply one verdict to a tally, returning the new counts
    pub fn tally(&self, upvotes: u32, downvotes: u32, verdict: Verdict) -> (u32, u32) {
        match verdict {
            Verdict::Authentic => (upvotes + 1, downvotes),
            Verdict::Inauthentic => (upvotes, downvotes + 1),
        }
    }

    /// Decide the state for a tally. `None` leaves the submission pending.
    pub fn evaluate(&self, upvotes: u32, downvotes: u32) -> Option<SubmissionStatus> {
        if upvotes >= self.quorum {
            Some(SubmissionStatus::Validated)
        } else if downvotes >= self.quorum {
            Some(SubmissionStatus::Rejected)
        } else {
            None
        }
    }
}
