//! Classification of stack statuses into monitoring verdicts

use crate::models::{Intent, StackStatus};

/// What the monitor should do after seeing a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Success,
    Failure(FailureReason),
}

impl Verdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Continue)
    }
}

/// Why a stack ended in a state the caller did not ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    RolledBack,
    Deleted,
    Failed(StackStatus),
    /// Terminal, recognized, but not the outcome of the requested operation
    Unexpected(StackStatus),
    UnknownStatus(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::RolledBack => write!(f, "rolled back"),
            FailureReason::Deleted => write!(f, "deleted"),
            FailureReason::Failed(status) => write!(f, "failed with {status}"),
            FailureReason::Unexpected(status) => write!(f, "ended in unexpected status {status}"),
            FailureReason::UnknownStatus(raw) => write!(f, "reported unknown status {raw}"),
        }
    }
}

/// Map a stack status to a verdict for the given intent.
///
/// Total over `StackStatus`: unknown values fail closed, never succeed.
pub fn classify(status: &StackStatus, intent: Intent) -> Verdict {
    use StackStatus::*;

    match status {
        CreateInProgress
        | RollbackInProgress
        | DeleteInProgress
        | UpdateInProgress
        | UpdateCompleteCleanupInProgress
        | UpdateRollbackInProgress
        | UpdateRollbackCompleteCleanupInProgress
        | ReviewInProgress
        | ImportInProgress
        | ImportRollbackInProgress => Verdict::Continue,

        CreateFailed | RollbackFailed | DeleteFailed | UpdateFailed | UpdateRollbackFailed
        | ImportRollbackFailed => Verdict::Failure(FailureReason::Failed(status.clone())),

        RollbackComplete | UpdateRollbackComplete | ImportRollbackComplete => match intent {
            Intent::Delete => Verdict::Failure(FailureReason::Unexpected(status.clone())),
            Intent::Create | Intent::Update | Intent::Import => {
                Verdict::Failure(FailureReason::RolledBack)
            }
        },

        DeleteComplete => match intent {
            Intent::Delete => Verdict::Success,
            Intent::Create | Intent::Update | Intent::Import => {
                Verdict::Failure(FailureReason::Deleted)
            }
        },

        CreateComplete | UpdateComplete | ImportComplete => match intent {
            Intent::Delete => Verdict::Failure(FailureReason::Unexpected(status.clone())),
            Intent::Create | Intent::Update | Intent::Import => Verdict::Success,
        },

        // Resource-level status; a stack reporting it is not something we can act on
        DeleteSkipped => Verdict::Failure(FailureReason::Unexpected(status.clone())),

        Unknown(raw) => Verdict::Failure(FailureReason::UnknownStatus(raw.clone())),
    }
}
