//! Classification of Planner error codes
//!
//! The taxonomy is a fixed table from code to [`RemoteErrorKind`]. Two
//! operation-specific refinements sit on top of it: a create rejected because
//! the item already exists, and an update rejected because the item is gone.
//! Every failed attempt lands in exactly one [`OutcomeCategory`].

use planner_sync_domain::{PlannerSyncError, Result, SyncAttempt, SyncOperation};

/// Failure raised by Planner itself having changed the item.
pub const PLANNER_ORIGINATED_CODE: i32 = 13;

/// Create rejected because the target already exists in Planner.
pub const CREATE_TARGET_EXISTS_CODE: i32 = 8;

/// Update rejected because the target no longer exists in Planner.
pub const UPDATE_TARGET_MISSING_CODE: i32 = 10;

/// Network and timeout class failures; eligible for resend.
pub const TRANSIENT_CODES: [i32; 6] = [15, 16, 6902, 6903, 6904, 6905];

const FATAL_CODES: std::ops::RangeInclusive<i32> = 1..=14;

/// Coarse meaning of a Planner error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    Fatal,
    PlannerOriginated,
    Transient,
}

/// Look up the coarse kind of `code`; `None` means the code is unclassified.
pub fn remote_error_kind(code: i32) -> Option<RemoteErrorKind> {
    if code == PLANNER_ORIGINATED_CODE {
        Some(RemoteErrorKind::PlannerOriginated)
    } else if FATAL_CODES.contains(&code) {
        Some(RemoteErrorKind::Fatal)
    } else if TRANSIENT_CODES.contains(&code) {
        Some(RemoteErrorKind::Transient)
    } else {
        None
    }
}

/// Classified result of a completed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    /// Effectively a success: the item Planner was asked to create exists.
    CreateUnsuccessfulItemAlreadyExists,
    /// The caller decides what to do; no operation switch happens here.
    UpdateUnsuccessfulItemNotInRemote,
    PlannerOriginated { code: i32 },
    Fatal { code: i32 },
    Transient { code: i32 },
    Unclassified { code: Option<i32> },
}

/// The four buckets a failed attempt can fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    Fatal,
    PlannerOriginated,
    Transient,
    Unclassified,
}

impl AttemptOutcome {
    /// `None` for a success, otherwise the single category of the failure.
    pub fn category(&self) -> Option<OutcomeCategory> {
        match self {
            Self::Succeeded => None,
            Self::CreateUnsuccessfulItemAlreadyExists
            | Self::UpdateUnsuccessfulItemNotInRemote
            | Self::Fatal { .. } => Some(OutcomeCategory::Fatal),
            Self::PlannerOriginated { .. } => Some(OutcomeCategory::PlannerOriginated),
            Self::Transient { .. } => Some(OutcomeCategory::Transient),
            Self::Unclassified { .. } => Some(OutcomeCategory::Unclassified),
        }
    }

    /// Outcomes that need no further work for the attempt.
    pub fn is_effective_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::CreateUnsuccessfulItemAlreadyExists)
    }

    pub fn qualifies_for_resend(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

fn failed_code(attempt: &SyncAttempt) -> Option<i32> {
    if attempt.is_failed() {
        attempt.remote_error_code
    } else {
        None
    }
}

fn failed_with_kind(attempt: &SyncAttempt, kind: RemoteErrorKind) -> bool {
    failed_code(attempt).and_then(remote_error_kind) == Some(kind)
}

pub fn is_fatal(attempt: &SyncAttempt) -> bool {
    failed_with_kind(attempt, RemoteErrorKind::Fatal)
}

pub fn is_planner_originated(attempt: &SyncAttempt) -> bool {
    failed_with_kind(attempt, RemoteErrorKind::PlannerOriginated)
}

pub fn is_transient(attempt: &SyncAttempt) -> bool {
    failed_with_kind(attempt, RemoteErrorKind::Transient)
}

pub fn is_create_unsuccessful_item_already_exists(attempt: &SyncAttempt) -> bool {
    attempt.operation == SyncOperation::Create
        && failed_code(attempt) == Some(CREATE_TARGET_EXISTS_CODE)
}

pub fn is_update_unsuccessful_item_not_in_remote(attempt: &SyncAttempt) -> bool {
    attempt.operation == SyncOperation::Update
        && failed_code(attempt) == Some(UPDATE_TARGET_MISSING_CODE)
}

/// Failed, carries a code, and that code is transient.
pub fn qualifies_for_resend(attempt: &SyncAttempt) -> bool {
    failed_code(attempt).is_some()
        && !is_planner_originated(attempt)
        && !is_fatal(attempt)
        && is_transient(attempt)
}

/// Classify a completed attempt.
///
/// # Errors
///
/// Returns [`PlannerSyncError::Contract`] when the attempt has no remote
/// outcome yet, or carries an outcome without `synced_at`.
pub fn classify(attempt: &SyncAttempt) -> Result<AttemptOutcome> {
    let Some(success) = attempt.remote_success else {
        return Err(PlannerSyncError::Contract(format!(
            "sync log {} has no remote outcome to classify",
            attempt.id
        )));
    };
    if attempt.synced_at.is_none() {
        return Err(PlannerSyncError::Contract(format!(
            "sync log {} has a remote outcome but no synced_at",
            attempt.id
        )));
    }
    if success {
        return Ok(AttemptOutcome::Succeeded);
    }

    if is_create_unsuccessful_item_already_exists(attempt) {
        return Ok(AttemptOutcome::CreateUnsuccessfulItemAlreadyExists);
    }
    if is_update_unsuccessful_item_not_in_remote(attempt) {
        return Ok(AttemptOutcome::UpdateUnsuccessfulItemNotInRemote);
    }

    let code = attempt.remote_error_code;
    Ok(match code.and_then(remote_error_kind) {
        Some(RemoteErrorKind::PlannerOriginated) => {
            AttemptOutcome::PlannerOriginated { code: PLANNER_ORIGINATED_CODE }
        }
        Some(RemoteErrorKind::Fatal) => AttemptOutcome::Fatal { code: code.unwrap_or_default() },
        Some(RemoteErrorKind::Transient) => {
            AttemptOutcome::Transient { code: code.unwrap_or_default() }
        }
        None => AttemptOutcome::Unclassified { code },
    })
}
