//! Remote error taxonomy for completed sync attempts

pub mod classifier;

pub use classifier::{
    classify, is_create_unsuccessful_item_already_exists, is_fatal, is_planner_originated,
    is_transient, is_update_unsuccessful_item_not_in_remote, qualifies_for_resend, remote_error_kind,
    AttemptOutcome, OutcomeCategory, RemoteErrorKind, CREATE_TARGET_EXISTS_CODE,
    PLANNER_ORIGINATED_CODE, TRANSIENT_CODES, UPDATE_TARGET_MISSING_CODE,
};
