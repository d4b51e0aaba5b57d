//! Constants used throughout the ward core crate.

/// Default interval between reconciliation fetches.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Base URL used when no ward API URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";

/// Patient status that makes a patient eligible for the unassigned pool.
pub const ACTIVE_PATIENT_STATUS: &str = "active";

/// Suffix appended to every alert raised by a rolled-back mutation.
pub const REVERT_NOTICE: &str = "Reverting changes.";
