//! Route paths of the ward API, relative to the configured base URL.

pub const HEALTH: &str = "/health";
pub const WARDS: &str = "/wards";
pub const PATIENTS: &str = "/patients";
pub const ASSIGN_BED: &str = "/beds/assign";
pub const UNASSIGN_BED: &str = "/beds/unassign";
pub const BED_STATUS: &str = "/beds/status";
