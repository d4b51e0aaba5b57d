use crate::wire::HealthRes;

/// Simple health service used by the ward API and its clients.
pub struct HealthService;

impl HealthService {
    /// Report the ward API as alive.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Ward API is alive".into(),
        }
    }
}
