use crate::dto::HealthRes;

/// Plain-text body returned by the root liveness endpoint.
pub const LIVENESS_TEXT: &str = "Upload service running";

/// Simple health service shared by the REST API and the CLI
///
/// Health checks never touch storage, so calling them any number of times has no effect
/// on the vault.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Vault is alive".into(),
        }
    }

    /// Body of the plain-text liveness endpoint.
    pub fn liveness() -> &'static str {
        LIVENESS_TEXT
    }
}
