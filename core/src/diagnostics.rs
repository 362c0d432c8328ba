//! Where intercepted failures get reported before they are normalized.

use tracing::error;

use crate::error::ApiError;

/// Fire-and-forget sink for failures the client swallows.
pub trait Diagnostics: Send + Sync {
    fn report(&self, error: &ApiError);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, error: &ApiError) {
        error!(%error, "An error occurred");
    }
}
