use crate::error::Result;
use crate::monitor::session::Reading;
use async_trait::async_trait;

/// Source of price readings.
///
/// Implementations return `SamplerUnavailable` when no trustworthy value can
/// be produced. Callers bound `read` with their own timeout.
#[async_trait]
pub trait Sampler: Send + Sync {
    async fn read(&self) -> Result<Reading>;
}
