//! Long-running process components

use crate::Result;
use async_trait::async_trait;

/// A component with an explicit start, run, shutdown lifecycle, such as
/// the connection to a chat platform. Handlers never reach it through
/// globals; the binary owns it and drives the lifecycle.
#[async_trait]
pub trait Service: Send + Sync {
    /// Short identifier used in logs
    fn service_type(&self) -> &str;

    /// Begin background work. Calling it on a running service is a no-op.
    async fn start(&mut self) -> Result<()>;

    /// Release connections. Safe to call when never started.
    async fn stop(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(if self.is_running() {
            ServiceHealth::Healthy
        } else {
            ServiceHealth::Unhealthy
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceHealth {
    Healthy,
    Unhealthy,
}
