// # Notifier Trait
//
// Defines the interface for a notification sink.
//
// ## Implementations
//
// - Console: `halkarz_core::notify::ConsoleNotifier`
// - Webhook: `halkarz-webhook` crate
//
// ## Delivery Semantics
//
// A record is marked seen before any sink is called. A failed delivery is
// reported to the engine, logged, and never retried, so every record gets at
// most one delivery attempt per sink across restarts.

use async_trait::async_trait;

use crate::model::{ListingRecord, ReportLine};

/// Trait for notification sinks
///
/// Each configured sink is called independently; an error from one sink does
/// not stop delivery to the others.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification for a newly discovered listing
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Delivered
    /// - `Err(Error::Delivery)`: Delivery failed
    async fn notify(&self, record: &ListingRecord) -> Result<(), crate::Error>;

    /// Show an enumerated listing report
    ///
    /// Used for the baseline and the periodic full listing. Sinks that only
    /// carry per-listing alerts keep the default, which does nothing.
    async fn report(&self, _title: &str, _lines: &[ReportLine]) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Sink name used in logs and errors
    fn name(&self) -> &'static str;
}
