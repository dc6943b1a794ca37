// # Page Source Trait
//
// Defines the interface for fetching the watched listings page.
//
// ## Implementations
//
// - HTTP GET: `halkarz-http` crate
// - Test doubles that replay scripted pages
//
// ## Contract
//
// One attempt per call. A non-success status, a transport error or a timeout
// is an `Error::Fetch`; the engine skips the cycle and tries again at the
// next tick. Retrying is not the source's job.

use async_trait::async_trait;

/// Trait for page source implementations
///
/// The source owns its transport (e.g. an HTTP client). The engine owns the
/// source, so the transport is released when the engine is dropped.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page body
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The page markup (HTTP 200)
    /// - `Err(Error::Fetch)`: Any other outcome
    async fn fetch(&self) -> Result<String, crate::Error>;

    /// Human-readable description of what is fetched (for logs)
    fn describe(&self) -> String;
}
