//! Console notification sink

use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};

use super::{MESSAGE_SEPARATOR, format_message, render_report};
use crate::error::{Error, Result};
use crate::model::{ListingRecord, ReportLine};
use crate::traits::Notifier;

/// Writes notifications and listing reports to standard output
///
/// The writer can be replaced for tests. Writes are short and never held
/// across an await, so a std mutex is enough.
#[derive(Clone)]
pub struct ConsoleNotifier {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl std::fmt::Debug for ConsoleNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleNotifier").finish_non_exhaustive()
    }
}

impl ConsoleNotifier {
    /// Console sink on standard output
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// Console sink on an arbitrary writer
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::delivery("console", "output lock poisoned"))?;
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| Error::delivery("console", e.to_string()))
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, record: &ListingRecord) -> Result<()> {
        let framed = format!(
            "\n{sep}\n{}\n{sep}\n\n",
            format_message(record),
            sep = MESSAGE_SEPARATOR
        );
        self.write_text(&framed)
    }

    async fn report(&self, title: &str, lines: &[ReportLine]) -> Result<()> {
        self.write_text(&render_report(title, lines))
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
