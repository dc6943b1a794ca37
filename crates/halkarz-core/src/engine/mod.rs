//! Poll engine
//!
//! The PollEngine is responsible for:
//! - Fetching the listings page on a fixed-delay interval
//! - Extracting listing records
//! - Diffing them against the seen set
//! - Notifying every sink about new listings
//! - Persisting the seen set
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   markup   ┌──────────────────┐
//! │ PageSource  │──────────▶│ ListingExtractor │
//! └─────────────┘            └──────────────────┘
//!                                     │ records
//!                                     ▼
//!                            ┌──────────────┐
//!                            │  PollEngine  │ owns SeenSet
//!                            └──────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         ▼                           ▼                           ▼
//! ┌─────────────┐           ┌──────────────┐           ┌─────────────┐
//! │ SeenStore   │           │  Notifiers   │           │   Events    │
//! │ (persist)   │           │ (per sink)   │           │ (monitor)   │
//! └─────────────┘           └──────────────┘           └─────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Bootstrapping**: the first successful fetch is the baseline. Every
//!    listing on the page is registered as seen and shown in a report, but
//!    none is notified. A failed fetch leaves the engine here.
//! 2. **Steady**: each check registers unseen identities, notifies each new
//!    listing on every sink in page order, then persists the set.
//! 3. **ShuttingDown**: entered when the shutdown future completes. The seen
//!    set is persisted one last time.
//!
//! Checks never overlap: the sleep starts only after a cycle completes,
//! including all delivery attempts. Shutdown is observed during the sleep.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::EngineSettings;
use crate::error::{Error, Result};
use crate::extract::ListingExtractor;
use crate::model::{ListingRecord, ReportLine};
use crate::state::SeenSet;
use crate::traits::{Notifier, PageSource, SeenStore};

/// Title of the report shown for the baseline
pub const BASELINE_REPORT_TITLE: &str = "Mevcut Halka Arzlar";

/// Title of the periodic full listing report
pub const PERIODIC_REPORT_TITLE: &str = "Mevcut tüm halka arzlar listesi";

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for the first successful fetch (the baseline)
    Bootstrapping,
    /// Baseline taken; new listings are notified
    Steady,
    /// Shutdown requested (terminal)
    ShuttingDown,
}

/// Events emitted by the PollEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        sinks: usize,
        known_identities: usize,
    },

    /// Baseline registered without notifications
    BaselineRegistered {
        listings: usize,
        added: usize,
    },

    /// Page fetch failed, cycle skipped
    FetchFailed {
        error: String,
    },

    /// A listing not seen before was found
    NewListing {
        identity: String,
    },

    /// A sink failed to deliver a notification
    DeliveryFailed {
        sink: String,
        identity: String,
        error: String,
    },

    /// The seen set could not be persisted
    PersistFailed {
        error: String,
    },

    /// A steady-state check finished
    CheckCompleted {
        check: u64,
        listings: usize,
        new_listings: usize,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Outcome of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Fetch failed; nothing else happened
    FetchFailed,
    /// The baseline was registered
    Baseline {
        listings: usize,
        added: usize,
    },
    /// A steady-state check ran
    Checked {
        listings: usize,
        new_listings: usize,
    },
}

/// Counters over the engine's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Successful steady-state checks (the baseline is not counted)
    pub checks: u64,
    /// Ticks skipped because the fetch failed
    pub fetch_failures: u64,
    /// New listings announced to the sinks
    pub new_listings: u64,
    /// Successful sink deliveries
    pub deliveries: u64,
    /// Failed sink deliveries
    pub delivery_failures: u64,
}

/// Core poll engine
///
/// Owns the page source, the sinks, the seen store and the seen set. All work
/// happens on the caller's task; nothing is spawned.
pub struct PollEngine {
    /// Page fetcher
    source: Box<dyn PageSource>,

    /// Markup parser
    extractor: ListingExtractor,

    /// Notification sinks, called in order
    notifiers: Vec<Box<dyn Notifier>>,

    /// Persistence for the seen set
    store: Box<dyn SeenStore>,

    /// Identities seen so far
    seen: SeenSet,

    /// Whether the store held anything at startup
    had_history: bool,

    state: EngineState,

    settings: EngineSettings,

    stats: EngineStats,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl PollEngine {
    /// Create a new poll engine and load the seen set
    ///
    /// # Parameters
    ///
    /// - `source`: Page source implementation
    /// - `extractor`: Listing extractor
    /// - `notifiers`: Notification sinks (at least one)
    /// - `store`: Seen-store implementation
    /// - `settings`: Engine settings
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub async fn new(
        source: Box<dyn PageSource>,
        extractor: ListingExtractor,
        notifiers: Vec<Box<dyn Notifier>>,
        store: Box<dyn SeenStore>,
        settings: EngineSettings,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        if notifiers.is_empty() {
            return Err(Error::config("No notification sinks configured"));
        }
        if settings.check_interval.is_zero() {
            return Err(Error::config("Check interval must be > 0"));
        }

        let seen = store.load().await;
        let (tx, rx) = mpsc::channel(settings.event_channel_capacity.max(1));

        let engine = Self {
            source,
            extractor,
            notifiers,
            store,
            had_history: !seen.is_empty(),
            seen,
            state: EngineState::Bootstrapping,
            settings,
            stats: EngineStats::default(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Identities seen so far
    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Lifetime counters
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Run until `shutdown` completes
    ///
    /// The first tick runs immediately; afterwards the engine sleeps the full
    /// check interval after every tick. `shutdown` interrupts the sleep. A
    /// tick that is already running is allowed to finish.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown, seen set persisted
    /// - `Err(Error)`: The final persist failed
    pub async fn run_with_shutdown<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        self.emit_event(EngineEvent::Started {
            sinks: self.notifiers.len(),
            known_identities: self.seen.len(),
        });
        info!(
            "Watching {} every {:?} ({} sink(s), {} known listing(s))",
            self.source.describe(),
            self.settings.check_interval,
            self.notifiers.len(),
            self.seen.len()
        );

        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.check_interval) => {}

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.state = EngineState::ShuttingDown;
        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        self.store.persist(&self.seen).await?;
        info!("Seen set persisted ({} identities), engine stopped", self.seen.len());

        Ok(())
    }

    /// Run one fetch → extract → diff → persist → notify cycle
    pub async fn tick(&mut self) -> TickOutcome {
        let markup = match self.source.fetch().await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Skipping cycle, fetch failed: {}", e);
                self.stats.fetch_failures += 1;
                self.emit_event(EngineEvent::FetchFailed {
                    error: e.to_string(),
                });
                return TickOutcome::FetchFailed;
            }
        };

        let records = self.extractor.extract(&markup);
        if records.is_empty() {
            warn!("No listings extracted from {}", self.source.describe());
        }

        match self.state {
            EngineState::Bootstrapping => self.register_baseline(records).await,
            EngineState::Steady | EngineState::ShuttingDown => self.check(records).await,
        }
    }

    /// Register every current listing as seen without notifying
    async fn register_baseline(&mut self, records: Vec<ListingRecord>) -> TickOutcome {
        let lines = self.report_lines(&records, self.had_history);

        let added = records
            .iter()
            .filter(|record| self.seen.mark_seen(record.identity()))
            .count();

        self.report(BASELINE_REPORT_TITLE, &lines).await;
        info!(
            "Baseline registered: {} listing(s), {} not seen before",
            records.len(),
            added
        );

        self.persist().await;
        self.state = EngineState::Steady;
        self.emit_event(EngineEvent::BaselineRegistered {
            listings: records.len(),
            added,
        });

        TickOutcome::Baseline {
            listings: records.len(),
            added,
        }
    }

    /// Notify listings whose identity has not been seen
    async fn check(&mut self, records: Vec<ListingRecord>) -> TickOutcome {
        let new_listings: Vec<&ListingRecord> = records
            .iter()
            .filter(|record| self.seen.mark_seen(record.identity()))
            .collect();
        let new_count = new_listings.len();

        for record in new_listings {
            info!("New listing: {}", record);
            self.stats.new_listings += 1;
            self.emit_event(EngineEvent::NewListing {
                identity: record.identity(),
            });
            self.deliver(record).await;
        }

        // Seen status does not depend on delivery outcome
        if new_count > 0 {
            self.persist().await;
        }

        self.stats.checks += 1;
        let check = self.stats.checks;

        let every = self.settings.report_every_checks;
        if every > 0 && check % every == 0 {
            let lines = self.report_lines(&records, false);
            self.report(PERIODIC_REPORT_TITLE, &lines).await;
        }

        info!(
            "Check #{} done: {} listing(s), {} new, {} known in total",
            check,
            records.len(),
            new_count,
            self.seen.len()
        );
        self.emit_event(EngineEvent::CheckCompleted {
            check,
            listings: records.len(),
            new_listings: new_count,
        });

        TickOutcome::Checked {
            listings: records.len(),
            new_listings: new_count,
        }
    }

    /// Attempt delivery on every sink; failures are logged and counted only
    async fn deliver(&mut self, record: &ListingRecord) {
        for notifier in &self.notifiers {
            match notifier.notify(record).await {
                Ok(()) => {
                    debug!("Delivered {} via {}", record.identity(), notifier.name());
                    self.stats.deliveries += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to deliver {} via {}: {}",
                        record.identity(),
                        notifier.name(),
                        e
                    );
                    self.stats.delivery_failures += 1;
                    self.emit_event(EngineEvent::DeliveryFailed {
                        sink: notifier.name().to_string(),
                        identity: record.identity(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    async fn report(&self, title: &str, lines: &[ReportLine]) {
        for notifier in &self.notifiers {
            if let Err(e) = notifier.report(title, lines).await {
                warn!("Failed to show report via {}: {}", notifier.name(), e);
            }
        }
    }

    fn report_lines(&self, records: &[ListingRecord], mark_unseen: bool) -> Vec<ReportLine> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| ReportLine {
                position: index + 1,
                record: record.clone(),
                is_new: mark_unseen && !self.seen.contains(&record.identity()),
            })
            .collect()
    }

    /// Persist the seen set; a failure is logged and the in-memory set kept
    async fn persist(&self) {
        if let Err(e) = self.store.persist(&self.seen).await {
            error!("Failed to persist seen set: {}", e);
            self.emit_event(EngineEvent::PersistFailed {
                error: e.to_string(),
            });
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    "Event channel full, dropping event. \
                     Consider increasing event_channel_capacity."
                );
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
