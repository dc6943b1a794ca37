//! Test doubles and common utilities for engine contract tests

#![allow(dead_code)]

use halkarz_core::config::{EngineSettings, SelectorConfig};
use halkarz_core::engine::{EngineEvent, PollEngine};
use halkarz_core::error::{Error, Result};
use halkarz_core::extract::ListingExtractor;
use halkarz_core::model::{ListingRecord, ReportLine};
use halkarz_core::traits::{Notifier, PageSource, SeenStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// A page source that replays a script of fetch results
///
/// Once the script is exhausted the last page is served again.
#[derive(Clone)]
pub struct ScriptedPageSource {
    script: Arc<Mutex<VecDeque<Result<String>>>>,
    last_page: Arc<Mutex<String>>,
    fetch_count: Arc<AtomicUsize>,
}

impl ScriptedPageSource {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            last_page: Arc::new(Mutex::new(listing_page(&[]))),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a successful fetch
    pub fn then_page(self, markup: String) -> Self {
        self.script.lock().unwrap().push_back(Ok(markup));
        self
    }

    /// Queue a failed fetch (as a non-200 response would produce)
    pub fn then_failure(self, status: u16) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(Error::fetch(format!("HTTP {}", status))));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedPageSource {
    async fn fetch(&self) -> Result<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => {
                *self.last_page.lock().unwrap() = page.clone();
                Ok(page)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last_page.lock().unwrap().clone()),
        }
    }

    fn describe(&self) -> String {
        "scripted page".to_string()
    }
}

/// A notifier that records what it was asked to deliver
#[derive(Clone)]
pub struct RecordingNotifier {
    name: &'static str,
    fail: bool,
    notified: Arc<Mutex<Vec<String>>>,
    reports: Arc<Mutex<Vec<(String, Vec<ReportLine>)>>>,
}

impl RecordingNotifier {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fail: false,
            notified: Arc::new(Mutex::new(Vec::new())),
            reports: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A notifier whose every delivery fails (after recording the attempt)
    pub fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    /// Identities of every attempted delivery, in order
    pub fn notified(&self) -> Vec<String> {
        self.notified.lock().unwrap().clone()
    }

    pub fn notification_count(&self) -> usize {
        self.notified.lock().unwrap().len()
    }

    pub fn reports(&self) -> Vec<(String, Vec<ReportLine>)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, record: &ListingRecord) -> Result<()> {
        self.notified.lock().unwrap().push(record.identity());
        if self.fail {
            Err(Error::delivery(self.name, "HTTP 500"))
        } else {
            Ok(())
        }
    }

    async fn report(&self, title: &str, lines: &[ReportLine]) -> Result<()> {
        self.reports
            .lock()
            .unwrap()
            .push((title.to_string(), lines.to_vec()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// One `<li>` in the halkarz.com markup
pub fn listing_item(company: &str, date: &str, href: &str) -> String {
    format!(
        r#"<li><article>
             <a href="{href}"><img src="/logo.png"></a>
             <h3 class="il-halka-arz-sirket">{company}</h3>
             <span class="il-halka-arz-tarihi">{date}</span>
           </article></li>"#
    )
}

/// A full page holding the given (company, date, href) listings
pub fn listing_page(listings: &[(&str, &str, &str)]) -> String {
    let items: String = listings
        .iter()
        .map(|(company, date, href)| listing_item(company, date, href))
        .collect();
    format!(
        r#"<!doctype html><html><head><title>Halka Arz</title></head><body>
             <ul class="halka-arz-list">{items}</ul>
           </body></html>"#
    )
}

pub const A: (&str, &str, &str) = ("Alfa Holding", "1-2 Ekim 2025", "/alfa-holding/");
pub const B: (&str, &str, &str) = ("Beta Gıda", "8-9 Ekim 2025", "/beta-gida/");
pub const C: (&str, &str, &str) = ("Gama Enerji", "15-16 Ekim 2025", "/gama-enerji/");
pub const D: (&str, &str, &str) = ("Delta Lojistik", "22-23 Ekim 2025", "/delta-lojistik/");

pub fn identity(listing: (&str, &str, &str)) -> String {
    format!("{}_{}", listing.0, listing.1)
}

pub fn extractor() -> ListingExtractor {
    ListingExtractor::new(&SelectorConfig::default(), Some("https://halkarz.com/"))
        .expect("default selectors compile")
}

pub fn test_settings(check_interval: Duration) -> EngineSettings {
    EngineSettings {
        check_interval,
        report_every_checks: 0,
        event_channel_capacity: 100,
    }
}

/// Build an engine over the given doubles with a long interval
pub async fn engine_with(
    source: &ScriptedPageSource,
    notifiers: Vec<Box<dyn Notifier>>,
    store: Box<dyn SeenStore>,
) -> (PollEngine, mpsc::Receiver<EngineEvent>) {
    engine_with_settings(
        source,
        notifiers,
        store,
        test_settings(Duration::from_secs(3600)),
    )
    .await
}

/// Build an engine over the given doubles with explicit settings
pub async fn engine_with_settings(
    source: &ScriptedPageSource,
    notifiers: Vec<Box<dyn Notifier>>,
    store: Box<dyn SeenStore>,
    settings: EngineSettings,
) -> (PollEngine, mpsc::Receiver<EngineEvent>) {
    PollEngine::new(Box::new(source.clone()), extractor(), notifiers, store, settings)
        .await
        .expect("engine construction succeeds")
}

/// Drain all events currently buffered
pub fn drain_events(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
