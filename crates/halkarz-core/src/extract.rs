//! Record extraction from page markup
//!
//! The extractor is a pure function of its input: no I/O, no state. A missing
//! listings container yields an empty result, and an item missing any of its
//! three parts is skipped without affecting the others.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::SelectorConfig;
use crate::error::{Error, Result};
use crate::model::ListingRecord;

/// Parses listing pages into [`ListingRecord`]s
///
/// Selectors are compiled once at construction.
///
/// # Example
///
/// ```rust
/// use halkarz_core::config::SelectorConfig;
/// use halkarz_core::extract::ListingExtractor;
///
/// let extractor = ListingExtractor::new(&SelectorConfig::default(), None).unwrap();
/// let html = r#"
///     <ul class="halka-arz-list">
///       <li><article>
///         <h3 class="il-halka-arz-sirket">Acme Enerji</h3>
///         <span class="il-halka-arz-tarihi">10-11 Ekim 2025</span>
///         <a href="/acme-enerji">Detay</a>
///       </article></li>
///     </ul>"#;
///
/// let records = extractor.extract(html);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].identity(), "Acme Enerji_10-11 Ekim 2025");
/// ```
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    container: Selector,
    item: Selector,
    company: Selector,
    date: Selector,
    link: Selector,
    base_url: Option<Url>,
}

impl ListingExtractor {
    /// Compile the selectors
    ///
    /// # Parameters
    ///
    /// - `selectors`: CSS selectors for the container, items and item parts
    /// - `base_url`: when given, relative detail links are resolved against it
    pub fn new(selectors: &SelectorConfig, base_url: Option<&str>) -> Result<Self> {
        let base_url = match base_url {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|e| Error::config(format!("Invalid base URL '{}': {}", raw, e)))?,
            ),
            None => None,
        };

        Ok(Self {
            container: compile("selectors.container", &selectors.container)?,
            item: compile("selectors.item", &selectors.item)?,
            company: compile("selectors.company", &selectors.company)?,
            date: compile("selectors.date", &selectors.date)?,
            link: compile("selectors.link", &selectors.link)?,
            base_url,
        })
    }

    /// Extract all well-formed listing records, in document order
    pub fn extract(&self, markup: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(markup);

        let Some(container) = document.select(&self.container).next() else {
            tracing::debug!("Listings container not found, nothing extracted");
            return Vec::new();
        };

        let mut records = Vec::new();
        for (index, item) in container.select(&self.item).enumerate() {
            match self.extract_item(&item) {
                Some(record) => records.push(record),
                None => {
                    tracing::debug!("Skipping malformed listing item at position {}", index + 1)
                }
            }
        }

        records
    }

    fn extract_item(&self, item: &ElementRef<'_>) -> Option<ListingRecord> {
        let company_name = first_text(item, &self.company)?;
        let date = first_text(item, &self.date)?;
        let href = item
            .select(&self.link)
            .find_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())?;

        Some(ListingRecord {
            company_name,
            date,
            details_url: self.resolve(href),
        })
    }

    fn resolve(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }
}

fn compile(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| Error::config(format!("Invalid CSS selector for {} '{}': {}", field, css, e)))
}

/// Whitespace-normalized text of the first match, `None` when absent or blank
fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = scope.select(selector).next()?;
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() { None } else { Some(text) }
}
