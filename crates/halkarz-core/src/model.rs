//! Listing records extracted from the watched page

use serde::{Deserialize, Serialize};
use std::fmt;

/// One public-offering announcement as shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Company name from the listing heading
    pub company_name: String,
    /// Offering date, verbatim from the page (not normalized)
    pub date: String,
    /// Link to the detail page (absolute, or relative when no base URL is known)
    pub details_url: String,
}

impl ListingRecord {
    /// Create a new listing record
    pub fn new(
        company_name: impl Into<String>,
        date: impl Into<String>,
        details_url: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            date: date.into(),
            details_url: details_url.into(),
        }
    }

    /// De-duplication key: `company_name + "_" + date`
    ///
    /// The details link is not part of the key; the page may move it without
    /// the listing being new.
    pub fn identity(&self) -> String {
        format!("{}_{}", self.company_name, self.date)
    }
}

impl fmt::Display for ListingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.company_name, self.date)
    }
}

/// A line of an enumerated listing report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// 1-based position in page order
    pub position: usize,
    /// The listing
    pub record: ListingRecord,
    /// Not known from any earlier run
    pub is_new: bool,
}
