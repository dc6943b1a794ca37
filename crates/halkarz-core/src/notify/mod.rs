//! Notification message formatting and the console sink
//!
//! Every sink sends the same text for a new listing; see [`format_message`].

pub mod console;

pub use console::ConsoleNotifier;

use crate::model::{ListingRecord, ReportLine};

/// Separator framing a single notification on the console
pub const MESSAGE_SEPARATOR: &str = "==================================================";

/// Separator framing a listing report on the console
pub const REPORT_SEPARATOR: &str =
    "============================================================";

/// Marker shown in reports for listings not known from earlier runs
pub const NEW_MARKER: &str = "**YENİ**";

/// Notification text for a newly discovered listing
pub fn format_message(record: &ListingRecord) -> String {
    format!(
        "**Yeni Bir Halka Arz Geldi!**\n\
         **Şirket:** {}\n\
         **Tarih:** {}\n\
         **Detaylar için:** {}",
        record.company_name, record.date, record.details_url
    )
}

/// Render an enumerated listing report
///
/// One line per listing, `"{n}. {company} - {date}"`, numbered from 1 in page
/// order, framed by [`REPORT_SEPARATOR`].
pub fn render_report(title: &str, lines: &[ReportLine]) -> String {
    let mut out = format!("\n{}:\n{}\n", title, REPORT_SEPARATOR);
    for line in lines {
        if line.is_new {
            out.push_str(&format!("{} {}. {}\n", NEW_MARKER, line.position, line.record));
        } else {
            out.push_str(&format!("{}. {}\n", line.position, line.record));
        }
    }
    out.push_str(REPORT_SEPARATOR);
    out.push('\n');
    out
}
