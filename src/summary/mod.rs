//! Reading the scanner's summary report.
//!
//! - [`parser`] — lazy line-by-line parsing into [`SummaryEntry`](crate::models::SummaryEntry) records.
//! - [`classifier`] — picks out the restricted entries in a stable, name-sorted order.

pub mod classifier;
pub mod parser;
