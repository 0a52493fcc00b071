//! Resilient content-extraction pipeline
//!
//! Composes the browser and DOM layers into `extract(listing_url)`: scan a
//! listing for its most recent article, follow it, and pull out body text and
//! lead image. Per-site markup knowledge lives in `SiteRules` data.

pub mod rules;
pub mod dates;
pub mod listing;
pub mod images;
pub mod detail;
pub mod assets;
pub mod login;
pub mod pipeline;

pub use detail::{DetailExtractor, RetryPolicy};
pub use listing::Entry;
pub use pipeline::{ExtractionResult, Extractor};
pub use rules::SiteRules;
