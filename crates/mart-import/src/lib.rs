//! # mart-import
//!
//! Experimental listing importer: fetches a shop page and guesses the
//! products on it. Results are suggestions for an admin to review, never
//! trusted data.

pub mod analyze;
pub mod error;
pub mod fetch;
pub mod price;

pub use analyze::{analyze, ImportCandidate, PageAnalysis, PageKind};
pub use error::ImportError;
pub use fetch::{FetchedPage, ListingImporter};
pub use price::{detect_currency, parse_price, ParsedPrice};
