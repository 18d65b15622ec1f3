pub mod browser;
pub mod fields;
pub mod listing;
pub mod photos;
pub mod selectors;
pub mod snapshot;
pub mod traits;
pub mod types;

pub use browser::VenueBrowserScraper;
pub use listing::extract_listing;
pub use snapshot::SnapshotPage;
pub use types::Pacing;
