use crate::scrapers::selectors::Strategy;
use crate::scrapers::types::NodeInfo;
use thiserror::Error;

/// Failures a page backend can report for a single query
#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("page script failed: {0}")]
    Script(String),
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

/// Read access to a rendered listing page.
///
/// Implemented by the live Chrome tab and by a parsed HTML snapshot, so the
/// extraction heuristics run the same way against both.
pub trait PageSource {
    /// All visible text of the page body
    fn body_text(&self) -> Result<String, PageError>;

    /// Every element matched by `strategy`, in document order. No match is `Ok(vec![])`.
    fn select(&self, strategy: &Strategy) -> Result<Vec<NodeInfo>, PageError>;

    /// Bring the first element matched by `strategy` into view and click it.
    /// Returns `Ok(false)` when nothing matched.
    fn activate(&self, strategy: &Strategy) -> Result<bool, PageError>;
}
