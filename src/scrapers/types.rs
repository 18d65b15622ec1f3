use crate::models::PhotoCandidate;
use serde::Deserialize;
use std::time::Duration;

/// An element matched by a selector strategy, as reported by a page backend
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Trimmed visible text
    #[serde(default)]
    pub text: String,
    /// Image source, absolute on a live page
    pub src: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub parent_class: Option<String>,
}

impl NodeInfo {
    /// Turn an image node into a photo candidate. Nodes without a source are skipped.
    pub fn to_candidate(&self) -> Option<PhotoCandidate> {
        let url = self.src.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let size = match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        };
        Some(PhotoCandidate {
            url: url.to_string(),
            size,
            parent_class: self.parent_class.clone(),
        })
    }
}

/// Fixed waits used while driving the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub page_load: Duration,
    /// After scrolling a control into view, before clicking it
    pub scroll_settle: Duration,
    /// After opening the photo gallery
    pub gallery_settle: Duration,
    pub download_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(5),
            scroll_settle: Duration::from_secs(1),
            gallery_settle: Duration::from_secs(3),
            download_delay: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    /// No waiting at all, for snapshots and tests
    pub fn immediate() -> Self {
        Self {
            page_load: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            gallery_settle: Duration::ZERO,
            download_delay: Duration::ZERO,
        }
    }
}
