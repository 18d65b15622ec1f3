use crate::models::PhotoCandidate;
use crate::scrapers::selectors::{
    Probe, Resolution, SelectorChain, ASPECT_BUTTON_IMAGES, BUTTON_THUMBNAILS, GALLERY_MODAL,
    VIEW_ALL_PHOTOS,
};
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::{NodeInfo, Pacing};
use std::collections::HashSet;
use std::thread;
use tracing::{info, warn};

/// Size and keyword rules separating venue photos from page chrome
#[derive(Debug, Clone, Copy)]
pub struct PhotoFilter {
    pub min_width: f64,
    pub min_height: f64,
    pub denylist: &'static [&'static str],
    /// Parent class keywords that mark a gallery slot
    pub gallery_hints: &'static [&'static str],
    /// Size required when the parent carries no gallery hint
    pub plain_min: Option<(f64, f64)>,
}

/// Applied to images inside an opened gallery
pub const MODAL_FILTER: PhotoFilter = PhotoFilter {
    min_width: 150.0,
    min_height: 100.0,
    denylist: &["logo", "icon", "avatar", "star", "heart", "arrow", "close", "x.svg"],
    gallery_hints: &[],
    plain_min: None,
};

/// Applied to thumbnails embedded in buttons on the collapsed page
pub const THUMBNAIL_FILTER: PhotoFilter = PhotoFilter {
    min_width: 100.0,
    min_height: 100.0,
    denylist: &["logo", "icon", "avatar", "profile", "star", "heart"],
    gallery_hints: &["aspect", "gallery", "carousel"],
    plain_min: Some((200.0, 150.0)),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(AcceptReason),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    Size,
    GalleryContainer,
    /// Rendered size was unavailable; accepted anyway
    Uninspected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Denylisted(&'static str),
    TooSmall,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

impl PhotoFilter {
    pub fn verdict(&self, candidate: &PhotoCandidate) -> Verdict {
        let url = candidate.url.to_lowercase();
        if let Some(pattern) = self.denylist.iter().find(|p| url.contains(*p)) {
            return Verdict::Rejected(RejectReason::Denylisted(*pattern));
        }

        // FIXME: uninspectable images pass, which lets some page chrome through
        let Some((width, height)) = candidate.size else {
            return Verdict::Accepted(AcceptReason::Uninspected);
        };

        if width < self.min_width || height < self.min_height {
            return Verdict::Rejected(RejectReason::TooSmall);
        }

        let in_gallery = candidate.parent_class.as_deref().is_some_and(|class| {
            let class = class.to_lowercase();
            self.gallery_hints.iter().any(|hint| class.contains(hint))
        });
        if in_gallery {
            return Verdict::Accepted(AcceptReason::GalleryContainer);
        }

        match self.plain_min {
            Some((w, h)) if width < w || height < h => Verdict::Rejected(RejectReason::TooSmall),
            _ => Verdict::Accepted(AcceptReason::Size),
        }
    }

    pub fn accepts(&self, candidate: &PhotoCandidate) -> bool {
        self.verdict(candidate).is_accepted()
    }

    fn venue_photos(&self, nodes: &[NodeInfo]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(NodeInfo::to_candidate)
            .filter(|c| self.accepts(c))
            .map(|c| c.url)
            .collect()
    }
}

/// Whether the full photo gallery has been opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryState {
    Collapsed,
    Expanded,
}

/// Click the "View all" control if there is one
pub fn open_gallery<P: PageSource + ?Sized>(page: &P, pacing: &Pacing) -> GalleryState {
    info!("🔍 Looking for 'View all' photos button...");

    let resolution = VIEW_ALL_PHOTOS.first_match(|s| match page.activate(s) {
        Ok(true) => Probe::Found(()),
        Ok(false) => Probe::Empty,
        Err(e) => Probe::Failed(e.to_string()),
    });

    match resolution {
        Resolution::Matched { strategy, .. } => {
            info!("✅ Clicked 'View all' button found with '{}'", strategy);
            thread::sleep(pacing.gallery_settle);
            GalleryState::Expanded
        }
        Resolution::Exhausted { .. } => {
            warn!("❌ Could not find 'View all' button");
            GalleryState::Collapsed
        }
    }
}

/// Venue photo URLs visible in the given gallery state, without duplicates
pub fn collect_photos<P: PageSource + ?Sized>(page: &P, state: GalleryState) -> Vec<String> {
    let photos = match state {
        GalleryState::Expanded => modal_photos(page),
        GalleryState::Collapsed => {
            info!("📸 No 'View all' button found, trying direct photo extraction...");
            button_photos(page)
        }
    };

    let unique = dedupe(photos);
    info!("📷 Total venue photos collected: {}", unique.len());
    unique
}

/// Open the gallery if possible, then collect photos
pub fn discover_photos<P: PageSource + ?Sized>(page: &P, pacing: &Pacing) -> Vec<String> {
    let state = open_gallery(page, pacing);
    collect_photos(page, state)
}

fn modal_photos<P: PageSource + ?Sized>(page: &P) -> Vec<String> {
    info!("📸 Extracting photos from opened gallery...");

    let found = first_images(page, &GALLERY_MODAL, |nodes| {
        let photos = MODAL_FILTER.venue_photos(nodes);
        (!photos.is_empty()).then_some(photos)
    });
    if let Some(photos) = found {
        return photos;
    }

    info!("📸 No modal photos, trying button images...");
    match page.select(&ASPECT_BUTTON_IMAGES) {
        Ok(nodes) => MODAL_FILTER.venue_photos(&nodes),
        Err(e) => {
            warn!("Button image lookup failed: {}", e);
            Vec::new()
        }
    }
}

fn button_photos<P: PageSource + ?Sized>(page: &P) -> Vec<String> {
    // The first selector that matches anything decides, even if every image is filtered out
    first_images(page, &BUTTON_THUMBNAILS, |nodes| {
        Some(THUMBNAIL_FILTER.venue_photos(nodes))
    })
    .unwrap_or_default()
}

fn first_images<P, F>(page: &P, chain: &SelectorChain, mut accept: F) -> Option<Vec<String>>
where
    P: PageSource + ?Sized,
    F: FnMut(&[NodeInfo]) -> Option<Vec<String>>,
{
    chain
        .first_match(|s| match page.select(s) {
            Ok(nodes) if nodes.is_empty() => Probe::Empty,
            Ok(nodes) => {
                info!("🎯 Found {} images with: {}", nodes.len(), s);
                accept(&nodes).map_or(Probe::Empty, Probe::Found)
            }
            Err(e) => Probe::Failed(e.to_string()),
        })
        .into_value()
}

fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}
