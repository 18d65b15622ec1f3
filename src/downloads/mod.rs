pub mod fetcher;

pub use fetcher::{HttpFetcher, PhotoFetcher};

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::fs;
use tracing::{error, info, warn};

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

const MAX_SAFE_NAME_CHARS: usize = 30;
const DEFAULT_EXTENSION: &str = "jpg";

/// Rewrites that turn a thumbnail URL into the full-size one, applied in order
static THUMBNAIL_REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // leading size param followed by others keeps the `?`
        (r"\?[wh]=\d+&", "?"),
        (r"[?&][wh]=\d+", ""),
        (r"/w_\d+,h_\d+/", "/"),
        (r"_thumb\.", "."),
    ]
    .into_iter()
    .map(|(p, rep)| (Regex::new(p).expect("valid regex"), rep))
    .collect()
});

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Strip thumbnail sizing from an image URL. Idempotent.
pub fn high_res_url(url: &str) -> String {
    let mut current = url.to_string();
    loop {
        let mut next = current.clone();
        for (re, replacement) in THUMBNAIL_REWRITES.iter() {
            // each rewrite runs to a fixed point so removals can't expose new matches
            loop {
                let rewritten = re.replace_all(&next, *replacement).into_owned();
                if rewritten == next {
                    break;
                }
                next = rewritten;
            }
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Venue name reduced to word characters, spaces and dashes, at most 30 chars
pub fn safe_name(venue_name: &str) -> String {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(venue_name, "");
    let cut: String = cleaned.chars().take(MAX_SAFE_NAME_CHARS).collect();
    let trimmed = cut.trim();
    if trimmed.is_empty() {
        "venue".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Extension of the last path segment, or `jpg` when there is no usable one
pub fn photo_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_EXTENSION)
        .to_string()
}

pub fn photo_folder(root: &Path, venue_name: &str) -> PathBuf {
    root.join(format!("venue_photos_{}", safe_name(venue_name)))
}

/// File name for the photo at 1-based `position`
pub fn photo_filename(venue_name: &str, position: usize, url: &str) -> String {
    format!(
        "{}_photo_{:02}.{}",
        safe_name(venue_name),
        position,
        photo_extension(url)
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    BadStatus(u16),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub folder: PathBuf,
    pub outcomes: Vec<DownloadOutcome>,
}

impl DownloadReport {
    pub fn saved(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                DownloadOutcome::Saved(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.saved().len()
    }
}

/// Sequential photo downloader with a fixed pause between requests
pub struct PhotoDownloader<F: PhotoFetcher> {
    fetcher: F,
    root: PathBuf,
    delay: Duration,
}

impl<F: PhotoFetcher> PhotoDownloader<F> {
    pub fn new(fetcher: F, root: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            fetcher,
            root: root.into(),
            delay,
        }
    }

    /// Download every photo; individual failures are logged and skipped.
    pub async fn download_all(&self, photo_urls: &[String], venue_name: &str) -> Result<DownloadReport> {
        let folder = photo_folder(&self.root, venue_name);
        let mut outcomes = Vec::with_capacity(photo_urls.len());

        if photo_urls.is_empty() {
            info!("No photos to download");
            return Ok(DownloadReport { folder, outcomes });
        }

        fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("Failed to create {}", folder.display()))?;
        info!("📁 Downloading {} photos to: {}", photo_urls.len(), folder.display());

        for (idx, url) in photo_urls.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let outcome = self.download_one(&folder, venue_name, idx + 1, url).await;
            match &outcome {
                DownloadOutcome::Saved(path) => info!("✅ Downloaded: {}", path.display()),
                DownloadOutcome::BadStatus(status) => {
                    warn!("❌ Failed download {}: Status {}", idx + 1, status)
                }
                DownloadOutcome::Failed(reason) => {
                    error!("❌ Error downloading photo {}: {}", idx + 1, reason)
                }
            }
            outcomes.push(outcome);
        }

        Ok(DownloadReport { folder, outcomes })
    }

    async fn download_one(
        &self,
        folder: &Path,
        venue_name: &str,
        position: usize,
        url: &str,
    ) -> DownloadOutcome {
        let clean_url = high_res_url(url);

        let fetched = match self.fetcher.fetch(&clean_url).await {
            Ok(fetched) => fetched,
            Err(e) => return DownloadOutcome::Failed(format!("{e:#}")),
        };
        if fetched.status != 200 {
            return DownloadOutcome::BadStatus(fetched.status);
        }

        let path = folder.join(photo_filename(venue_name, position, &clean_url));
        match fs::write(&path, &fetched.body).await {
            Ok(()) => DownloadOutcome::Saved(path),
            Err(e) => DownloadOutcome::Failed(format!("write {}: {e}", path.display())),
        }
    }
}
