use crate::scrapers::types::Pacing;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LISTING_URL: &str =
    "https://www.peerspace.com/pages/listings/635ca870ab68cd000ef37bf1";

/// What to do with discovered photos once the listing is scraped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadChoice {
    Ask,
    Always,
    Never,
}

impl std::str::FromStr for DownloadChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "yes" | "y" | "always" => Ok(Self::Always),
            "no" | "n" | "never" => Ok(Self::Never),
            other => bail!("expected ask, yes or no, got '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listing_url: String,
    /// Show the browser window unless set
    pub headless: bool,
    pub output_path: PathBuf,
    /// Directory the per-venue photo folder is created in
    pub photo_root: PathBuf,
    pub download: DownloadChoice,
    /// Save rendered HTML and a screenshot here before extracting
    pub debug_dir: Option<PathBuf>,
    /// Extract from this saved page instead of launching Chrome
    pub html_snapshot: Option<PathBuf>,
    pub pacing: Pacing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            headless: false,
            output_path: PathBuf::from("single_venue_test.json"),
            photo_root: PathBuf::from("."),
            download: DownloadChoice::Ask,
            debug_dir: None,
            html_snapshot: None,
            pacing: Pacing::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `VENUE_*` variables, then by the first CLI argument
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::from_lookup(|key| env::var(key).ok())?;
        if let Some(url) = env::args().nth(1) {
            cfg.listing_url = url;
        }
        Ok(cfg)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("VENUE_URL") {
            cfg.listing_url = url;
        }
        if let Some(raw) = lookup("VENUE_HEADLESS") {
            cfg.headless = parse_flag(&raw).context("VENUE_HEADLESS")?;
        }
        if let Some(path) = lookup("VENUE_OUTPUT") {
            cfg.output_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("VENUE_PHOTO_DIR") {
            cfg.photo_root = PathBuf::from(path);
        }
        if let Some(raw) = lookup("VENUE_DOWNLOAD") {
            cfg.download = raw.parse().context("VENUE_DOWNLOAD")?;
        }
        cfg.debug_dir = lookup("VENUE_DEBUG_DIR").map(PathBuf::from);
        cfg.html_snapshot = lookup("VENUE_HTML_SNAPSHOT").map(PathBuf::from);
        if let Some(raw) = lookup("VENUE_PAGE_LOAD_SECS") {
            let secs: u64 = raw.trim().parse().context("VENUE_PAGE_LOAD_SECS")?;
            cfg.pacing.page_load = Duration::from_secs(secs);
        }

        Ok(cfg)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_single_listing_run() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.listing_url, DEFAULT_LISTING_URL);
        assert!(!cfg.headless);
        assert_eq!(cfg.output_path, PathBuf::from("single_venue_test.json"));
        assert_eq!(cfg.download, DownloadChoice::Ask);
        assert_eq!(cfg.pacing.page_load, Duration::from_secs(5));
        assert!(cfg.html_snapshot.is_none());
    }

    #[test]
    fn env_values_override_defaults() {
        let cfg = config_from(&[
            ("VENUE_URL", "https://example.com/l/9"),
            ("VENUE_HEADLESS", "true"),
            ("VENUE_DOWNLOAD", "no"),
            ("VENUE_PAGE_LOAD_SECS", "2"),
            ("VENUE_DEBUG_DIR", "debug"),
        ])
        .unwrap();
        assert_eq!(cfg.listing_url, "https://example.com/l/9");
        assert!(cfg.headless);
        assert_eq!(cfg.download, DownloadChoice::Never);
        assert_eq!(cfg.pacing.page_load, Duration::from_secs(2));
        assert_eq!(cfg.debug_dir, Some(PathBuf::from("debug")));
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(config_from(&[("VENUE_HEADLESS", "maybe")]).is_err());
        assert!(config_from(&[("VENUE_DOWNLOAD", "later")]).is_err());
        assert!(config_from(&[("VENUE_PAGE_LOAD_SECS", "-1")]).is_err());
    }
}
