mod config;
mod downloads;
mod models;
mod scrapers;

use anyhow::{Context, Result};
use config::{Config, DownloadChoice};
use downloads::{HttpFetcher, PhotoDownloader, DOWNLOAD_TIMEOUT};
use models::ListingRecord;
use scrapers::{extract_listing, Pacing, SnapshotPage, VenueBrowserScraper};
use std::io::{self, BufRead, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Venue Scout - single listing scraper");
    info!("=======================================");

    let config = Config::from_env()?;

    let record = match scrape(&config) {
        Ok(record) => record,
        Err(e) => {
            error!("❌ Error scraping {}: {:#}", config.listing_url, e);
            return Err(e);
        }
    };

    print_summary(&record);

    if wants_download(&record, config.download)? {
        let fetcher = HttpFetcher::new(DOWNLOAD_TIMEOUT)?;
        let downloader = PhotoDownloader::new(fetcher, &config.photo_root, config.pacing.download_delay);
        let report = downloader.download_all(&record.photos, &record.name).await?;
        info!(
            "📁 {} photos saved to {}, {} failed",
            report.saved().len(),
            report.folder.display(),
            report.failed()
        );
    }

    let json = serde_json::to_string_pretty(&record)?;
    tokio::fs::write(&config.output_path, json)
        .await
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;
    info!("💾 Saved test data to '{}'", config.output_path.display());

    Ok(())
}

fn scrape(config: &Config) -> Result<ListingRecord> {
    if let Some(path) = &config.html_snapshot {
        info!("Reading saved page {}", path.display());
        let page = SnapshotPage::load(path)?;
        return extract_listing(&page, &config.listing_url, &Pacing::immediate());
    }

    // Chrome shuts down when `scraper` goes out of scope, on success or error
    let scraper = VenueBrowserScraper::new(config)?;
    scraper.scrape_listing(&config.listing_url)
}

fn print_summary(record: &ListingRecord) {
    let price = record
        .price_per_hour
        .map_or_else(|| "unknown".to_string(), |p| format!("${p}/hr"));
    let capacity = record
        .capacity
        .map_or_else(|| "unknown".to_string(), |c| format!("{c} people"));

    println!();
    println!("✅ Scraped: {}", record.name);
    println!("   Price: {}", price);
    println!("   Capacity: {}", capacity);
    println!("   Photos: {} images", record.photo_count);
    println!();
}

fn wants_download(record: &ListingRecord, choice: DownloadChoice) -> Result<bool> {
    if record.photos.is_empty() {
        return Ok(false);
    }

    match choice {
        DownloadChoice::Always => Ok(true),
        DownloadChoice::Never => Ok(false),
        DownloadChoice::Ask => {
            let label = if record.has_name() {
                record.name.as_str()
            } else {
                record.url.as_str()
            };
            print!("Download {} photos for '{}'? (y/n): ", record.photo_count, label);
            io::stdout().flush()?;

            let mut answer = String::new();
            io::stdin()
                .lock()
                .read_line(&mut answer)
                .context("Failed to read answer")?;
            Ok(answer.trim().eq_ignore_ascii_case("y"))
        }
    }
}
