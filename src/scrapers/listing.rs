use crate::models::ListingRecord;
use crate::scrapers::fields::{
    extract_capacity, extract_price, find_amenities, find_description, find_text, truncate_chars,
};
use crate::scrapers::photos::discover_photos;
use crate::scrapers::selectors::{ADDRESS, AMENITIES, CATEGORY, DESCRIPTION, HOST_NAME, NAME};
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::Pacing;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

const RAW_TEXT_CHARS: usize = 500;

/// Run every field extractor against a loaded listing page
pub fn extract_listing<P: PageSource + ?Sized>(
    page: &P,
    url: &str,
    pacing: &Pacing,
) -> Result<ListingRecord> {
    let page_text = page.body_text().context("Failed to read page text")?;

    let name = find_text(page, &NAME);
    let price_per_hour = extract_price(&page_text);
    let capacity = extract_capacity(&page_text);
    let address = find_text(page, &ADDRESS);
    let category = find_text(page, &CATEGORY);
    let description = find_description(page, &DESCRIPTION);
    let amenities = find_amenities(page, &AMENITIES);
    let photos = discover_photos(page, pacing);
    let host_name = find_text(page, &HOST_NAME);

    // the gallery may have changed the page, keep the snippet current
    let raw_page_text = page
        .body_text()
        .context("Failed to read page text after photo discovery")?;

    info!("Extracted {} amenities and {} photos", amenities.len(), photos.len());

    Ok(ListingRecord {
        url: url.to_string(),
        name,
        price_per_hour,
        capacity,
        address,
        category,
        description,
        amenities,
        photo_count: photos.len(),
        photos,
        host_name,
        raw_page_text: truncate_chars(&raw_page_text, RAW_TEXT_CHARS),
        scraped_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NOT_FOUND, NO_DESCRIPTION};
    use crate::scrapers::selectors::Strategy;
    use crate::scrapers::snapshot::SnapshotPage;
    use crate::scrapers::traits::PageError;
    use crate::scrapers::types::NodeInfo;
    use std::cell::Cell;

    const LISTING: &str = r#"
        <html><body>
          <h1>Industrial Loft in the Arts District</h1>
          <div class="location-text">Arts District, Los Angeles, CA</div>
          <span class="space-type">Loft</span>
          <div class="pricing">$45/hour · 2 hr minimum</div>
          <div class="capacity-info">Hosts up to 30 guests</div>
          <div data-testid="description-block">Sun-drenched warehouse space with exposed brick, polished concrete floors and a full kitchen.</div>
          <ul class="amenities"><li>Wifi</li><li>Parking</li><li>Wifi</li></ul>
          <span data-testing-id="photoWithViewAllButton">View all</span>
          <div role="dialog">
            <img src="https://cdn.example.com/p/1_thumb.jpg?w=400" width="800" height="600">
            <img src="https://cdn.example.com/p/avatar.jpg" width="800" height="600">
          </div>
          <div class="host-name">Hosted by Sam</div>
        </body></html>
    "#;

    #[test]
    fn extracts_every_field_from_a_listing() {
        let page = SnapshotPage::parse(LISTING);
        let record = extract_listing(&page, "https://example.com/l/1", &Pacing::immediate()).unwrap();

        assert_eq!(record.url, "https://example.com/l/1");
        assert_eq!(record.name, "Industrial Loft in the Arts District");
        assert_eq!(record.price_per_hour, Some(45));
        assert_eq!(record.capacity, Some(30));
        assert_eq!(record.address, "Arts District, Los Angeles, CA");
        assert_eq!(record.category, "Loft");
        assert!(record.description.starts_with("Sun-drenched warehouse"));
        assert_eq!(record.amenities, vec!["Wifi".to_string(), "Parking".to_string()]);
        assert_eq!(record.photos, vec!["https://cdn.example.com/p/1_thumb.jpg?w=400".to_string()]);
        assert_eq!(record.photo_count, 1);
        assert_eq!(record.host_name, "Hosted by Sam");
        assert!(record.raw_page_text.starts_with("Industrial Loft"));
    }

    #[test]
    fn empty_page_yields_sentinels_and_absent_numbers() {
        let page = SnapshotPage::parse("<html><body></body></html>");
        let record = extract_listing(&page, "https://example.com/l/2", &Pacing::immediate()).unwrap();

        assert_eq!(record.name, NOT_FOUND);
        assert_eq!(record.address, NOT_FOUND);
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.price_per_hour, None);
        assert_eq!(record.capacity, None);
        assert!(record.photos.is_empty());
        assert_eq!(record.photo_count, 0);
    }

    /// Body text changes once anything has been clicked, like an opened gallery
    struct GalleryPage {
        inner: SnapshotPage,
        opened: Cell<bool>,
    }

    impl PageSource for GalleryPage {
        fn body_text(&self) -> Result<String, PageError> {
            let text = self.inner.body_text()?;
            Ok(if self.opened.get() {
                format!("{text}\nGallery open")
            } else {
                text
            })
        }

        fn select(&self, strategy: &Strategy) -> Result<Vec<NodeInfo>, PageError> {
            self.inner.select(strategy)
        }

        fn activate(&self, strategy: &Strategy) -> Result<bool, PageError> {
            let found = self.inner.activate(strategy)?;
            if found {
                self.opened.set(true);
            }
            Ok(found)
        }
    }

    #[test]
    fn raw_text_is_read_after_the_gallery_opens() {
        let page = GalleryPage {
            inner: SnapshotPage::parse(LISTING),
            opened: Cell::new(false),
        };
        let record = extract_listing(&page, "https://example.com/l/3", &Pacing::immediate()).unwrap();

        assert!(page.opened.get());
        assert!(record.raw_page_text.ends_with("Gallery open"));
        assert_eq!(record.price_per_hour, Some(45));
    }
}
