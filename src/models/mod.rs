use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Returned by text extractors when no strategy produced text
pub const NOT_FOUND: &str = "Not found";

/// Returned when no element held a substantial description
pub const NO_DESCRIPTION: &str = "No description found";

/// Everything extracted from one listing page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub url: String,
    pub name: String,
    pub price_per_hour: Option<u32>,
    pub capacity: Option<u32>,
    pub address: String,
    pub category: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub photo_count: usize,
    pub host_name: String,
    /// First 500 characters of the visible page text, for debugging selectors
    pub raw_page_text: String,
    pub scraped_at: DateTime<Utc>,
}

impl ListingRecord {
    pub fn has_name(&self) -> bool {
        self.name != NOT_FOUND
    }
}

/// An image found on the page, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoCandidate {
    pub url: String,
    /// Rendered size in CSS pixels; `None` when it could not be inspected
    pub size: Option<(f64, f64)>,
    pub parent_class: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ListingRecord {
        ListingRecord {
            url: "https://example.com/listing/1".to_string(),
            name: "Sunny Loft".to_string(),
            price_per_hour: Some(45),
            capacity: None,
            address: NOT_FOUND.to_string(),
            category: "Loft".to_string(),
            description: NO_DESCRIPTION.to_string(),
            amenities: vec!["Wifi".to_string()],
            photos: vec!["https://cdn.example.com/a.jpg".to_string()],
            photo_count: 1,
            host_name: "Dana".to_string(),
            raw_page_text: "Sunny Loft $45/hour".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn serializes_missing_numbers_as_null() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["price_per_hour"], 45);
        assert!(json["capacity"].is_null());
        assert_eq!(json["photo_count"], 1);
        assert_eq!(json["address"], "Not found");
    }

    #[test]
    fn sentinel_name_is_not_a_name() {
        let mut r = record();
        assert!(r.has_name());
        r.name = NOT_FOUND.to_string();
        assert!(!r.has_name());
    }
}
