use crate::models::{NOT_FOUND, NO_DESCRIPTION};
use crate::scrapers::selectors::{Probe, Resolution, SelectorChain, Strategy};
use crate::scrapers::traits::PageSource;
use regex::Regex;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

const PRICE_RANGE: RangeInclusive<u32> = 10..=2000;
const CAPACITY_RANGE: RangeInclusive<u32> = 1..=500;

const MIN_DESCRIPTION_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 300;
const AMENITY_CHARS: RangeInclusive<usize> = 3..=50;
const MAX_AMENITIES: usize = 10;

static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\$(\d+)(?:/hour|/hr|per hour)",
        r"\$(\d+)",
        r"(?i)(\d+)\s*(?:USD|dollars?)(?:/hour|/hr|per hour)?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static CAPACITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)up to (\d+) (?:people|guests)",
        r"(?i)capacity:?\s*(\d+)",
        r"(?i)(\d+)\s*(?:people|guests|persons)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Hourly price from the visible page text, if any dollar amount looks plausible
pub fn extract_price(page_text: &str) -> Option<u32> {
    let price = first_in_range(&PRICE_PATTERNS, page_text, &PRICE_RANGE);
    match price {
        Some(p) => info!("💰 Found price: ${}", p),
        None => warn!("❌ No price found"),
    }
    price
}

/// Guest capacity from the visible page text
pub fn extract_capacity(page_text: &str) -> Option<u32> {
    let capacity = first_in_range(&CAPACITY_PATTERNS, page_text, &CAPACITY_RANGE);
    match capacity {
        Some(c) => info!("👥 Found capacity: {}", c),
        None => warn!("❌ No capacity found"),
    }
    capacity
}

// Patterns are tried in order; within a pattern, matches in text order.
fn first_in_range(patterns: &[Regex], text: &str, range: &RangeInclusive<u32>) -> Option<u32> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .find(|n| range.contains(n))
    })
}

/// Trimmed text of the first element matched by `strategy`
pub fn probe_text<P: PageSource + ?Sized>(page: &P, strategy: &Strategy) -> Probe<String> {
    match page.select(strategy) {
        Ok(nodes) => match nodes.first().map(|n| n.text.trim()) {
            Some(text) if !text.is_empty() => Probe::Found(text.to_string()),
            _ => Probe::Empty,
        },
        Err(e) => Probe::Failed(e.to_string()),
    }
}

/// First non-empty text produced by the chain, or [`NOT_FOUND`]
pub fn find_text<P: PageSource + ?Sized>(page: &P, chain: &SelectorChain) -> String {
    match chain.first_match(|s| probe_text(page, s)) {
        Resolution::Matched { strategy, value } => {
            info!("✅ Found {} with '{}': {}", chain.name(), strategy, truncate_chars(&value, 50));
            value
        }
        Resolution::Exhausted { failures } => {
            warn!(
                "❌ No {} found with any selector ({} errored)",
                chain.name(),
                failures.len()
            );
            NOT_FOUND.to_string()
        }
    }
}

/// First element text long enough to be a description, cut to 300 characters
pub fn find_description<P: PageSource + ?Sized>(page: &P, chain: &SelectorChain) -> String {
    let resolution = chain.first_match(|s| match page.select(s) {
        Ok(nodes) => nodes
            .iter()
            .map(|n| n.text.trim())
            .find(|t| t.chars().count() > MIN_DESCRIPTION_CHARS)
            .map(|t| Probe::Found(truncate_chars(t, MAX_DESCRIPTION_CHARS)))
            .unwrap_or(Probe::Empty),
        Err(e) => Probe::Failed(e.to_string()),
    });

    if let Some(strategy) = resolution.strategy() {
        info!("✅ Found description with '{}'", strategy);
    }
    resolution
        .into_value()
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Short feature labels gathered from every strategy of the chain
pub fn find_amenities<P: PageSource + ?Sized>(page: &P, chain: &SelectorChain) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut amenities = Vec::new();

    for strategy in chain.strategies() {
        let nodes = match page.select(strategy) {
            Ok(nodes) => nodes,
            Err(e) => {
                debug!("Amenity selector '{}' failed: {}", strategy, e);
                continue;
            }
        };

        for node in nodes {
            let text = node.text.trim();
            if AMENITY_CHARS.contains(&text.chars().count()) && seen.insert(text.to_string()) {
                amenities.push(text.to_string());
                if amenities.len() == MAX_AMENITIES {
                    return amenities;
                }
            }
        }
    }

    amenities
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::selectors::{AMENITIES, DESCRIPTION, NAME};
    use crate::scrapers::snapshot::SnapshotPage;

    #[test]
    fn price_and_capacity_from_example_text() {
        let text = "Rooftop studio. $45/hour. Fits up to 30 guests.";
        assert_eq!(extract_price(text), Some(45));
        assert_eq!(extract_capacity(text), Some(30));
    }

    #[test]
    fn price_outside_range_is_discarded() {
        assert_eq!(extract_price("Only $5/hr, deposit $5000"), None);
        assert_eq!(extract_price("Was $3000/hr, now $120"), Some(120));
        assert_eq!(extract_price("No dollar amounts here"), None);
    }

    #[test]
    fn hourly_pattern_needs_the_unit_right_after_the_amount() {
        // "$80 per hour" has a space, so the plain dollar pattern decides
        assert_eq!(extract_price("Cleaning fee $25. Rate: $80 per hour"), Some(25));
        assert_eq!(extract_price("$50 per hour weekdays, $30/hr off-peak"), Some(30));
        assert_eq!(extract_price("Rate 150 USD/hr"), Some(150));
    }

    #[test]
    fn price_range_edges() {
        assert_eq!(extract_price("$10/hour"), Some(10));
        assert_eq!(extract_price("$2000/hour"), Some(2000));
        assert_eq!(extract_price("$9/hour"), None);
        assert_eq!(extract_price("$2001/hour"), None);
    }

    #[test]
    fn capacity_range_edges() {
        assert_eq!(extract_capacity("up to 1 people"), Some(1));
        assert_eq!(extract_capacity("up to 500 guests"), Some(500));
        assert_eq!(extract_capacity("up to 501 guests"), None);
    }

    #[test]
    fn capacity_outside_range_is_discarded() {
        assert_eq!(extract_capacity("capacity: 0"), None);
        assert_eq!(extract_capacity("Capacity 900, seated 120 people"), Some(120));
        assert_eq!(extract_capacity("2 persons max"), Some(2));
    }

    #[test]
    fn huge_numbers_do_not_panic() {
        assert_eq!(extract_price("$99999999999999999999"), None);
    }

    #[test]
    fn find_text_returns_trimmed_first_match() {
        let page = SnapshotPage::parse(
            r#"<body><h1>   </h1><div class="listing-title">  The Warehouse  </div></body>"#,
        );
        assert_eq!(find_text(&page, &NAME), "The Warehouse");
    }

    #[test]
    fn find_text_falls_back_to_sentinel() {
        let page = SnapshotPage::parse("<body><p>nothing useful</p></body>");
        assert_eq!(find_text(&page, &NAME), NOT_FOUND);
    }

    #[test]
    fn description_needs_substance_and_is_truncated() {
        let long = "A bright open space with natural light. ".repeat(20);
        let html = format!("<body><p>Short intro.</p><p>{long}</p></body>");
        let page = SnapshotPage::parse(&html);
        let description = find_description(&page, &DESCRIPTION);
        assert_eq!(description.chars().count(), 300);
        assert!(description.starts_with("A bright open space"));

        let empty = SnapshotPage::parse("<body><p>tiny</p></body>");
        assert_eq!(find_description(&empty, &DESCRIPTION), NO_DESCRIPTION);
    }

    #[test]
    fn amenities_are_unique_short_and_capped() {
        let mut items = String::new();
        for i in 0..15 {
            items.push_str(&format!("<li>Amenity {i}</li>"));
        }
        let html = format!(
            r#"<body><div class="amenity">Wifi</div><ul class="amenities"><li>Wifi</li><li>TV</li>{items}</ul></body>"#
        );
        let page = SnapshotPage::parse(&html);
        let amenities = find_amenities(&page, &AMENITIES);

        assert_eq!(amenities.len(), 10);
        assert_eq!(amenities[0], "Wifi");
        assert_eq!(amenities.iter().filter(|a| *a == "Wifi").count(), 1);
        assert!(!amenities.contains(&"TV".to_string()));
    }
}
