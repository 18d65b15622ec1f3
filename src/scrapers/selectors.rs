use std::fmt;
use tracing::debug;

/// One way of locating elements on a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Css(&'static str),
    /// Elements of `tag` (any tag when `None`) whose direct text contains `needle`
    Text {
        tag: Option<&'static str>,
        needle: &'static str,
    },
}

impl Strategy {
    /// XPath form of a text query, as evaluated in the browser
    pub fn xpath(&self) -> Option<String> {
        match self {
            Strategy::Css(_) => None,
            Strategy::Text { tag, needle } => Some(format!(
                "//{}[contains(text(), '{}')]",
                tag.unwrap_or("*"),
                needle
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Css(selector) => write!(f, "{selector}"),
            Strategy::Text { .. } => write!(f, "{}", self.xpath().unwrap_or_default()),
        }
    }
}

/// Outcome of trying a single strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Found(T),
    Empty,
    Failed(String),
}

/// Outcome of walking a whole chain
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Matched { strategy: Strategy, value: T },
    /// No strategy matched; carries the strategies that errored rather than missed
    Exhausted { failures: Vec<(Strategy, String)> },
}

impl<T> Resolution<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Resolution::Matched { value, .. } => Some(value),
            Resolution::Exhausted { .. } => None,
        }
    }

    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Resolution::Matched { strategy, .. } => Some(*strategy),
            Resolution::Exhausted { .. } => None,
        }
    }
}

/// Ordered strategies where the first non-empty result wins
#[derive(Debug, Clone, Copy)]
pub struct SelectorChain {
    name: &'static str,
    strategies: &'static [Strategy],
}

impl SelectorChain {
    pub const fn new(name: &'static str, strategies: &'static [Strategy]) -> Self {
        Self { name, strategies }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn strategies(&self) -> &'static [Strategy] {
        self.strategies
    }

    /// Probe strategies in order, stopping at the first `Found`.
    pub fn first_match<T, F>(&self, mut probe: F) -> Resolution<T>
    where
        F: FnMut(&Strategy) -> Probe<T>,
    {
        let mut failures = Vec::new();

        for strategy in self.strategies {
            match probe(strategy) {
                Probe::Found(value) => {
                    debug!("[{}] matched with '{}'", self.name, strategy);
                    return Resolution::Matched {
                        strategy: *strategy,
                        value,
                    };
                }
                Probe::Empty => debug!("[{}] nothing at '{}'", self.name, strategy),
                Probe::Failed(reason) => {
                    debug!("[{}] '{}' failed: {}", self.name, strategy, reason);
                    failures.push((*strategy, reason));
                }
            }
        }

        Resolution::Exhausted { failures }
    }
}

pub const NAME: SelectorChain = SelectorChain::new(
    "name",
    &[
        Strategy::Css("h1"),
        Strategy::Css(r#"[data-testid*="title"]"#),
        Strategy::Css(".listing-title"),
        Strategy::Css(".space-title"),
    ],
);

pub const ADDRESS: SelectorChain = SelectorChain::new(
    "address",
    &[
        Strategy::Css(".location-text"),
        Strategy::Css(".neighborhood"),
        Strategy::Css(r#"[class*="address"]"#),
        Strategy::Css(r#"[class*="location"]"#),
        Strategy::Text {
            tag: Some("span"),
            needle: "Los Angeles",
        },
        Strategy::Text {
            tag: Some("div"),
            needle: "CA",
        },
    ],
);

pub const CATEGORY: SelectorChain = SelectorChain::new(
    "category",
    &[
        Strategy::Css(".space-type"),
        Strategy::Css(".listing-type"),
        Strategy::Css(r#"[class*="category"]"#),
        Strategy::Css(".tag"),
        Strategy::Css(".badge"),
        Strategy::Css(r#"span[class*="type"]"#),
    ],
);

pub const HOST_NAME: SelectorChain = SelectorChain::new(
    "host",
    &[
        Strategy::Css(r#"[data-testid*="host"]"#),
        Strategy::Css(".host-name"),
        Strategy::Css(r#"[class*="host"]"#),
    ],
);

pub const DESCRIPTION: SelectorChain = SelectorChain::new(
    "description",
    &[
        Strategy::Css(r#"[data-testid*="description"]"#),
        Strategy::Css(".description"),
        Strategy::Css(".about"),
        Strategy::Css(".details p"),
        Strategy::Css("p"),
    ],
);

pub const AMENITIES: SelectorChain = SelectorChain::new(
    "amenities",
    &[
        Strategy::Css(".amenity"),
        Strategy::Css(".feature"),
        Strategy::Css(".amenities li"),
        Strategy::Css(r#"[data-testid*="amenity"]"#),
        Strategy::Css(".facilities li"),
        Strategy::Css("li"),
    ],
);

pub const VIEW_ALL_PHOTOS: SelectorChain = SelectorChain::new(
    "view-all",
    &[
        Strategy::Css(r#"[data-testing-id="photoWithViewAllButton"]"#),
        Strategy::Css(r#"div[class*="tw-absolute"] span[data-testing-id="photoWithViewAllButton"]"#),
        Strategy::Css(r#"span[data-testing-id="photoWithViewAllButton"]"#),
        Strategy::Text {
            tag: None,
            needle: "View all",
        },
        Strategy::Text {
            tag: Some("span"),
            needle: "View all",
        },
        Strategy::Text {
            tag: Some("div"),
            needle: "View all",
        },
    ],
);

pub const GALLERY_MODAL: SelectorChain = SelectorChain::new(
    "gallery-modal",
    &[
        Strategy::Css(".modal img"),
        Strategy::Css(".overlay img"),
        Strategy::Css(".gallery-modal img"),
        Strategy::Css(".lightbox img"),
        Strategy::Css(r#"[role="dialog"] img"#),
        Strategy::Css(".tw-fixed img"),
        Strategy::Css(r#"div[class*="tw-fixed"] img"#),
        Strategy::Css(".carousel img"),
        Strategy::Css(".slider img"),
    ],
);

pub const ASPECT_BUTTON_IMAGES: Strategy = Strategy::Css(r#"button[class*="tw-aspect"] img"#);

pub const BUTTON_THUMBNAILS: SelectorChain = SelectorChain::new(
    "button-thumbnails",
    &[
        ASPECT_BUTTON_IMAGES,
        Strategy::Css("button span img"),
        Strategy::Css("button img"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_strategy_renders_xpath() {
        let any = Strategy::Text {
            tag: None,
            needle: "View all",
        };
        assert_eq!(any.xpath().unwrap(), "//*[contains(text(), 'View all')]");
        assert_eq!(Strategy::Css("h1").xpath(), None);
        assert_eq!(ADDRESS.strategies()[4].to_string(), "//span[contains(text(), 'Los Angeles')]");
    }

    #[test]
    fn first_match_stops_at_first_found() {
        let mut probed = Vec::new();
        let resolution = CATEGORY.first_match(|s| {
            probed.push(*s);
            match s {
                Strategy::Css(".tag") => Probe::Found("Studio"),
                Strategy::Css(".badge") => Probe::Found("never reached"),
                _ => Probe::Empty,
            }
        });

        assert_eq!(resolution.strategy(), Some(Strategy::Css(".tag")));
        assert_eq!(resolution.into_value(), Some("Studio"));
        assert_eq!(probed.len(), 4);
    }

    #[test]
    fn failures_are_kept_apart_from_misses() {
        let resolution: Resolution<()> = NAME.first_match(|s| match s {
            Strategy::Css(".listing-title") => Probe::Failed("stale element".to_string()),
            _ => Probe::Empty,
        });

        match resolution {
            Resolution::Exhausted { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, Strategy::Css(".listing-title"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_strategy_falls_through_to_next() {
        let resolution = HOST_NAME.first_match(|s| match s {
            Strategy::Css(r#"[data-testid*="host"]"#) => Probe::Failed("boom".to_string()),
            Strategy::Css(".host-name") => Probe::Found("Dana"),
            _ => Probe::Empty,
        });
        assert_eq!(resolution.into_value(), Some("Dana"));
    }

    #[test]
    fn view_all_tries_css_before_text_queries() {
        let strategies = VIEW_ALL_PHOTOS.strategies();
        assert!(strategies[..3].iter().all(|s| matches!(s, Strategy::Css(_))));
        assert!(strategies[3..].iter().all(|s| matches!(s, Strategy::Text { .. })));
    }
}
