use crate::scrapers::selectors::Strategy;
use crate::scrapers::traits::{PageError, PageSource};
use crate::scrapers::types::NodeInfo;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

/// A listing page parsed from saved HTML.
///
/// Nothing is rendered, so sizes come from `width`/`height` attributes and
/// clicking a control only checks that it exists.
pub struct SnapshotPage {
    document: Html,
}

impl SnapshotPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML snapshot {}", path.display()))?;
        Ok(Self::parse(&html))
    }

    fn matches(&self, strategy: &Strategy) -> Result<Vec<ElementRef<'_>>, PageError> {
        match strategy {
            Strategy::Css(css) => {
                let selector = parse_selector(css)?;
                Ok(self.document.select(&selector).collect())
            }
            Strategy::Text { tag, needle } => {
                let selector = parse_selector(tag.unwrap_or("*"))?;
                Ok(self
                    .document
                    .select(&selector)
                    .filter(|el| first_own_text(el).is_some_and(|t| t.contains(needle)))
                    .collect())
            }
        }
    }
}

impl PageSource for SnapshotPage {
    fn body_text(&self) -> Result<String, PageError> {
        let body = parse_selector("body")?;
        Ok(self
            .document
            .select(&body)
            .next()
            .map(rendered_text)
            .unwrap_or_default())
    }

    fn select(&self, strategy: &Strategy) -> Result<Vec<NodeInfo>, PageError> {
        Ok(self.matches(strategy)?.into_iter().map(node_info).collect())
    }

    fn activate(&self, strategy: &Strategy) -> Result<bool, PageError> {
        Ok(!self.matches(strategy)?.is_empty())
    }
}

fn parse_selector(css: &str) -> Result<Selector, PageError> {
    Selector::parse(css).map_err(|_| PageError::InvalidSelector(css.to_string()))
}

// XPath `contains(text(), ..)` only looks at the first text child
fn first_own_text<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.children()
        .find_map(|child| child.value().as_text().map(|t| &**t))
}

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Text laid out roughly like `innerText`: inline markup stays on its line,
/// block elements and `<br>` start new lines, source whitespace collapses.
fn rendered_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_rendered(root, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_rendered(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child_el.value().name();
        if HIDDEN_TAGS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }

        let block = BLOCK_TAGS.contains(&name);
        if block {
            out.push('\n');
        }
        push_rendered(child_el, out);
        if block {
            out.push('\n');
        }
    }
}

fn node_info(el: ElementRef<'_>) -> NodeInfo {
    let dimension = |name: &str| {
        el.value()
            .attr(name)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
    };

    NodeInfo {
        text: rendered_text(el),
        src: el.value().attr("src").map(str::to_string),
        width: dimension("width"),
        height: dimension("height"),
        parent_class: el
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|p| p.value().attr("class"))
            .map(str::to_string),
    }
}
