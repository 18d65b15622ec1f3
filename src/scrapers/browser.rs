use crate::config::Config;
use crate::models::ListingRecord;
use crate::scrapers::listing::extract_listing;
use crate::scrapers::selectors::Strategy;
use crate::scrapers::traits::{PageError, PageSource};
use crate::scrapers::types::{NodeInfo, Pacing};
use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const HIDE_WEBDRIVER: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined })";

const BODY_TEXT: &str = "document.body ? document.body.innerText : ''";

// `__FIND__` is replaced by an expression yielding an array of elements
const COLLECT_NODES: &str = r#"
(() => {
  try {
    const nodes = __FIND__;
    return JSON.stringify({
      nodes: nodes.map((n) => {
        const rect = n.getBoundingClientRect();
        const parent = n.parentElement;
        return {
          text: (n.innerText || n.textContent || '').trim(),
          src: n.src || n.getAttribute('src'),
          width: rect.width,
          height: rect.height,
          parentClass: parent && typeof parent.className === 'string' ? parent.className : null,
        };
      }),
    });
  } catch (e) {
    return JSON.stringify({ error: String(e) });
  }
})()
"#;

#[derive(Debug, Deserialize)]
struct QueryReply {
    #[serde(default)]
    nodes: Vec<NodeInfo>,
    error: Option<String>,
}

fn query_script(strategy: &Strategy) -> String {
    let find = match strategy {
        Strategy::Css(css) => format!(
            "Array.from(document.querySelectorAll({}))",
            serde_json::Value::from(*css)
        ),
        Strategy::Text { .. } => format!(
            "((r) => Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)))\
             (document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null))",
            serde_json::Value::from(strategy.xpath().unwrap_or_default())
        ),
    };
    COLLECT_NODES.replace("__FIND__", &find)
}

/// A listing loaded in a live Chrome tab
pub struct LivePage<'a> {
    tab: &'a Tab,
    pacing: Pacing,
}

impl<'a> LivePage<'a> {
    pub fn new(tab: &'a Tab, pacing: Pacing) -> Self {
        Self { tab, pacing }
    }

    fn evaluate_string(&self, script: &str) -> Result<String, PageError> {
        let result = self.tab.evaluate(script, false)?;
        result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| PageError::Script("script returned no string".to_string()))
    }
}

impl PageSource for LivePage<'_> {
    fn body_text(&self) -> Result<String, PageError> {
        self.evaluate_string(BODY_TEXT)
    }

    fn select(&self, strategy: &Strategy) -> Result<Vec<NodeInfo>, PageError> {
        let raw = self.evaluate_string(&query_script(strategy))?;
        let reply: QueryReply =
            serde_json::from_str(&raw).map_err(|e| PageError::Script(e.to_string()))?;

        match reply.error {
            Some(error) => Err(PageError::InvalidSelector(format!("{strategy}: {error}"))),
            None => Ok(reply.nodes),
        }
    }

    fn activate(&self, strategy: &Strategy) -> Result<bool, PageError> {
        if self.select(strategy)?.is_empty() {
            return Ok(false);
        }

        let element = match strategy {
            Strategy::Css(css) => self.tab.find_element(css)?,
            Strategy::Text { .. } => self
                .tab
                .find_element_by_xpath(&strategy.xpath().unwrap_or_default())?,
        };

        element.scroll_into_view()?;
        thread::sleep(self.pacing.scroll_settle);
        element.click()?;
        debug!("Clicked '{}'", strategy);

        Ok(true)
    }
}

/// Browser-based listing scraper using Chrome
pub struct VenueBrowserScraper {
    browser: Browser,
    pacing: Pacing,
    debug_dir: Option<PathBuf>,
}

impl VenueBrowserScraper {
    /// Launch Chrome. Failing here aborts the run.
    pub fn new(config: &Config) -> Result<Self> {
        info!("Launching Chrome (headless: {})...", config.headless);

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .idle_browser_timeout(Duration::from_secs(90))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-infobars"),
            ])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        info!("✅ Chrome ready");

        Ok(Self {
            browser,
            pacing: config.pacing,
            debug_dir: config.debug_dir.clone(),
        })
    }

    /// Load one listing page and extract it
    pub fn scrape_listing(&self, url: &str) -> Result<ListingRecord> {
        info!("🏠 Loading: {}", url);
        let tab = self.browser.new_tab().context("Failed to open tab")?;

        tab.navigate_to(url)
            .with_context(|| format!("Failed to open {url}"))?;
        tab.wait_until_navigated()?;

        if let Err(e) = tab.evaluate(HIDE_WEBDRIVER, false) {
            debug!("Could not hide webdriver flag: {}", e);
        }

        info!("Waiting for page to load...");
        thread::sleep(self.pacing.page_load);

        if let Some(dir) = &self.debug_dir {
            capture_debug(&tab, dir)?;
        }

        let page = LivePage::new(&tab, self.pacing);
        let record = extract_listing(&page, url, &self.pacing)?;

        if let Err(e) = tab.close(true) {
            warn!("Failed to close tab: {}", e);
        }

        Ok(record)
    }
}

impl Drop for VenueBrowserScraper {
    fn drop(&mut self) {
        // Chrome is killed when `browser` drops
        info!("Closing Chrome");
    }
}

fn capture_debug(tab: &Tab, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let html = tab.get_content()?;
    let html_path = dir.join("listing_page.html");
    std::fs::write(&html_path, &html)?;
    info!("Saved page HTML to {} ({} bytes)", html_path.display(), html.len());

    let screenshot = tab.capture_screenshot(
        Page::CaptureScreenshotFormatOption::Png,
        None,
        None,
        true,
    )?;
    let shot_path = dir.join("listing_screenshot.png");
    std::fs::write(&shot_path, screenshot)?;
    info!("Saved screenshot to {}", shot_path.display());

    Ok(())
}
