use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of result pages to fetch
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header sent with every request
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Accept-Language header sent with every request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Selectors and extraction constants for the target site
    #[serde(default)]
    pub site: SiteProfile,
}

/// One named engagement counter and the selector of its label element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSpec {
    /// Counter name in the extracted record, e.g. "blog"
    pub name: String,

    /// Selector for the label element; the display value sits in the
    /// following `dd` sibling
    pub label_selector: String,
}

/// Site-specific selectors and extraction constants.
///
/// Defaults target Hot Pepper Beauty search result pages. The price window
/// and cap are observed site heuristics, kept configurable rather than
/// hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Origin prefixed onto relative card links
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Branding suffix stripped from the page title
    #[serde(default = "default_title_suffix")]
    pub title_suffix: String,

    /// Selector matching one listing card
    #[serde(default = "default_card_selector")]
    pub card_selector: String,

    /// Name/link selectors tried in order, first hit wins
    #[serde(default = "default_name_selectors")]
    pub name_selectors: Vec<String>,

    /// Engagement counters to extract from each card
    #[serde(default = "default_counters")]
    pub counters: Vec<CounterSpec>,

    /// Selector matching the coupon price elements of a card
    #[serde(default = "default_price_selector")]
    pub price_selector: String,

    /// Selector for the next-page arrow marker
    #[serde(default = "default_next_marker_selector")]
    pub next_marker_selector: String,

    /// Page-index token in pagination URLs, e.g. "PN" in "/PN3/"
    #[serde(default = "default_page_token")]
    pub page_token: String,

    /// Lowest price value accepted as a real coupon price
    #[serde(default = "default_price_min")]
    pub price_min: u32,

    /// Highest price value accepted as a real coupon price
    #[serde(default = "default_price_max")]
    pub price_max: u32,

    /// Maximum number of prices kept per card, in display order
    #[serde(default = "default_price_cap")]
    pub price_cap: usize,
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            site: SiteProfile::default(),
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            title_suffix: default_title_suffix(),
            card_selector: default_card_selector(),
            name_selectors: default_name_selectors(),
            counters: default_counters(),
            price_selector: default_price_selector(),
            next_marker_selector: default_next_marker_selector(),
            page_token: default_page_token(),
            price_min: default_price_min(),
            price_max: default_price_max(),
            price_cap: default_price_cap(),
        }
    }
}

/// Default page ceiling, effectively unbounded for real searches
fn default_max_pages() -> u32 {
    100
}

/// Default request timeout in seconds
fn default_timeout_secs() -> u64 {
    30
}

/// The target serves reduced markup to unidentified clients, so the default
/// header profile matches a common desktop browser.
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "ja,en-US;q=0.7,en;q=0.3".to_string()
}

fn default_origin() -> String {
    "https://beauty.hotpepper.jp".to_string()
}

fn default_title_suffix() -> String {
    "｜ホットペッパービューティー".to_string()
}

fn default_card_selector() -> String {
    "li.searchListCassette".to_string()
}

fn default_name_selectors() -> Vec<String> {
    vec!["h3.slcHead a".to_string(), "h3 a".to_string()]
}

fn default_counters() -> Vec<CounterSpec> {
    vec![
        CounterSpec {
            name: "blog".to_string(),
            label_selector: "dt.slcDetailBlogIcon".to_string(),
        },
        CounterSpec {
            name: "review".to_string(),
            label_selector: "dt.slcDetailMessageIcon".to_string(),
        },
    ]
}

fn default_price_selector() -> String {
    ".slcCouponPrice".to_string()
}

fn default_next_marker_selector() -> String {
    ".iS.arrowPagingR".to_string()
}

fn default_page_token() -> String {
    "PN".to_string()
}

fn default_price_min() -> u32 {
    500
}

fn default_price_max() -> u32 {
    100000
}

fn default_price_cap() -> usize {
    3
}
