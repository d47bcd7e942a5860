use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extract::prices::PriceStats;

/// One extracted salon listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalonRecord {
    /// Salon name, also the identity key for cross-page dedup
    pub name: String,

    /// Absolute URL of the salon's detail page (if the card carried a link)
    pub url: Option<String>,

    /// Named engagement counters, e.g. "blog" and "review"
    #[serde(default)]
    pub counters: BTreeMap<String, u32>,

    /// Accepted coupon prices in display order, capped by the site profile
    #[serde(default)]
    pub prices: Vec<u32>,
}

impl SalonRecord {
    /// Create a record with no counters or prices yet
    pub fn new(name: String, url: Option<String>) -> Self {
        Self {
            name,
            url,
            counters: BTreeMap::new(),
            prices: Vec::new(),
        }
    }

    /// Min/max/average over the extracted prices, recomputed on demand
    pub fn price_stats(&self) -> PriceStats {
        PriceStats::from_prices(&self.prices)
    }
}

/// The parsed output of one fetched listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Page title with the site branding suffix stripped
    pub title: String,

    /// Whether the page carries a next-page marker
    pub has_next: bool,

    /// Cards extracted from the page, in document order
    pub items: Vec<SalonRecord>,
}

/// The aggregated outcome of one harvest across 1..N pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestResult {
    /// Deduplicated salons across all fetched pages, first occurrence wins
    pub items: Vec<SalonRecord>,

    /// Title of the first page only
    pub title: String,
}
