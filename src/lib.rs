// Re-export modules
pub mod config;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod records;

// Re-export commonly used types for convenience
pub use records::{HarvestResult, PageResult, SalonRecord};

use std::error::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::HarvestConfig;
use crate::fetch::{Fetch, FetchError, HttpFetcher};
use crate::harvest::Harvester;

/// Builder for one harvest run over a paginated search result
pub struct Harvest {
    start_url: String,
    max_pages: Option<u32>,
    config: HarvestConfig,
    cancel: CancellationToken,
}

impl Harvest {
    /// Create a new harvest builder for the given start URL
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_pages: None,
            config: HarvestConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Override the page ceiling from the configuration
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Set the full configuration, including the site profile
    pub fn with_config(mut self, config: HarvestConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn Error>> {
        self.config = HarvestConfig::from_file(path)?;
        Ok(self)
    }

    /// Attach a cancellation token; cancelling it ends the harvest after the
    /// page currently in flight, keeping the items collected so far
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the harvest with the default HTTP fetcher
    pub async fn run(self) -> Result<HarvestResult, Box<dyn Error>> {
        let fetcher = HttpFetcher::new(&self.config)?;
        self.run_with(fetcher).await
    }

    /// Run the harvest with an explicitly injected fetcher
    pub async fn run_with<F: Fetch>(self, fetcher: F) -> Result<HarvestResult, Box<dyn Error>> {
        Url::parse(&self.start_url)
            .map_err(|_| FetchError::InvalidUrl(self.start_url.clone()))?;

        let max_pages = self.max_pages.unwrap_or(self.config.max_pages);
        let harvester =
            Harvester::new(fetcher, &self.config)?.with_cancellation(self.cancel);

        Ok(harvester.harvest(&self.start_url, max_pages).await?)
    }
}
