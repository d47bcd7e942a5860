use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use tokio_util::sync::CancellationToken;

use crate::config::HarvestConfig;
use crate::extract::PageParser;
use crate::fetch::{Fetch, FetchError};
use crate::records::HarvestResult;

/// Builds the URL for a given page number.
///
/// Three cases: the base URL already carries a page token (substitute its
/// number), page 1 (use the base unchanged), or inject a token segment at
/// the end of the path, before any query string.
pub fn build_page_url(base: &str, page: u32, token: &str) -> String {
    let token_pattern = Regex::new(&format!(r"{}\d+", regex::escape(token)))
        .expect("escaped page token is a valid pattern");

    if token_pattern.is_match(base) {
        return token_pattern
            .replace_all(base, format!("{}{}", token, page))
            .into_owned();
    }

    if page == 1 {
        return base.to_string();
    }

    let (path, query) = match base.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (base, None),
    };

    let mut url = path.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str(&format!("{}{}/", token, page));

    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }

    url
}

/// Drives the fetch/parse loop across successive result pages.
///
/// Pages are processed strictly in order: the next-page decision depends on
/// the prior page's continuation flag and item count. Items are deduplicated
/// by salon name across pages, first occurrence wins.
pub struct Harvester<F: Fetch> {
    fetcher: F,
    parser: PageParser,
    page_token: String,
    cancel: CancellationToken,
}

impl<F: Fetch> Harvester<F> {
    /// Creates a harvester with an explicitly injected fetcher
    pub fn new(fetcher: F, config: &HarvestConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            fetcher,
            parser: PageParser::new(&config.site)?,
            page_token: config.site.page_token.clone(),
            cancel: CancellationToken::new(),
        })
    }

    /// Attaches an external cancellation token, checked before each fetch
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Harvests pages 1..=max_pages starting from `start_url`.
    ///
    /// The loop stops on an empty page, a cleared continuation flag,
    /// cancellation, or a fetch failure. A fetch failure past page 1 still
    /// yields the items accumulated so far; only a page-1 failure, where
    /// nothing has been collected, is surfaced as an error.
    pub async fn harvest(
        &self,
        start_url: &str,
        max_pages: u32,
    ) -> Result<HarvestResult, FetchError> {
        let max_pages = max_pages.max(1);
        let mut items = Vec::new();
        let mut seen_names = HashSet::new();
        let mut title = String::new();

        for page in 1..=max_pages {
            if self.cancel.is_cancelled() {
                ::log::info!(
                    "Harvest cancelled before page {}, returning {} items",
                    page,
                    items.len()
                );
                break;
            }

            let page_url = build_page_url(start_url, page, &self.page_token);
            ::log::info!("Fetching page {}: {}", page, page_url);

            let html = match self.fetcher.fetch(&page_url).await {
                Ok(html) => html,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    ::log::warn!(
                        "Page {} failed ({}), keeping {} items from earlier pages",
                        page,
                        e,
                        items.len()
                    );
                    break;
                }
            };

            let result = self.parser.parse_page(&html);

            if page == 1 {
                title = result.title;
            }

            if result.items.is_empty() {
                ::log::info!("Page {} yielded no items, stopping", page);
                break;
            }

            for item in result.items {
                if seen_names.insert(item.name.clone()) {
                    items.push(item);
                }
            }

            if !result.has_next {
                ::log::info!("Reached last page at {}", page);
                break;
            }
        }

        Ok(HarvestResult { items, title })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn test_build_page_url_substitutes_existing_token() {
        assert_eq!(
            build_page_url("https://example.com/list/PN1/", 3, "PN"),
            "https://example.com/list/PN3/"
        );
        assert_eq!(
            build_page_url("https://example.com/list/PN12/?sort=1", 2, "PN"),
            "https://example.com/list/PN2/?sort=1"
        );
    }

    #[test]
    fn test_build_page_url_first_page_unchanged() {
        assert_eq!(
            build_page_url("https://example.com/list/", 1, "PN"),
            "https://example.com/list/"
        );
        assert_eq!(
            build_page_url("https://example.com/list?sort=1", 1, "PN"),
            "https://example.com/list?sort=1"
        );
    }

    #[test]
    fn test_build_page_url_injects_token() {
        assert_eq!(
            build_page_url("https://example.com/list/", 2, "PN"),
            "https://example.com/list/PN2/"
        );
        // A missing trailing slash is added before the token segment
        assert_eq!(
            build_page_url("https://example.com/list", 4, "PN"),
            "https://example.com/list/PN4/"
        );
        // The query string stays behind the injected segment
        assert_eq!(
            build_page_url("https://example.com/list?sort=1&area=2", 2, "PN"),
            "https://example.com/list/PN2/?sort=1&area=2"
        );
    }

    /// In-memory fetcher mapping URLs to canned pages
    struct StubFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(pages: Vec<(&str, String)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, html)| (url.to_string(), html))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Fetch for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status(404, url.to_string()))
        }
    }

    fn card(name: &str) -> String {
        format!(
            concat!(
                r#"<li class="searchListCassette">"#,
                r#"<h3 class="slcHead"><a href="/sln/{0}/">{1}</a></h3>"#,
                r#"<p class="slcCouponPrice">¥5,500</p>"#,
                "</li>"
            ),
            name.to_lowercase().replace(' ', ""),
            name
        )
    }

    fn page(title: &str, names: &[&str], has_next: bool) -> String {
        let cards: String = names.iter().map(|name| card(name)).collect();
        let arrow = if has_next {
            r#"<span class="iS arrowPagingR">next</span>"#
        } else {
            ""
        };
        format!(
            "<html><head><title>{}｜ホットペッパービューティー</title></head>\
             <body><ul>{}</ul>{}</body></html>",
            title, cards, arrow
        )
    }

    fn harvester(fetcher: StubFetcher) -> Harvester<StubFetcher> {
        Harvester::new(fetcher, &HarvestConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_two_pages_dedup_and_order() {
        let start = "https://beauty.hotpepper.jp/genre/kgkw094/";
        let fetcher = StubFetcher::new(vec![
            (start, page("渋谷のサロン", &["Salon A", "Salon B"], true)),
            (
                "https://beauty.hotpepper.jp/genre/kgkw094/PN2/",
                page("2ページ目", &["Salon B", "Salon C"], false),
            ),
        ]);

        let result = harvester(fetcher).harvest(start, 2).await.unwrap();

        let names: Vec<&str> = result.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Salon A", "Salon B", "Salon C"]);
        assert_eq!(result.title, "渋谷のサロン");
    }

    #[tokio::test]
    async fn test_dedup_keeps_first_occurrence() {
        let start = "https://beauty.hotpepper.jp/genre/";
        let mut duplicate = card("Salon A");
        // Page 2 repeats Salon A with a different link; page 1 wins
        duplicate = duplicate.replace("/sln/salona/", "/sln/other/");
        let page2 = format!(
            "<html><head><title>2</title></head><body><ul>{}</ul></body></html>",
            duplicate
        );
        let fetcher = StubFetcher::new(vec![
            (start, page("検索結果", &["Salon A"], true)),
            ("https://beauty.hotpepper.jp/genre/PN2/", page2),
        ]);

        let result = harvester(fetcher).harvest(start, 5).await.unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(
            result.items[0].url.as_deref(),
            Some("https://beauty.hotpepper.jp/sln/salona/")
        );
    }

    #[tokio::test]
    async fn test_stops_when_has_next_is_false() {
        let start = "https://beauty.hotpepper.jp/genre/";
        let fetcher = StubFetcher::new(vec![(start, page("検索結果", &["Salon A"], false))]);
        let harvester = harvester(fetcher);

        let result = harvester.harvest(start, 10).await.unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(harvester.fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let start = "https://beauty.hotpepper.jp/genre/";
        let fetcher = StubFetcher::new(vec![
            (start, page("検索結果", &["Salon A"], true)),
            (
                "https://beauty.hotpepper.jp/genre/PN2/",
                page("2ページ目", &[], true),
            ),
        ]);
        let harvester = harvester(fetcher);

        let result = harvester.harvest(start, 10).await.unwrap();

        assert_eq!(result.items.len(), 1);
        // Page 3 is never requested
        assert_eq!(harvester.fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_past_page_one_keeps_partial_result() {
        let start = "https://beauty.hotpepper.jp/genre/";
        // Page 2 is absent from the stub, so its fetch fails
        let fetcher = StubFetcher::new(vec![(start, page("検索結果", &["Salon A"], true))]);

        let result = harvester(fetcher).harvest(start, 5).await.unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.title, "検索結果");
    }

    #[tokio::test]
    async fn test_fetch_failure_on_page_one_is_an_error() {
        let fetcher = StubFetcher::new(vec![]);

        let result = harvester(fetcher)
            .harvest("https://beauty.hotpepper.jp/genre/", 5)
            .await;

        assert!(matches!(result, Err(FetchError::Status(404, _))));
    }

    #[tokio::test]
    async fn test_cancellation_returns_accumulated_items() {
        let start = "https://beauty.hotpepper.jp/genre/";
        let fetcher = StubFetcher::new(vec![(start, page("検索結果", &["Salon A"], true))]);
        let cancel = CancellationToken::new();

        struct CancellingFetcher {
            inner: StubFetcher,
            cancel: CancellationToken,
        }

        impl Fetch for CancellingFetcher {
            async fn fetch(&self, url: &str) -> Result<String, FetchError> {
                // Cancel after serving the first page
                self.cancel.cancel();
                self.inner.fetch(url).await
            }
        }

        let fetcher = CancellingFetcher {
            inner: fetcher,
            cancel: cancel.clone(),
        };
        let harvester = Harvester::new(fetcher, &HarvestConfig::default())
            .unwrap()
            .with_cancellation(cancel);

        let result = harvester.harvest(start, 10).await.unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(harvester.fetcher.inner.request_count(), 1);
    }

    #[tokio::test]
    async fn test_title_taken_from_first_page_only() {
        let start = "https://beauty.hotpepper.jp/genre/";
        let fetcher = StubFetcher::new(vec![
            (start, page("最初のページ", &["Salon A"], true)),
            (
                "https://beauty.hotpepper.jp/genre/PN2/",
                page("あとのページ", &["Salon B"], false),
            ),
        ]);

        let result = harvester(fetcher).harvest(start, 5).await.unwrap();

        assert_eq!(result.title, "最初のページ");
    }
}
