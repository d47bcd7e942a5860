pub mod number;
pub mod prices;


use scraper::{ElementRef, Html, Selector};
use std::error::Error;

use crate::config::SiteProfile;
use crate::records::{PageResult, SalonRecord};

/// Compiles a selector string from the site profile
fn compile(selector: &str) -> Result<Selector, Box<dyn Error>> {
    Selector::parse(selector).map_err(|e| format!("invalid selector {:?}: {}", selector, e).into())
}

/// Joined text of an element with each text node trimmed
fn element_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Extracts structured salon records from individual listing cards.
///
/// Each field is recovered independently: a missing counter or price never
/// aborts the card, only a missing (or too short) name does.
pub struct CardExtractor {
    name_selectors: Vec<Selector>,
    counter_selectors: Vec<(String, Selector)>,
    price_selector: Selector,
    anchor_selector: Selector,
    origin: String,
    price_min: u32,
    price_max: u32,
    price_cap: usize,
}

impl CardExtractor {
    /// Compiles the card-level selectors from a site profile
    pub fn new(profile: &SiteProfile) -> Result<Self, Box<dyn Error>> {
        let mut name_selectors = Vec::with_capacity(profile.name_selectors.len());
        for selector in &profile.name_selectors {
            name_selectors.push(compile(selector)?);
        }

        let mut counter_selectors = Vec::with_capacity(profile.counters.len());
        for counter in &profile.counters {
            counter_selectors.push((counter.name.clone(), compile(&counter.label_selector)?));
        }

        Ok(Self {
            name_selectors,
            counter_selectors,
            price_selector: compile(&profile.price_selector)?,
            anchor_selector: compile("a")?,
            origin: profile.origin.clone(),
            price_min: profile.price_min,
            price_max: profile.price_max,
            price_cap: profile.price_cap,
        })
    }

    /// Parses one card fragment into a salon record.
    ///
    /// Returns `None` when no name-bearing element is found or the name is
    /// shorter than two characters - the fragment is simply not a salon card.
    pub fn parse_card(&self, card: ElementRef) -> Option<SalonRecord> {
        // Ordered name strategies, first hit wins
        let name_element = self
            .name_selectors
            .iter()
            .find_map(|selector| card.select(selector).next())?;

        let name = element_text(name_element);
        if name.chars().count() < 2 {
            return None;
        }

        let url = name_element
            .value()
            .attr("href")
            .filter(|href| !href.is_empty())
            .map(|href| self.absolute_url(href));

        let mut record = SalonRecord::new(name, url);

        for (counter_name, label_selector) in &self.counter_selectors {
            let count = self.extract_counter(card, label_selector).unwrap_or(0);
            record.counters.insert(counter_name.clone(), count);
        }

        record.prices = card
            .select(&self.price_selector)
            .filter_map(|element| number::extract_number(&element_text(element)))
            .filter(|price| (self.price_min..=self.price_max).contains(price))
            .take(self.price_cap)
            .collect();

        Some(record)
    }

    /// Prefixes the site origin when the extracted link is not absolute
    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", self.origin, href)
        }
    }

    /// Reads a labeled counter: label element, next `dd` sibling, anchor text
    fn extract_counter(&self, card: ElementRef, label_selector: &Selector) -> Option<u32> {
        let label = card.select(label_selector).next()?;
        let value_cell = label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == "dd")?;
        let anchor = value_cell.select(&self.anchor_selector).next()?;
        number::extract_number(&element_text(anchor))
    }
}

/// Parses one fetched listing page into title, continuation flag and cards
pub struct PageParser {
    title_selector: Selector,
    card_selector: Selector,
    next_marker_selector: Selector,
    title_suffix: String,
    cards: CardExtractor,
}

impl PageParser {
    /// Compiles the page-level selectors from a site profile
    pub fn new(profile: &SiteProfile) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            title_selector: compile("title")?,
            card_selector: compile(&profile.card_selector)?,
            next_marker_selector: compile(&profile.next_marker_selector)?,
            title_suffix: profile.title_suffix.clone(),
            cards: CardExtractor::new(profile)?,
        })
    }

    /// Parses a page's raw markup.
    ///
    /// A page with zero extractable cards is valid and yields an empty item
    /// list; the harvest loop treats that as a termination signal.
    pub fn parse_page(&self, html: &str) -> PageResult {
        let doc = Html::parse_document(html);

        let title = doc
            .select(&self.title_selector)
            .next()
            .map(|element| element.text().collect::<String>())
            .unwrap_or_default()
            .replace(&self.title_suffix, "")
            .trim()
            .to_string();

        let has_next = doc.select(&self.next_marker_selector).next().is_some();

        let items: Vec<SalonRecord> = doc
            .select(&self.card_selector)
            .filter_map(|card| self.cards.parse_card(card))
            .collect();

        ::log::debug!("Found {} salon cards", items.len());

        PageResult {
            title,
            has_next,
            items,
        }
    }
}
