//! Field extraction pipeline
//!
//! Each field is resolved through an ordered chain of strategies; the chain
//! short-circuits at the first strategy that yields anything. A failing DOM
//! call degrades only the field it was serving: a record is produced for
//! every successfully navigated page, even if every field comes back empty.
//!
//! Price candidates are reduced by minimum: product pages routinely list
//! several variant/tier prices and the lowest one is the advertised
//! "from" price.

use crate::render::RenderSession;
use crate::types::{ProductRecord, RecordStatus, Stock, WorkItem};
use chrono::Utc;
use regex::Regex;

/// Currency-prefixed numeric pattern ("Rp 1.234.000", "Rp8,500", ...)
const PRICE_PATTERN: &str = r"Rp\s?[\d.,]+";

/// Structured metadata title field
const META_TITLE_SELECTOR: &str = r#"meta[property="og:title"]"#;

/// Structured metadata description field
const META_DESCRIPTION_SELECTOR: &str = r#"meta[property="og:description"]"#;

/// Heading confined to the main content region, then anywhere as fallback
const HEADING_SELECTORS: [&str; 2] = ["#main-content h1", "h1"];

/// Variant selectors exposing their price as a numeric attribute
const VARIANT_PRICE_SELECTOR: &str = r#"input[type="radio"][data-price]"#;

/// Attribute carrying the variant price
const VARIANT_PRICE_ATTR: &str = "data-price";

/// Purchase-control element inspected for stock markers
const BUY_BOX_SELECTOR: &str = r#"[data-testid="btn-buy"]"#;

/// Heading candidates containing any of these are site chrome, not titles
const CHROME_MARKERS: [&str; 2] = ["Masuk", "Login"];

/// Lowercased markers meaning the purchase control is disabled
const SOLD_OUT_MARKERS: [&str; 2] = ["stok habis", "sold out"];

/// Lowercased markers meaning the item can be added to a cart
const ADD_TO_CART_MARKERS: [&str; 2] = ["keranjang", "add to cart"];

/// Prices at or below this are parsing noise (fragments of dates, counters)
const PRICE_FLOOR: u64 = 100;

/// Prices at or above this are parsing noise (phone numbers, IDs)
const PRICE_CEILING: u64 = 100_000_000;

/// Produces a best-effort [`ProductRecord`] from a rendered page
pub struct Extractor {
    price_re: Regex,
}

impl Extractor {
    /// Build an extractor with the compiled currency pattern
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            price_re: Regex::new(PRICE_PATTERN).expect("static price pattern compiles"),
        }
    }

    /// Extract one record from the currently rendered page.
    ///
    /// Never fails: missing fields stay `None`/`Unknown` and the status is
    /// derived from what was found. Total navigation failure is the caller's
    /// concern and never reaches this function.
    pub async fn extract(&self, page: &dyn RenderSession, url: &WorkItem) -> ProductRecord {
        let product_name = self.extract_name(page).await;
        let cheapest_price = self.extract_price(page).await;
        let stock = self.extract_stock(page).await;

        let status = if cheapest_price.is_some() {
            RecordStatus::Success
        } else if product_name.is_some() {
            RecordStatus::Partial
        } else {
            RecordStatus::Failed
        };

        match status {
            RecordStatus::Success => tracing::info!(
                url = %url,
                name = product_name.as_deref().unwrap_or("<none>"),
                price = cheapest_price.unwrap_or_default(),
                "extracted record"
            ),
            RecordStatus::Partial => {
                tracing::warn!(url = %url, "no valid price found, name only")
            }
            RecordStatus::Failed => tracing::warn!(url = %url, "no extractable data found"),
        }

        ProductRecord {
            url: url.clone(),
            product_name,
            cheapest_price,
            stock,
            status,
            observed_at: Utc::now(),
        }
    }

    /// Name chain: metadata title, content heading, document title
    async fn extract_name(&self, page: &dyn RenderSession) -> Option<String> {
        if let Some(name) = self
            .meta_content(page, META_TITLE_SELECTOR)
            .await
            .and_then(|raw| clean_title(&raw))
        {
            return Some(name);
        }

        if let Some(name) = self.heading_text(page).await {
            return Some(name);
        }

        self.element_text(page, "title")
            .await
            .and_then(|raw| clean_title(&raw))
    }

    /// First non-empty heading in the content region, skipping chrome
    async fn heading_text(&self, page: &dyn RenderSession) -> Option<String> {
        for selector in HEADING_SELECTORS {
            let handles = match page.query_all(selector).await {
                Ok(handles) => handles,
                Err(e) => {
                    tracing::warn!(selector, error = %e, "heading query failed");
                    continue;
                }
            };
            for handle in handles {
                let text = match page.text(handle).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(selector, error = %e, "heading text read failed");
                        continue;
                    }
                };
                let text = text.trim();
                if text.is_empty() || CHROME_MARKERS.iter().any(|m| text.contains(m)) {
                    continue;
                }
                return Some(text.to_string());
            }
        }
        None
    }

    /// Price chain: metadata description, variant attributes, full-page scan.
    /// The first strategy yielding at least one candidate wins; the result is
    /// the minimum of that strategy's candidates.
    async fn extract_price(&self, page: &dyn RenderSession) -> Option<u64> {
        let candidates = {
            let meta = self.meta_description_prices(page).await;
            if !meta.is_empty() {
                meta
            } else {
                let variants = self.variant_prices(page).await;
                if !variants.is_empty() {
                    variants
                } else {
                    self.body_prices(page).await
                }
            }
        };
        candidates.into_iter().min()
    }

    async fn meta_description_prices(&self, page: &dyn RenderSession) -> Vec<u64> {
        match self.meta_content(page, META_DESCRIPTION_SELECTOR).await {
            Some(content) => self.scan_prices(&content, false),
            None => Vec::new(),
        }
    }

    async fn variant_prices(&self, page: &dyn RenderSession) -> Vec<u64> {
        let handles = match page.query_all(VARIANT_PRICE_SELECTOR).await {
            Ok(handles) => handles,
            Err(e) => {
                tracing::warn!(error = %e, "variant price query failed");
                return Vec::new();
            }
        };

        let mut prices = Vec::new();
        for handle in handles {
            match page.attribute(handle, VARIANT_PRICE_ATTR).await {
                Ok(Some(raw)) => {
                    if let Some(value) = parse_minor_units(&raw) {
                        prices.push(value);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "variant price attribute read failed"),
            }
        }
        prices
    }

    async fn body_prices(&self, page: &dyn RenderSession) -> Vec<u64> {
        match self.element_text(page, "body").await {
            Some(text) => self.scan_prices(&text, true),
            None => Vec::new(),
        }
    }

    /// Collect currency-pattern matches from free text, digits-only
    /// normalized. `plausible_only` applies the noise-range filter used for
    /// full-page scans.
    fn scan_prices(&self, text: &str, plausible_only: bool) -> Vec<u64> {
        self.price_re
            .find_iter(text)
            .filter_map(|m| parse_minor_units(m.as_str()))
            .filter(|value| !plausible_only || (*value > PRICE_FLOOR && *value < PRICE_CEILING))
            .collect()
    }

    /// Stock: single deterministic check of the purchase control
    async fn extract_stock(&self, page: &dyn RenderSession) -> Stock {
        let Some(text) = self.element_text(page, BUY_BOX_SELECTOR).await else {
            return Stock::Unknown;
        };
        let text = text.to_lowercase();
        if SOLD_OUT_MARKERS.iter().any(|m| text.contains(m)) {
            Stock::SoldOut
        } else if ADD_TO_CART_MARKERS.iter().any(|m| text.contains(m)) {
            Stock::InStock
        } else {
            Stock::Unknown
        }
    }

    async fn meta_content(&self, page: &dyn RenderSession, selector: &str) -> Option<String> {
        match page.query_first(selector).await {
            Ok(Some(handle)) => match page.attribute(handle, "content").await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(selector, error = %e, "attribute read failed");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(selector, error = %e, "query failed");
                None
            }
        }
    }

    async fn element_text(&self, page: &dyn RenderSession, selector: &str) -> Option<String> {
        match page.query_first(selector).await {
            Ok(Some(handle)) => match page.text(handle).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(selector, error = %e, "text read failed");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(selector, error = %e, "query failed");
                None
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate a title at the first `|` (site-name suffix) and normalize
/// whitespace; empty results are discarded
fn clean_title(raw: &str) -> Option<String> {
    let base = raw.split('|').next().unwrap_or(raw);
    let normalized = base.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Digits-only normalization of a price string; empty or overflowing
/// candidates are discarded
fn parse_minor_units(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
