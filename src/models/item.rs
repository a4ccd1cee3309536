//! Product item types and identifiers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a product item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Release lifecycle state for a product drop.
///
/// Supplied by the enrichment layer as a raw string; anything the parser
/// does not recognize is treated as [`ReleaseState::Live`] after a logged
/// warning, and a missing value defaults to `Live` silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseState {
    /// Announced but not yet purchasable.
    Upcoming,
    /// Purchasable now.
    #[default]
    Live,
}

impl ReleaseState {
    /// Returns all release state variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Upcoming, Self::Live]
    }

    /// Returns the state as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
        }
    }

    /// Parses a release state from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Some(Self::Upcoming),
            "live" => Some(Self::Live),
            _ => None,
        }
    }

    /// Resolves a raw enricher value into a state.
    ///
    /// - `None` defaults to `Live` (unannotated listings are assumed
    ///   purchasable)
    /// - Unrecognized values log a warning and resolve to `Live`
    ///
    /// Never fails.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Live,
            Some(s) => Self::parse(s).unwrap_or_else(|| {
                tracing::warn!(
                    release_state = %s,
                    "Unrecognized release state, treating as live"
                );
                Self::Live
            }),
        }
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stock availability reported by the originating store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Only a few units remain.
    Low,
    /// Normally stocked.
    InStock,
    /// Sold out at the source.
    OutOfStock,
    /// No stock signal available.
    #[default]
    Unknown,
}

impl StockStatus {
    /// Returns the status as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Unknown => "unknown",
        }
    }

    /// Resolves a raw store value into a status. Never fails.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(s) = raw else {
            return Self::Unknown;
        };
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "low" | "low_stock" | "limited_stock" => Self::Low,
            "in_stock" | "instock" | "available" => Self::InStock,
            "out_of_stock" | "oos" | "sold_out" => Self::OutOfStock,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate product listing flowing through the pipeline.
///
/// Every field except `id` is optional with a documented default, so a
/// sparse upstream payload deserializes cleanly instead of silently
/// falling back on typo'd keys. Missing fields degrade inside the dedupe
/// store and scorer; they never abort admission.
///
/// # Example
///
/// ```rust
/// use dropgate::{ProductItem, ReleaseState};
///
/// let item = ProductItem::new("drop-1")
///     .with_title("Jordan 1 - Drops Thursday")
///     .with_brand("Jordan")
///     .with_limited_edition(true)
///     .with_release_state("upcoming");
///
/// assert_eq!(item.effective_release_state(), ReleaseState::Upcoming);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    /// Unique identifier assigned upstream.
    pub id: ItemId,
    /// Listing title as scraped or posted.
    #[serde(default)]
    pub title: Option<String>,
    /// Product or listing URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Brand name, free-form.
    #[serde(default)]
    pub brand: Option<String>,
    /// Product category (e.g. "sneakers", "electronics").
    #[serde(default)]
    pub category: Option<String>,
    /// Retailer the listing was found at.
    #[serde(default)]
    pub store: Option<String>,
    /// Listed price in the source currency.
    #[serde(default)]
    pub price: Option<f64>,
    /// Whether this is a limited-edition drop. Defaults to `false`.
    #[serde(default)]
    pub limited_edition: bool,
    /// Discovery source (e.g. "twitter", "reddit", "amazon-movers").
    #[serde(default)]
    pub source: Option<String>,
    /// Release date string from the enricher.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Raw release state from the enricher. Absent means live.
    #[serde(default)]
    pub release_state: Option<String>,
    /// Raw stock status from the store.
    #[serde(default)]
    pub stock_status: Option<String>,
    /// Hype score in [0, 100] from upstream signal aggregation.
    #[serde(default)]
    pub hype_score: Option<f64>,
    /// Source-specific extras (engagement counts, upvotes, velocity).
    #[serde(default)]
    pub meta: HashMap<String, serde_json::Value>,
}

impl ProductItem {
    /// Creates a minimal item with only an ID.
    #[must_use]
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            url: None,
            brand: None,
            category: None,
            store: None,
            price: None,
            limited_edition: false,
            source: None,
            release_date: None,
            release_state: None,
            stock_status: None,
            hype_score: None,
            meta: HashMap::new(),
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the brand.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the store.
    #[must_use]
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Sets the price.
    #[must_use]
    pub const fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the limited-edition flag.
    #[must_use]
    pub const fn with_limited_edition(mut self, limited: bool) -> Self {
        self.limited_edition = limited;
        self
    }

    /// Sets the discovery source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the release date string.
    #[must_use]
    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    /// Sets the raw release state.
    #[must_use]
    pub fn with_release_state(mut self, state: impl Into<String>) -> Self {
        self.release_state = Some(state.into());
        self
    }

    /// Sets the raw stock status.
    #[must_use]
    pub fn with_stock_status(mut self, status: impl Into<String>) -> Self {
        self.stock_status = Some(status.into());
        self
    }

    /// Sets the hype score.
    #[must_use]
    pub const fn with_hype_score(mut self, hype: f64) -> Self {
        self.hype_score = Some(hype);
        self
    }

    /// Sets a meta entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Resolves the raw release state into a typed state.
    ///
    /// Missing defaults to live; unrecognized values warn and default to
    /// live.
    #[must_use]
    pub fn effective_release_state(&self) -> ReleaseState {
        ReleaseState::from_raw(self.release_state.as_deref())
    }

    /// Resolves the raw stock status into a typed status.
    #[must_use]
    pub fn effective_stock_status(&self) -> StockStatus {
        StockStatus::from_raw(self.stock_status.as_deref())
    }

    /// Reads a numeric meta value, if present and numeric.
    #[must_use]
    pub fn meta_f64(&self, key: &str) -> Option<f64> {
        self.meta.get(key).and_then(serde_json::Value::as_f64)
    }
}
