//! Filter parameter resolution.
//!
//! Turns raw, possibly hostile, request parameters into a fully resolved
//! `FilterDescriptor`. Nothing here fails: unknown or malformed values
//! fall back to their defaults.

use crate::query_string::QueryParams;
use catalog::CategoryId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use tracing::debug;

/// Page size used when a call site doesn't pick one.
pub const DEFAULT_PAGE_SIZE: usize = 12;

const fn default_page_size() -> NonZeroUsize {
    match NonZeroUsize::new(DEFAULT_PAGE_SIZE) {
        Some(size) => size,
        None => NonZeroUsize::MIN,
    }
}

// =============================================================================
// Sort mode and date range
// =============================================================================

/// How the feed is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Most upvoted first
    #[default]
    Top,
    /// Newest first
    New,
    /// Most commented first
    Discussed,
    /// Highest trending score first
    Trending,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [SortMode::Top, SortMode::New, SortMode::Discussed, SortMode::Trending];

    /// Parse a URL token (`top`, `new`, `discussed`, `trending`).
    ///
    /// ASCII case-insensitive; surrounding whitespace is ignored.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_token().eq_ignore_ascii_case(token))
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            SortMode::Top => "top",
            SortMode::New => "new",
            SortMode::Discussed => "discussed",
            SortMode::Trending => "trending",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Creation-time window applied to the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    #[serde(rename = "all")]
    AllTime,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "week")]
    ThisWeek,
    #[serde(rename = "month")]
    ThisMonth,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::AllTime,
        DateRange::Today,
        DateRange::ThisWeek,
        DateRange::ThisMonth,
    ];

    /// Parse a URL token (`all`, `today`, `week`, `month`).
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|range| range.as_token().eq_ignore_ascii_case(token))
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            DateRange::AllTime => "all",
            DateRange::Today => "today",
            DateRange::ThisWeek => "week",
            DateRange::ThisMonth => "month",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

// =============================================================================
// Raw parameters
// =============================================================================

/// Query parameters exactly as they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFilterParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub date: Option<String>,
    pub page: Option<String>,
}

impl RawFilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the known keys from decoded `(key, value)` pairs.
    ///
    /// The first occurrence of a key wins; unknown keys are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "category" => &mut params.category,
                "sort" => &mut params.sort,
                "date" => &mut params.date,
                "page" => &mut params.page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is accepted. Pairs that fail to percent-decode are
    /// dropped.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let key = decode_component(key)?;
                let value = decode_component(value)?;
                Some((key, value))
            });
        Self::from_query_pairs(pairs)
    }
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            debug!("Dropping undecodable query component {:?}: {}", raw, e);
            None
        }
    }
}

// =============================================================================
// Filter descriptor
// =============================================================================

/// Canonical, fully resolved feed filter.
///
/// Immutable: the `with_*` methods return a new descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    category: Option<CategoryId>,
    sort_mode: SortMode,
    date_range: DateRange,
    page: u32,
    page_size: NonZeroUsize,
}

impl FilterDescriptor {
    pub fn new(sort_mode: SortMode, date_range: DateRange) -> Self {
        Self {
            category: None,
            sort_mode,
            date_range,
            page: 1,
            page_size: default_page_size(),
        }
    }

    /// Empty or whitespace-only categories mean "no filter".
    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = normalize_category(category.into());
        self
    }

    /// Pages below 1 become 1.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Number of items before this page. Saturates instead of overflowing.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1).saturating_mul(self.page_size.get() as u64)
    }

    /// Partial descriptor for building links from this page.
    pub fn to_query(&self) -> QueryParams {
        QueryParams {
            category: self.category.clone(),
            sort: Some(self.sort_mode),
            date: Some(self.date_range),
            page: Some(self.page),
        }
    }

    /// Canonical query string for another page of the same filter.
    pub fn page_link(&self, page: u32) -> String {
        self.to_query().with_page(page).to_query_string()
    }
}

impl Default for FilterDescriptor {
    fn default() -> Self {
        Self::new(SortMode::default(), DateRange::default())
    }
}

fn normalize_category(category: String) -> Option<CategoryId> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == category.len() {
        Some(category)
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves raw parameters for one call site's page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterResolver {
    page_size: NonZeroUsize,
}

impl FilterResolver {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Resolve raw parameters. Never fails.
    ///
    /// - `sort`: unknown token -> `Top`
    /// - `date`: unknown token -> `AllTime`
    /// - `page`: unparsable or < 1 -> 1 (no upper bound)
    /// - `category`: passed through; empty means no filter
    pub fn resolve(&self, raw: &RawFilterParams) -> FilterDescriptor {
        let sort_mode = match raw.sort.as_deref() {
            None => SortMode::default(),
            Some(token) => SortMode::from_token(token).unwrap_or_else(|| {
                debug!("Unknown sort token {:?}, using default", token);
                SortMode::default()
            }),
        };

        let date_range = match raw.date.as_deref() {
            None => DateRange::default(),
            Some(token) => DateRange::from_token(token).unwrap_or_else(|| {
                debug!("Unknown date token {:?}, using default", token);
                DateRange::default()
            }),
        };

        let page = match raw.page.as_deref() {
            None => 1,
            Some(token) => parse_page(token).unwrap_or_else(|| {
                debug!("Invalid page {:?}, using 1", token);
                1
            }),
        };

        let category = raw.category.clone().and_then(normalize_category);

        FilterDescriptor {
            category,
            sort_mode,
            date_range,
            page,
            page_size: self.page_size,
        }
    }
}

impl Default for FilterResolver {
    fn default() -> Self {
        Self::new(default_page_size())
    }
}

/// Positive page number, or `None`.
///
/// Values past `u32::MAX` are clamped rather than rejected; they resolve
/// to an empty page downstream.
fn parse_page(token: &str) -> Option<u32> {
    let value: i64 = match token.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            // All-digit strings too long for i64 are still huge, valid pages
            let digits = token.trim();
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return Some(u32::MAX);
            }
            return None;
        }
    };
    if value < 1 {
        None
    } else {
        Some(u32::try_from(value).unwrap_or(u32::MAX))
    }
}

/// Resolve with the default page size.
pub fn resolve_filters(raw: &RawFilterParams) -> FilterDescriptor {
    FilterResolver::default().resolve(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(category: Option<&str>, sort: Option<&str>, date: Option<&str>, page: Option<&str>) -> RawFilterParams {
        RawFilterParams {
            category: category.map(String::from),
            sort: sort.map(String::from),
            date: date.map(String::from),
            page: page.map(String::from),
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let descriptor = resolve_filters(&RawFilterParams::new());

        assert_eq!(descriptor.category(), None);
        assert_eq!(descriptor.sort_mode(), SortMode::Top);
        assert_eq!(descriptor.date_range(), DateRange::AllTime);
        assert_eq!(descriptor.page(), 1);
        assert_eq!(descriptor.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_tokens_fall_back() {
        let descriptor = resolve_filters(&raw(None, Some("bogus"), Some("nonsense"), Some("-5")));

        assert_eq!(descriptor.sort_mode(), SortMode::Top);
        assert_eq!(descriptor.date_range(), DateRange::AllTime);
        assert_eq!(descriptor.page(), 1);
    }

    #[test]
    fn test_recognized_tokens() {
        let descriptor = resolve_filters(&raw(Some("ai"), Some("trending"), Some("week"), Some("3")));

        assert_eq!(descriptor.category(), Some("ai"));
        assert_eq!(descriptor.sort_mode(), SortMode::Trending);
        assert_eq!(descriptor.date_range(), DateRange::ThisWeek);
        assert_eq!(descriptor.page(), 3);
    }

    #[test]
    fn test_tokens_case_insensitive_and_trimmed() {
        let descriptor = resolve_filters(&raw(None, Some(" Discussed "), Some("TODAY"), Some(" 2 ")));

        assert_eq!(descriptor.sort_mode(), SortMode::Discussed);
        assert_eq!(descriptor.date_range(), DateRange::Today);
        assert_eq!(descriptor.page(), 2);
    }

    #[test]
    fn test_page_edge_cases() {
        for bad in ["0", "", "abc", "1.5", "-0", "2e3"] {
            let descriptor = resolve_filters(&raw(None, None, None, Some(bad)));
            assert_eq!(descriptor.page(), 1, "page {:?} should fall back to 1", bad);
        }

        let huge = resolve_filters(&raw(None, None, None, Some("99999999999999999999999")));
        assert_eq!(huge.page(), u32::MAX);

        let big = resolve_filters(&raw(None, None, None, Some("5000000000")));
        assert_eq!(big.page(), u32::MAX);
    }

    #[test]
    fn test_empty_category_means_no_filter() {
        assert_eq!(resolve_filters(&raw(Some(""), None, None, None)).category(), None);
        assert_eq!(resolve_filters(&raw(Some("   "), None, None, None)).category(), None);
        assert_eq!(resolve_filters(&raw(Some(" ai "), None, None, None)).category(), Some("ai"));
    }

    #[test]
    fn test_resolver_page_size() {
        let resolver = FilterResolver::new(NonZeroUsize::new(20).unwrap());
        let descriptor = resolver.resolve(&RawFilterParams::new());
        assert_eq!(descriptor.page_size(), 20);
    }

    #[test]
    fn test_offset() {
        let descriptor = FilterDescriptor::default().with_page(3);
        assert_eq!(descriptor.offset(), 24);

        let last = FilterDescriptor::default().with_page(u32::MAX);
        assert_eq!(last.offset(), (u32::MAX as u64 - 1) * DEFAULT_PAGE_SIZE as u64);
    }

    #[test]
    fn test_with_page_clamps_zero() {
        assert_eq!(FilterDescriptor::default().with_page(0).page(), 1);
    }

    #[test]
    fn test_from_query_str() {
        let params = RawFilterParams::from_query_str("?sort=new&category=dev%20tools&page=4&utm=x&sort=top");

        assert_eq!(params.sort.as_deref(), Some("new"));
        assert_eq!(params.category.as_deref(), Some("dev tools"));
        assert_eq!(params.page.as_deref(), Some("4"));
        assert_eq!(params.date, None);
    }

    #[test]
    fn test_from_query_str_plus_is_space_and_bad_escapes_dropped() {
        let params = RawFilterParams::from_query_str("category=dev+tools&sort=%FF%FE");
        assert_eq!(params.category.as_deref(), Some("dev tools"));
        assert_eq!(params.sort, None);
    }

    #[test]
    fn test_query_str_resolves_end_to_end() {
        let descriptor = resolve_filters(&RawFilterParams::from_query_str("date=month&page=abc"));
        assert_eq!(descriptor.date_range(), DateRange::ThisMonth);
        assert_eq!(descriptor.page(), 1);
    }

    #[test]
    fn test_tokens_roundtrip_display() {
        for mode in SortMode::ALL {
            assert_eq!(SortMode::from_token(&mode.to_string()), Some(mode));
        }
        for range in DateRange::ALL {
            assert_eq!(DateRange::from_token(&range.to_string()), Some(range));
        }
    }
}
