//! Canonical query strings for feed links.

use crate::params::{DateRange, SortMode};
use catalog::CategoryId;
use std::fmt::Write as _;

/// Partial filter descriptor used to build links.
///
/// `None` and the default value serialize the same way: both are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub category: Option<CategoryId>,
    pub sort: Option<SortMode>,
    pub date: Option<DateRange>,
    pub page: Option<u32>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch sort mode. Goes back to page 1 if the mode changed.
    pub fn with_sort(mut self, sort: SortMode) -> Self {
        if self.sort.unwrap_or_default() != sort {
            self.page = None;
        }
        self.sort = Some(sort);
        self
    }

    /// Switch date range. Goes back to page 1 if the range changed.
    pub fn with_date(mut self, date: DateRange) -> Self {
        if self.date.unwrap_or_default() != date {
            self.page = None;
        }
        self.date = Some(date);
        self
    }

    /// Switch category. Goes back to page 1 if the category changed.
    pub fn with_category(mut self, category: Option<CategoryId>) -> Self {
        let category = category.filter(|c| !c.trim().is_empty());
        if self.category.as_deref().filter(|c| !c.trim().is_empty()) != category.as_deref() {
            self.page = None;
        }
        self.category = category;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn to_query_string(&self) -> String {
        build_query_string(self)
    }
}

/// Serialize `params` in the fixed order `category, sort, date, page`.
///
/// Defaults are omitted, so equivalent descriptors produce identical
/// strings. No leading `?`; empty when everything is default.
pub fn build_query_string(params: &QueryParams) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(4);

    if let Some(category) = params.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        pairs.push(("category", urlencoding::encode(category).into_owned()));
    }
    if let Some(sort) = params.sort.filter(|s| *s != SortMode::default()) {
        pairs.push(("sort", sort.as_token().to_string()));
    }
    if let Some(date) = params.date.filter(|d| *d != DateRange::default()) {
        pairs.push(("date", date.as_token().to_string()));
    }
    if let Some(page) = params.page.filter(|p| *p > 1) {
        pairs.push(("page", page.to_string()));
    }

    let mut query = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            query.push('&');
        }
        let _ = write!(query, "{}={}", key, value);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_defaults_is_empty() {
        assert_eq!(build_query_string(&QueryParams::new()), "");

        let explicit = QueryParams {
            category: Some(String::new()),
            sort: Some(SortMode::Top),
            date: Some(DateRange::AllTime),
            page: Some(1),
        };
        assert_eq!(build_query_string(&explicit), "");
    }

    #[test]
    fn test_trending_page_two() {
        let params = QueryParams::new().with_sort(SortMode::Trending).with_page(2);
        let query = build_query_string(&params);

        assert!(query.contains("sort=trending"));
        assert!(query.contains("page=2"));
        assert!(!query.contains("date="));
        assert_eq!(query, "sort=trending&page=2");
    }

    #[test]
    fn test_fixed_order_and_encoding() {
        let params = QueryParams {
            category: Some("dev tools&more".into()),
            sort: Some(SortMode::Discussed),
            date: Some(DateRange::ThisWeek),
            page: Some(7),
        };

        assert_eq!(
            build_query_string(&params),
            "category=dev%20tools%26more&sort=discussed&date=week&page=7"
        );
    }

    #[test]
    fn test_changing_sort_resets_page() {
        let params = QueryParams::new().with_page(4).with_sort(SortMode::New);
        assert_eq!(params.page, None);
        assert_eq!(build_query_string(&params), "sort=new");
    }

    #[test]
    fn test_same_sort_keeps_page() {
        let params = QueryParams::new()
            .with_sort(SortMode::New)
            .with_page(4)
            .with_sort(SortMode::New);
        assert_eq!(params.page, Some(4));
    }

    #[test]
    fn test_default_sort_on_empty_params_keeps_page() {
        let params = QueryParams::new().with_page(3).with_sort(SortMode::Top);
        assert_eq!(params.page, Some(3));
    }

    #[test]
    fn test_changing_date_resets_page() {
        let params = QueryParams::new().with_page(2).with_date(DateRange::Today);
        assert_eq!(build_query_string(&params), "date=today");
    }

    #[test]
    fn test_changing_category_resets_page() {
        let params = QueryParams::new()
            .with_category(Some("ai".into()))
            .with_page(5)
            .with_category(Some("games".into()));
        assert_eq!(build_query_string(&params), "category=games");

        let cleared = QueryParams::new()
            .with_category(Some("ai".into()))
            .with_page(5)
            .with_category(None);
        assert_eq!(build_query_string(&cleared), "");
    }
}
