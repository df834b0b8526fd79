//! Query descriptors understood by every product store.

use catalog::{CategoryId, Product};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// Constraints pushed down to the store.
///
/// The date bound is inclusive: a product created exactly at
/// `created_after` matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    pub category: Option<CategoryId>,
    pub created_after: Option<DateTime<Utc>>,
}

impl StoreFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_created_after(mut self, bound: DateTime<Utc>) -> Self {
        self.created_after = Some(bound);
        self
    }
}

/// Columns a store can order by natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Upvotes,
    CreatedAt,
    CommentCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl OrderBy {
    pub const fn desc(column: SortColumn) -> Self {
        Self { column, direction: SortDirection::Desc }
    }

    pub const fn asc(column: SortColumn) -> Self {
        Self { column, direction: SortDirection::Asc }
    }

    /// Compare two products under this term.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.column {
            SortColumn::Upvotes => a.upvotes.cmp(&b.upvotes),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            SortColumn::CommentCount => a.comment_count.cmp(&b.comment_count),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = match self.column {
            SortColumn::Upvotes => "upvotes",
            SortColumn::CreatedAt => "created_at",
            SortColumn::CommentCount => "comment_count",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{} {}", column, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_order_by_desc_reverses() {
        let low = Product::new("low", "low", at(1)).with_upvotes(1);
        let high = Product::new("high", "high", at(1)).with_upvotes(9);

        let desc = OrderBy::desc(SortColumn::Upvotes);
        assert_eq!(desc.compare(&high, &low), Ordering::Less);

        let asc = OrderBy::asc(SortColumn::Upvotes);
        assert_eq!(asc.compare(&high, &low), Ordering::Greater);
    }

    #[test]
    fn test_order_by_display() {
        assert_eq!(OrderBy::desc(SortColumn::CommentCount).to_string(), "comment_count desc");
    }
}
