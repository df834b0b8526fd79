//! Ranking scores for the product feed.
//!
//! Two formulas live here and every caller (feed sort, popularity
//! analytics) goes through them:
//!
//! - **Trending score**: `upvotes / (hours_since_creation + 2) ^ 1.5`
//! - **Engagement score**:
//!   `(views * 0.3 + upvotes * 0.5 + comments * 0.2) * recency_multiplier`,
//!   where the multiplier is 2 for products at most 7 days old.
//!
//! `now` is always a parameter. A batch is scored against one instant so
//! relative order inside a request cannot drift.

use catalog::Product;
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;

pub const VIEW_WEIGHT: f64 = 0.3;
pub const UPVOTE_WEIGHT: f64 = 0.5;
pub const COMMENT_WEIGHT: f64 = 0.2;

/// Products this young get `RECENT_MULTIPLIER` on their engagement score.
pub const RECENT_WINDOW_DAYS: i64 = 7;
pub const RECENT_MULTIPLIER: f64 = 2.0;

/// Exponent applied to the age term of the trending score.
pub const TRENDING_GRAVITY: f64 = 1.5;
/// Added to the age in hours; keeps the divisor at or above `2^1.5`.
pub const TRENDING_AGE_OFFSET_HOURS: f64 = 2.0;

/// Engagement counters used by the engagement score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementSignals {
    pub views: u64,
    pub upvotes: u64,
    pub comments: u64,
}

/// Anything the score calculator can rank.
pub trait Scorable {
    /// Final tie-break key.
    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn signals(&self) -> EngagementSignals;
}

impl Scorable for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn signals(&self) -> EngagementSignals {
        EngagementSignals {
            views: self.views,
            upvotes: self.upvotes,
            comments: self.comment_count,
        }
    }
}

/// An item paired with the score it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<T> {
    pub item: T,
    pub score: f64,
}

/// Age in fractional hours. Timestamps in the future count as age 0.
pub fn hours_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds() as f64;
    (millis / 3_600_000.0).max(0.0)
}

/// Decay-based score for the feed's Trending sort.
pub fn trending_score(upvotes: u64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if upvotes == 0 {
        return 0.0;
    }
    let age = hours_since(created_at, now);
    upvotes as f64 / (age + TRENDING_AGE_OFFSET_HOURS).powf(TRENDING_GRAVITY)
}

/// 2 for products created within the last `RECENT_WINDOW_DAYS` days
/// (inclusive), 1 otherwise.
pub fn recency_multiplier(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if now - created_at <= Duration::days(RECENT_WINDOW_DAYS) {
        RECENT_MULTIPLIER
    } else {
        1.0
    }
}

/// Recency-weighted engagement score for popularity listings.
pub fn engagement_score(
    signals: &EngagementSignals,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let base = signals.views as f64 * VIEW_WEIGHT
        + signals.upvotes as f64 * UPVOTE_WEIGHT
        + signals.comments as f64 * COMMENT_WEIGHT;
    base * recency_multiplier(created_at, now)
}

/// Order by score desc, then newest first, then id.
///
/// Total over every input, so the result never depends on input order
/// or on how rayon split the work.
pub fn compare_scored<T: Scorable>(a: &ScoredItem<T>, b: &ScoredItem<T>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.item.created_at().cmp(&a.item.created_at()))
        .then_with(|| a.item.id().cmp(b.item.id()))
}

/// Score every item with `score_fn` in parallel and sort with `compare_scored`.
pub fn rank_by<T, F>(items: Vec<T>, score_fn: F) -> Vec<ScoredItem<T>>
where
    T: Scorable + Send,
    F: Fn(&T) -> f64 + Sync + Send,
{
    let mut scored: Vec<ScoredItem<T>> = items
        .into_par_iter()
        .map(|item| {
            let score = score_fn(&item);
            ScoredItem { item, score }
        })
        .collect();

    scored.par_sort_by(compare_scored);
    scored
}

/// Rank a batch by trending score, all against the same `now`.
pub fn rank_by_trending<T>(items: Vec<T>, now: DateTime<Utc>) -> Vec<ScoredItem<T>>
where
    T: Scorable + Send,
{
    rank_by(items, move |item| {
        trending_score(item.signals().upvotes, item.created_at(), now)
    })
}

/// Rank a batch by engagement score, all against the same `now`.
pub fn rank_by_engagement<T>(items: Vec<T>, now: DateTime<Utc>) -> Vec<ScoredItem<T>>
where
    T: Scorable + Send,
{
    rank_by(items, move |item| {
        engagement_score(&item.signals(), item.created_at(), now)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EPSILON: f64 = 1e-9;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_trending_score_at_age_zero() {
        let score = trending_score(10, now(), now());
        assert!((score - 10.0 / 2f64.powf(1.5)).abs() < EPSILON);
        assert!((score - 3.5355).abs() < 1e-4);
    }

    #[test]
    fn test_trending_score_zero_upvotes() {
        assert_eq!(trending_score(0, now(), now()), 0.0);
        assert_eq!(trending_score(0, now() - Duration::days(400), now()), 0.0);
    }

    #[test]
    fn test_trending_score_decays_with_age() {
        let fresh = trending_score(50, now() - Duration::hours(1), now());
        let day_old = trending_score(50, now() - Duration::hours(24), now());
        let week_old = trending_score(50, now() - Duration::days(7), now());

        assert!(fresh > day_old);
        assert!(day_old > week_old);

        // 50 / (24 + 2)^1.5
        assert!((day_old - 50.0 / 26f64.powf(1.5)).abs() < EPSILON);
    }

    #[test]
    fn test_trending_score_future_timestamp_treated_as_new() {
        let skewed = trending_score(10, now() + Duration::hours(3), now());
        let fresh = trending_score(10, now(), now());
        assert_eq!(skewed, fresh);
        assert!(skewed.is_finite());
    }

    #[test]
    fn test_hours_since_is_fractional() {
        let created = now() - Duration::minutes(90);
        assert!((hours_since(created, now()) - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_engagement_recency_boundary() {
        let signals = EngagementSignals { views: 10, upvotes: 10, comments: 10 };

        let old = now() - Duration::days(7) - Duration::seconds(1);
        let recent = now() - Duration::days(6) - Duration::hours(23);

        assert!((engagement_score(&signals, old, now()) - 10.0).abs() < EPSILON);
        assert!((engagement_score(&signals, recent, now()) - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_engagement_exactly_seven_days_is_recent() {
        let created = now() - Duration::days(7);
        assert_eq!(recency_multiplier(created, now()), RECENT_MULTIPLIER);
    }

    #[test]
    fn test_engagement_weights() {
        let signals = EngagementSignals { views: 100, upvotes: 0, comments: 0 };
        let old = now() - Duration::days(30);
        assert!((engagement_score(&signals, old, now()) - 30.0).abs() < EPSILON);

        let signals = EngagementSignals { views: 0, upvotes: 0, comments: 0 };
        assert_eq!(engagement_score(&signals, now(), now()), 0.0);
    }

    #[test]
    fn test_scores_are_reproducible() {
        let created = now() - Duration::seconds(123_457);
        let a = trending_score(77, created, now());
        let b = trending_score(77, created, now());
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_rank_by_trending_orders_and_breaks_ties() {
        let items = vec![
            Product::new("old-popular", "old", now() - Duration::days(3)).with_upvotes(100),
            Product::new("fresh", "fresh", now() - Duration::hours(1)).with_upvotes(20),
            Product::new("zero-b", "zb", now() - Duration::hours(5)),
            Product::new("zero-a", "za", now() - Duration::hours(5)),
            Product::new("zero-new", "zn", now() - Duration::hours(2)),
        ];

        let ranked = rank_by_trending(items, now());
        let ids: Vec<&str> = ranked.iter().map(|s| s.item.id.as_str()).collect();

        // fresh: 20 / 3^1.5 ≈ 3.85; old-popular: 100 / 74^1.5 ≈ 0.157
        // zero scores tie: newest first, then id
        assert_eq!(ids, vec!["fresh", "old-popular", "zero-new", "zero-a", "zero-b"]);
    }

    #[test]
    fn test_rank_is_independent_of_input_order() {
        let build = || {
            (0..200)
                .map(|i| {
                    Product::new(format!("p{:03}", i), "p", now() - Duration::minutes(i * 37 % 900))
                        .with_upvotes((i as u64 * 7) % 13)
                })
                .collect::<Vec<_>>()
        };

        let forward = rank_by_trending(build(), now());
        let mut reversed_input = build();
        reversed_input.reverse();
        let backward = rank_by_trending(reversed_input, now());

        let forward_ids: Vec<_> = forward.iter().map(|s| s.item.id.clone()).collect();
        let backward_ids: Vec<_> = backward.iter().map(|s| s.item.id.clone()).collect();
        assert_eq!(forward_ids, backward_ids);
    }

    #[test]
    fn test_rank_by_engagement_prefers_recent() {
        let signals_views = 100;
        let items = vec![
            Product::new("old", "old", now() - Duration::days(20)).with_views(signals_views),
            Product::new("new", "new", now() - Duration::days(2)).with_views(signals_views),
        ];

        let ranked = rank_by_engagement(items, now());
        assert_eq!(ranked[0].item.id, "new");
        assert!((ranked[0].score - 60.0).abs() < EPSILON);
        assert!((ranked[1].score - 30.0).abs() < EPSILON);
    }
}
