//! Feed engine configuration.
//!
//! Read from the environment at startup. Every value has a default, and a
//! value that is set but malformed is an error rather than a silent fallback.

use ranking::{DayBoundary, DayBoundaryParseError, FilterResolver, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::num::NonZeroUsize;
use thiserror::Error;

pub const PAGE_SIZE_VAR: &str = "HOBBYRIDER_PAGE_SIZE";
pub const DAY_BOUNDARY_VAR: &str = "HOBBYRIDER_DAY_BOUNDARY";
pub const TRENDING_WARN_THRESHOLD_VAR: &str = "HOBBYRIDER_TRENDING_WARN_THRESHOLD";

/// Trending candidate sets larger than this are logged at `warn`.
pub const DEFAULT_TRENDING_WARN_THRESHOLD: usize = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var}: {source}")]
    InvalidDayBoundary {
        var: &'static str,
        #[source]
        source: DayBoundaryParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: NonZeroUsize,
    pub day_boundary: DayBoundary,
    pub trending_warn_threshold: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
            day_boundary: DayBoundary::default(),
            trending_warn_threshold: DEFAULT_TRENDING_WARN_THRESHOLD,
        }
    }
}

impl FeedConfig {
    /// Load from `HOBBYRIDER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    ///
    /// Unset and blank values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(PAGE_SIZE_VAR) {
            config.page_size = value
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::InvalidNumber { var: PAGE_SIZE_VAR, value })?;
        }

        if let Some(value) = get(DAY_BOUNDARY_VAR) {
            config.day_boundary = value
                .parse()
                .map_err(|source| ConfigError::InvalidDayBoundary { var: DAY_BOUNDARY_VAR, source })?;
        }

        if let Some(value) = get(TRENDING_WARN_THRESHOLD_VAR) {
            config.trending_warn_threshold = value.trim().parse().map_err(|_| {
                ConfigError::InvalidNumber { var: TRENDING_WARN_THRESHOLD_VAR, value }
            })?;
        }

        Ok(config)
    }

    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_day_boundary(mut self, day_boundary: DayBoundary) -> Self {
        self.day_boundary = day_boundary;
        self
    }

    pub fn with_trending_warn_threshold(mut self, threshold: usize) -> Self {
        self.trending_warn_threshold = threshold;
        self
    }

    /// Resolver for this configuration's page size.
    pub fn resolver(&self) -> FilterResolver {
        FilterResolver::new(self.page_size)
    }
}
