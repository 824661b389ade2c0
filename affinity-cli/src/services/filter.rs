//! Queue filters
//!
//! Four independent selections; a deal is shown only when every active one
//! passes. Equality filters treat a missing field as a mismatch, while the
//! date filter lets deals with a missing or malformed date through.

use chrono::{Duration, NaiveDate};

use super::deal::Deal;
use super::format::parse_date;
use crate::config::FieldRoles;

/// Selection meaning "no restriction"
pub const ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFilter {
    #[default]
    All,
    /// Only deals without a reviewer
    Unreviewed,
}

impl ReviewFilter {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewFilter::All => "All",
            ReviewFilter::Unreviewed => "Not reviewed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ReviewFilter::All => ReviewFilter::Unreviewed,
            ReviewFilter::Unreviewed => ReviewFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    AllTime,
    LastWeek,
    LastMonth,
    LastQuarter,
    LastYear,
}

impl DateRange {
    pub fn label(&self) -> &'static str {
        match self {
            DateRange::AllTime => "All time",
            DateRange::LastWeek => "Last 7 days",
            DateRange::LastMonth => "Last 30 days",
            DateRange::LastQuarter => "Last 90 days",
            DateRange::LastYear => "Last 365 days",
        }
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            DateRange::AllTime => None,
            DateRange::LastWeek => Some(7),
            DateRange::LastMonth => Some(30),
            DateRange::LastQuarter => Some(90),
            DateRange::LastYear => Some(365),
        }
    }

    /// Earliest date that passes, relative to `today`
    pub fn threshold(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|days| today - Duration::days(days))
    }

    pub fn next(self) -> Self {
        match self {
            DateRange::AllTime => DateRange::LastWeek,
            DateRange::LastWeek => DateRange::LastMonth,
            DateRange::LastMonth => DateRange::LastQuarter,
            DateRange::LastQuarter => DateRange::LastYear,
            DateRange::LastYear => DateRange::AllTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealFilter {
    pub profile: String,
    pub category: String,
    pub review: ReviewFilter,
    pub date_range: DateRange,
}

impl Default for DealFilter {
    fn default() -> Self {
        Self {
            profile: ALL.to_string(),
            category: ALL.to_string(),
            review: ReviewFilter::All,
            date_range: DateRange::AllTime,
        }
    }
}

fn equals_or_all(selection: &str, actual: Option<String>) -> bool {
    selection == ALL || actual.as_deref() == Some(selection)
}

impl DealFilter {
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, deal: &Deal, roles: &FieldRoles, today: NaiveDate) -> bool {
        if !equals_or_all(&self.profile, deal.text(&roles.profile)) {
            return false;
        }
        if !equals_or_all(&self.category, deal.text(&roles.category)) {
            return false;
        }
        if self.review == ReviewFilter::Unreviewed && deal.is_reviewed(roles) {
            return false;
        }
        if let Some(threshold) = self.date_range.threshold(today) {
            if let Some(date) = deal.value(&roles.date).and_then(parse_date) {
                return date >= threshold;
            }
        }
        true
    }

    /// Indices into `deals` that pass, in original order
    pub fn apply(&self, deals: &[Deal], roles: &FieldRoles, today: NaiveDate) -> Vec<usize> {
        deals
            .iter()
            .enumerate()
            .filter(|(_, deal)| self.matches(deal, roles, today))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn describe(&self) -> String {
        format!(
            "Profile: {}  Category: {}  Review: {}  Date: {}",
            self.profile,
            self.category,
            self.review.label(),
            self.date_range.label()
        )
    }
}

/// Step through `All` followed by `options`, wrapping at the end
pub fn cycle_selection(current: &str, options: &[String]) -> String {
    let position = options.iter().position(|o| o == current);
    match position {
        None if current == ALL => options.first().cloned().unwrap_or_else(|| ALL.to_string()),
        Some(idx) if idx + 1 < options.len() => options[idx + 1].clone(),
        _ => ALL.to_string(),
    }
}
