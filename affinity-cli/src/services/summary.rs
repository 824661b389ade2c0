//! Reviewed/unreviewed cross-tab by profile and category

use serde::Serialize;

use super::deal::Deal;
use crate::config::FieldRoles;

/// Bucket for values outside the configured enumerations
pub const OTHER: &str = "Other";
/// Label of the aggregate row and column
pub const TOTAL: &str = "TOTAL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewCounts {
    pub reviewed: usize,
    pub unreviewed: usize,
}

impl ReviewCounts {
    pub fn total(&self) -> usize {
        self.reviewed + self.unreviewed
    }

    fn record(&mut self, reviewed: bool) {
        if reviewed {
            self.reviewed += 1;
        } else {
            self.unreviewed += 1;
        }
    }
}

/// One rendered row: a profile (or `TOTAL`) across every category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub profile: String,
    pub cells: Vec<(String, ReviewCounts)>,
    pub total: ReviewCounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    /// Configured profiles followed by `Other`
    profiles: Vec<String>,
    /// Configured categories followed by `Other`
    categories: Vec<String>,
    /// `grid[profile][category]`; the extra last row is `TOTAL`
    grid: Vec<Vec<ReviewCounts>>,
    /// The `TOTAL` column, one per profile row plus the grand total
    totals: Vec<ReviewCounts>,
}

fn with_other(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values.iter().filter(|v| *v != OTHER).cloned().collect();
    out.push(OTHER.to_string());
    out
}

fn classify(value: Option<String>, buckets: &[String]) -> usize {
    let other = buckets.len() - 1;
    value
        .and_then(|v| buckets[..other].iter().position(|b| *b == v))
        .unwrap_or(other)
}

/// Count every deal once into its profile×category cell, the `TOTAL` row
/// and the `TOTAL` column
pub fn summarize(
    deals: &[Deal],
    roles: &FieldRoles,
    profiles: &[String],
    categories: &[String],
) -> StatusSummary {
    let profiles = with_other(profiles);
    let categories = with_other(categories);
    let total_row = profiles.len();

    let mut grid = vec![vec![ReviewCounts::default(); categories.len()]; profiles.len() + 1];
    let mut totals = vec![ReviewCounts::default(); profiles.len() + 1];

    for deal in deals {
        let p = classify(deal.text(&roles.profile), &profiles);
        let c = classify(deal.text(&roles.category), &categories);
        let reviewed = deal.is_reviewed(roles);

        grid[p][c].record(reviewed);
        grid[total_row][c].record(reviewed);
        totals[p].record(reviewed);
        totals[total_row].record(reviewed);
    }

    StatusSummary {
        profiles,
        categories,
        grid,
        totals,
    }
}

impl StatusSummary {
    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn profile_index(&self, profile: &str) -> Option<usize> {
        if profile == TOTAL {
            Some(self.profiles.len())
        } else {
            self.profiles.iter().position(|p| p == profile)
        }
    }

    /// Counts for a cell; `profile` may be `TOTAL`
    pub fn cell(&self, profile: &str, category: &str) -> ReviewCounts {
        let c = self.categories.iter().position(|c| c == category);
        match (self.profile_index(profile), c) {
            (Some(p), Some(c)) => self.grid[p][c],
            _ => ReviewCounts::default(),
        }
    }

    /// The `TOTAL` column for a profile row (or `TOTAL` for the grand total)
    pub fn profile_total(&self, profile: &str) -> ReviewCounts {
        self.profile_index(profile)
            .map(|p| self.totals[p])
            .unwrap_or_default()
    }

    pub fn grand_total(&self) -> ReviewCounts {
        self.totals[self.profiles.len()]
    }

    /// Profile rows followed by the `TOTAL` row
    pub fn rows(&self) -> Vec<SummaryRow> {
        self.profiles
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(TOTAL))
            .map(|profile| SummaryRow {
                profile: profile.to_string(),
                cells: self
                    .categories
                    .iter()
                    .map(|c| (c.clone(), self.cell(profile, c)))
                    .collect(),
                total: self.profile_total(profile),
            })
            .collect()
    }
}
