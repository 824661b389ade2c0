//! Interactive session state
//!
//! Everything the queue screen needs between key presses lives in one
//! [`Session`] value that is owned by the UI loop and passed around
//! explicitly. It holds no network handles, so every transition here is
//! plain synchronous code.

use chrono::NaiveDate;

use crate::config::FieldRoles;
use crate::services::{ActionOutcome, Deal, DealFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Queue,
    Summary,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Queue => "Deals Queue",
            View::Summary => "Status Summary",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            View::Queue => View::Summary,
            View::Summary => View::Queue,
        }
    }

    pub const ALL: [View; 2] = [View::Queue, View::Summary];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl From<&ActionOutcome> for Banner {
    fn from(outcome: &ActionOutcome) -> Self {
        let kind = match outcome {
            ActionOutcome::Success(_) => BannerKind::Success,
            ActionOutcome::Warning(_) => BannerKind::Warning,
            ActionOutcome::Failure(_) => BannerKind::Error,
        };
        Banner {
            kind,
            message: outcome.message().to_string(),
        }
    }
}

/// Popup listing the people a deal can be tracked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonPicker {
    pub visible: bool,
    pub selected: usize,
}

impl PersonPicker {
    pub fn open(&mut self) {
        self.visible = true;
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn next(&mut self, len: usize) {
        self.selected = wrap_index(self.selected, 1, len);
    }

    pub fn previous(&mut self, len: usize) {
        self.selected = wrap_index(self.selected, -1, len);
    }
}

/// Step `current` by `delta` within `0..len`, wrapping at both ends
pub fn wrap_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (current as isize + delta).rem_euclid(len) as usize
}

#[derive(Debug, Default)]
pub struct Session {
    pub deals: Vec<Deal>,
    pub loading_complete: bool,
    pub filter: DealFilter,
    /// Position within the filtered sequence, not within `deals`
    pub current_index: usize,
    pub picker: PersonPicker,
    pub view: View,
    pub banner: Option<Banner>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices into `deals` passing the active filter, in load order
    pub fn filtered(&self, roles: &FieldRoles, today: NaiveDate) -> Vec<usize> {
        self.filter.apply(&self.deals, roles, today)
    }

    /// Index into `deals` of the deal under the cursor
    pub fn current(&self, roles: &FieldRoles, today: NaiveDate) -> Option<usize> {
        let filtered = self.filtered(roles, today);
        if filtered.is_empty() {
            return None;
        }
        filtered.get(self.current_index.min(filtered.len() - 1)).copied()
    }

    pub fn next(&mut self, roles: &FieldRoles, today: NaiveDate) {
        let len = self.filtered(roles, today).len();
        self.current_index = wrap_index(self.current_index, 1, len);
    }

    pub fn previous(&mut self, roles: &FieldRoles, today: NaiveDate) {
        let len = self.filtered(roles, today).len();
        self.current_index = wrap_index(self.current_index, -1, len);
    }

    /// Replace the filter and return the cursor to the first match
    pub fn set_filter(&mut self, filter: DealFilter) {
        self.filter = filter;
        self.current_index = 0;
    }

    /// Move the cursor to the deal after `handled` in the re-filtered sequence.
    ///
    /// The handled deal may have dropped out of the filter (for example when
    /// only unreviewed deals are shown), so the position is found by load
    /// order rather than by stepping the old cursor.
    pub fn advance_past(&mut self, handled: usize, roles: &FieldRoles, today: NaiveDate) {
        let filtered = self.filtered(roles, today);
        self.current_index = filtered.iter().position(|&idx| idx > handled).unwrap_or(0);
    }

    /// Keep the cursor on `handled` after an action that does not advance.
    /// If a partial write moved it out of the filter, the cursor lands on the
    /// next deal instead, wrapping to the start.
    pub fn anchor_at(&mut self, handled: usize, roles: &FieldRoles, today: NaiveDate) {
        let filtered = self.filtered(roles, today);
        self.current_index = filtered.iter().position(|&idx| idx >= handled).unwrap_or(0);
    }

    pub fn push_deal(&mut self, deal: Deal) {
        self.deals.push(deal);
    }

    pub fn set_banner(&mut self, kind: BannerKind, message: impl Into<String>) {
        self.banner = Some(Banner {
            kind,
            message: message.into(),
        });
    }

    /// Drop loaded deals ahead of a reload; filter and view are kept
    pub fn reset(&mut self) {
        self.deals.clear();
        self.loading_complete = false;
        self.current_index = 0;
        self.picker.close();
    }
}
