use std::cmp::Ordering;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::calling_repo::{self, CallingListing};
use crate::error::TrackResult;
use crate::model::{Calling, CallingStatus};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// The status tabs of the calling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Pending,
    Released,
    Cancelled,
}

impl StatusFilter {
    pub const ALL: &'static [StatusFilter] = &[
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Pending,
        StatusFilter::Released,
        StatusFilter::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Pending => "pending",
            StatusFilter::Released => "released",
            StatusFilter::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.label().eq_ignore_ascii_case(wanted))
    }

    pub fn matches(&self, calling: &Calling) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => {
                calling.status == CallingStatus::Called && calling.date_released.is_none()
            }
            StatusFilter::Pending => matches!(
                calling.status,
                CallingStatus::Pending
                    | CallingStatus::Approved
                    | CallingStatus::HcApproved
                    | CallingStatus::OnHold
            ),
            StatusFilter::Released => {
                matches!(
                    calling.status,
                    CallingStatus::Released | CallingStatus::Completed
                ) || calling.date_released.is_some()
            }
            StatusFilter::Cancelled => calling.status == CallingStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Unit, then organization, then position.
    #[default]
    Default,
    Holder,
    Position,
    DateCalled,
    Status,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "unit" => Some(SortKey::Default),
            "holder" | "name" => Some(SortKey::Holder),
            "position" => Some(SortKey::Position),
            "date" | "date_called" | "called" => Some(SortKey::DateCalled),
            "status" => Some(SortKey::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct CallingFilter {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort: SortKey,
    pub order: SortOrder,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for CallingFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: StatusFilter::All,
            sort: SortKey::Default,
            order: SortOrder::Asc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Callings sharing a unit, in list order.
#[derive(Debug, Clone, Serialize)]
pub struct UnitGroup {
    pub unit_name: String,
    pub callings: Vec<CallingListing>,
}

/// How many callings fall under each status tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub active: usize,
    pub pending: usize,
    pub released: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Active => self.active,
            StatusFilter::Pending => self.pending,
            StatusFilter::Released => self.released,
            StatusFilter::Cancelled => self.cancelled,
        }
    }
}

pub fn list_callings(conn: &Connection, filter: &CallingFilter) -> TrackResult<Page<CallingListing>> {
    let listings = calling_repo::find_listings(conn)?;
    Ok(apply_filter(listings, filter))
}

/// Searches, filters, sorts and pages listings already in memory.
pub fn apply_filter(listings: Vec<CallingListing>, filter: &CallingFilter) -> Page<CallingListing> {
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut matching: Vec<CallingListing> = listings
        .into_iter()
        .filter(|l| filter.status.matches(&l.calling))
        .filter(|l| needle.as_deref().map_or(true, |n| matches_search(l, n)))
        .collect();

    matching.sort_by(|a, b| {
        let primary = match filter.sort {
            SortKey::Default => default_order(a, b),
            SortKey::Holder => lower(a.calling.holder_name()).cmp(&lower(b.calling.holder_name())),
            SortKey::Position => a.position_title.to_lowercase().cmp(&b.position_title.to_lowercase()),
            SortKey::DateCalled => a.calling.date_called.cmp(&b.calling.date_called),
            SortKey::Status => a
                .calling
                .status
                .display_name()
                .cmp(b.calling.status.display_name()),
        };
        let primary = match filter.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| default_order(a, b))
    });

    let page = filter.page.max(1);
    let page_size = filter.page_size.max(1);
    let total = matching.len();
    let items = matching
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        page_size,
        total,
    }
}

/// Groups consecutive listings by unit, keeping their order.
pub fn group_by_unit(listings: &[CallingListing]) -> Vec<UnitGroup> {
    let mut groups: Vec<UnitGroup> = Vec::new();
    for listing in listings {
        match groups.last_mut() {
            Some(group) if group.unit_name == listing.unit_name => {
                group.callings.push(listing.clone());
            }
            _ => groups.push(UnitGroup {
                unit_name: listing.unit_name.clone(),
                callings: vec![listing.clone()],
            }),
        }
    }
    groups
}

/// Tab counts for every calling matching `search`.
pub fn status_counts(conn: &Connection, search: Option<&str>) -> TrackResult<StatusCounts> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let listings = calling_repo::find_listings(conn)?;

    let mut counts = StatusCounts::default();
    for listing in listings
        .iter()
        .filter(|l| needle.as_deref().map_or(true, |n| matches_search(l, n)))
    {
        let c = &listing.calling;
        counts.all += 1;
        if StatusFilter::Active.matches(c) {
            counts.active += 1;
        }
        if StatusFilter::Pending.matches(c) {
            counts.pending += 1;
        }
        if StatusFilter::Released.matches(c) {
            counts.released += 1;
        }
        if StatusFilter::Cancelled.matches(c) {
            counts.cancelled += 1;
        }
    }
    Ok(counts)
}

fn matches_search(listing: &CallingListing, needle: &str) -> bool {
    let fields = [
        listing.calling.holder_name(),
        Some(listing.position_title.as_str()),
        Some(listing.organization_name.as_str()),
        Some(listing.unit_name.as_str()),
        listing.calling.proposed_replacement.as_deref(),
    ];
    fields
        .iter()
        .flatten()
        .any(|f| f.to_lowercase().contains(needle))
}

fn default_order(a: &CallingListing, b: &CallingListing) -> Ordering {
    a.unit_sort_order
        .cmp(&b.unit_sort_order)
        .then_with(|| a.unit_name.to_lowercase().cmp(&b.unit_name.to_lowercase()))
        .then_with(|| {
            a.organization_name
                .to_lowercase()
                .cmp(&b.organization_name.to_lowercase())
        })
        .then_with(|| a.position_title.to_lowercase().cmp(&b.position_title.to_lowercase()))
}

fn lower(s: Option<&str>) -> Option<String> {
    s.map(str::to_lowercase)
}
