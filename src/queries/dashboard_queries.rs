use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::calling_repo::{self, CallingListing};
use crate::db::{history_repo, unit_repo};
use crate::error::TrackResult;
use crate::model::{CallingHistory, CallingStatus};

const RECENT_LIMIT: usize = 10;
const UPCOMING_RELEASE_LIMIT: usize = 10;
const UPCOMING_EVENT_LIMIT: usize = 5;
const LOOKAHEAD_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub unit_count: i64,
    /// Callings flagged active, whatever their status.
    pub active_callings: usize,
    pub called_callings: usize,
    pub recent_callings: Vec<CallingListing>,
    pub upcoming_releases: Vec<CallingListing>,
    /// Callings with a called, sustained or set apart date coming up, by the
    /// soonest such date.
    pub upcoming_events: Vec<CallingListing>,
    /// Most common status first.
    pub status_breakdown: Vec<(CallingStatus, usize)>,
    pub recent_history: Vec<CallingHistory>,
}

pub fn dashboard(conn: &Connection, today: NaiveDate) -> TrackResult<Dashboard> {
    let listings = calling_repo::find_listings(conn)?;
    let horizon = today + Duration::days(LOOKAHEAD_DAYS);
    let upcoming = |d: Option<NaiveDate>| d.is_some_and(|d| d >= today && d <= horizon);

    let active_callings = listings.iter().filter(|l| l.calling.is_active).count();
    let called_callings = listings
        .iter()
        .filter(|l| l.calling.status == CallingStatus::Called)
        .count();

    // Newest first, undated last.
    let mut recent_callings = listings.clone();
    recent_callings.sort_by(|a, b| b.calling.date_called.cmp(&a.calling.date_called));
    recent_callings.truncate(RECENT_LIMIT);

    let mut upcoming_releases: Vec<CallingListing> = listings
        .iter()
        .filter(|l| l.calling.is_active && upcoming(l.calling.date_released))
        .cloned()
        .collect();
    upcoming_releases.sort_by_key(|l| l.calling.date_released);
    upcoming_releases.truncate(UPCOMING_RELEASE_LIMIT);

    // Soonest event first, whichever of the three dates it is.
    let mut upcoming_events: Vec<(NaiveDate, CallingListing)> = listings
        .iter()
        .filter_map(|l| {
            let c = &l.calling;
            [c.date_called, c.date_sustained, c.date_set_apart]
                .into_iter()
                .filter(|d| upcoming(*d))
                .flatten()
                .min()
                .map(|next| (next, l.clone()))
        })
        .collect();
    upcoming_events.sort_by_key(|(next, _)| *next);
    upcoming_events.truncate(UPCOMING_EVENT_LIMIT);
    let upcoming_events = upcoming_events.into_iter().map(|(_, l)| l).collect();

    let mut status_breakdown: Vec<(CallingStatus, usize)> = CallingStatus::ALL
        .iter()
        .map(|s| (*s, listings.iter().filter(|l| l.calling.status == *s).count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    status_breakdown.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(Dashboard {
        unit_count: unit_repo::count(conn)?,
        active_callings,
        called_callings,
        recent_callings,
        upcoming_releases,
        upcoming_events,
        status_breakdown,
        recent_history: history_repo::find_recent(conn, RECENT_LIMIT)?,
    })
}
