use rusqlite::Connection;
use serde::Serialize;

use crate::db::{calling_repo, organization_repo, position_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::{Calling, Holder, Id, Organization, Position};

/// A position and whoever currently fills it.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub position: Position,
    pub current: Option<Calling>,
}

impl RosterEntry {
    pub fn holder(&self) -> Option<&Holder> {
        self.current.as_ref().and_then(|c| c.holder.as_ref())
    }

    pub fn is_vacant(&self) -> bool {
        self.holder().is_none()
    }
}

/// The calling that fills a position: not terminal and not released. When
/// several qualify, the most recently called wins, undated ones lose, and
/// remaining ties go to the earliest in `callings`.
pub fn select_current(callings: &[Calling]) -> Option<&Calling> {
    callings
        .iter()
        .filter(|c| c.is_current())
        .fold(None, |best: Option<&Calling>, c| match best {
            Some(b) if !called_later(c, b) => Some(b),
            _ => Some(c),
        })
}

fn called_later(a: &Calling, b: &Calling) -> bool {
    match (a.date_called, b.date_called) {
        (Some(x), Some(y)) => x > y,
        (Some(_), None) => true,
        _ => false,
    }
}

pub fn current_calling(conn: &Connection, position_id: Id<Position>) -> TrackResult<Option<Calling>> {
    let callings = calling_repo::find_by_position(conn, position_id)?;
    Ok(select_current(&callings).cloned())
}

/// `None` means the position is vacant.
pub fn current_holder(conn: &Connection, position_id: Id<Position>) -> TrackResult<Option<Holder>> {
    Ok(current_calling(conn, position_id)?.and_then(|c| c.holder))
}

pub fn position_roster(
    conn: &Connection,
    organization_id: Id<Organization>,
) -> TrackResult<Vec<RosterEntry>> {
    organization_repo::find_by_id(conn, organization_id)?
        .ok_or_else(|| TrackError::not_found("Organization", organization_id))?;

    let mut roster = Vec::new();
    for position in position_repo::find_by_organization(conn, organization_id)? {
        let current = current_calling(conn, position.id)?;
        roster.push(RosterEntry { position, current });
    }
    Ok(roster)
}
