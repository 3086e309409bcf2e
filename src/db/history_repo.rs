use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::{TrackError, TrackResult};
use crate::model::{Calling, CallingHistory, HistoryAction, Id};

/// History rows are append-only; there is deliberately no update.
pub fn insert(conn: &Connection, entry: &CallingHistory) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO calling_history (id, calling_id, action, member_id, snapshot, changed_by,
         changed_at, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id.to_db(),
            entry.calling_id.to_db(),
            entry.action.to_db_str(),
            entry.member_id.map(|m| m.to_db()),
            serde_json::to_string(&entry.snapshot)?,
            entry.changed_by,
            entry.changed_at.to_rfc3339(),
            entry.notes,
        ],
    )?;
    Ok(())
}

/// History of one calling, newest first.
pub fn find_by_calling(conn: &Connection, calling_id: Id<Calling>) -> TrackResult<Vec<CallingHistory>> {
    let mut stmt = conn.prepare(
        "SELECT id, calling_id, action, member_id, snapshot, changed_by, changed_at, notes
         FROM calling_history WHERE calling_id = ?1
         ORDER BY changed_at DESC, rowid DESC",
    )?;

    let entries = stmt
        .query_map(params![calling_id.to_db()], |row| Ok(row_to_entry(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn find_recent(conn: &Connection, limit: usize) -> TrackResult<Vec<CallingHistory>> {
    let mut stmt = conn.prepare(
        "SELECT id, calling_id, action, member_id, snapshot, changed_by, changed_at, notes
         FROM calling_history ORDER BY changed_at DESC, rowid DESC LIMIT ?1",
    )?;

    let entries = stmt
        .query_map(params![limit as i64], |row| Ok(row_to_entry(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn count_by_calling(conn: &Connection, calling_id: Id<Calling>) -> TrackResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM calling_history WHERE calling_id = ?1",
        params![calling_id.to_db()],
        |row| row.get(0),
    )?;
    Ok(n)
}

fn row_to_entry(row: &rusqlite::Row) -> TrackResult<CallingHistory> {
    let id_str: String = row.get(0)?;
    let calling_str: String = row.get(1)?;
    let action_str: String = row.get(2)?;
    let member_str: Option<String> = row.get(3)?;
    let snapshot_str: String = row.get(4)?;
    let changed_at_str: String = row.get(6)?;

    let action = HistoryAction::from_db_str(&action_str)
        .ok_or_else(|| TrackError::Other(format!("Unknown history action: {}", action_str)))?;
    let changed_at = DateTime::parse_from_rfc3339(&changed_at_str)
        .map_err(|e| TrackError::Other(format!("Invalid timestamp '{}': {}", changed_at_str, e)))?
        .with_timezone(&Utc);

    Ok(CallingHistory {
        id: Id::from_db(&id_str)?,
        calling_id: Id::from_db(&calling_str)?,
        action,
        member_id: member_str.as_deref().map(Id::from_db).transpose()?,
        snapshot: serde_json::from_str(&snapshot_str)?,
        changed_by: row.get(5)?,
        changed_at,
        notes: row.get(7)?,
    })
}
