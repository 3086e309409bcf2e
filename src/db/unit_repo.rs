use chrono::NaiveTime;
use rusqlite::{params, Connection};

use crate::error::{TrackError, TrackResult};
use crate::model::{Id, Unit, UnitType};

const UNIT_COLUMNS: &str =
    "id, name, unit_type, parent_id, meeting_time, location, is_active, sort_order";

pub fn insert(conn: &Connection, unit: &Unit) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO units (id, name, unit_type, parent_id, meeting_time, location, is_active, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            unit.id.to_db(),
            unit.name,
            unit.unit_type.to_db_str(),
            unit.parent_id.map(|p| p.to_db()),
            unit.meeting_time.map(|t| t.format("%H:%M").to_string()),
            unit.location,
            unit.is_active as i32,
            unit.sort_order,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, unit: &Unit) -> TrackResult<()> {
    conn.execute(
        "UPDATE units SET name = ?1, unit_type = ?2, parent_id = ?3, meeting_time = ?4,
         location = ?5, is_active = ?6, sort_order = ?7, updated_at = datetime('now')
         WHERE id = ?8",
        params![
            unit.name,
            unit.unit_type.to_db_str(),
            unit.parent_id.map(|p| p.to_db()),
            unit.meeting_time.map(|t| t.format("%H:%M").to_string()),
            unit.location,
            unit.is_active as i32,
            unit.sort_order,
            unit.id.to_db(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Unit>) -> TrackResult<()> {
    conn.execute("DELETE FROM units WHERE id = ?1", params![id.to_db()])?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Unit>) -> TrackResult<Option<Unit>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM units WHERE id = ?1", UNIT_COLUMNS))?;

    let result = stmt.query_row(params![id.to_db()], |row| Ok(row_to_unit(row)));

    match result {
        Ok(unit) => Ok(Some(unit?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Case-insensitive exact name match.
pub fn find_by_name(conn: &Connection, name: &str) -> TrackResult<Option<Unit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM units WHERE name = ?1 COLLATE NOCASE",
        UNIT_COLUMNS
    ))?;

    let result = stmt.query_row(params![name], |row| Ok(row_to_unit(row)));

    match result {
        Ok(unit) => Ok(Some(unit?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_all(conn: &Connection) -> TrackResult<Vec<Unit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM units ORDER BY sort_order, name",
        UNIT_COLUMNS
    ))?;

    let units = stmt
        .query_map([], |row| Ok(row_to_unit(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(units)
}

pub fn count(conn: &Connection) -> TrackResult<i64> {
    let n = conn.query_row("SELECT COUNT(*) FROM units", [], |row| row.get(0))?;
    Ok(n)
}

/// Number of callings that belong to this unit.
pub fn count_callings(conn: &Connection, id: Id<Unit>) -> TrackResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM callings WHERE unit_id = ?1",
        params![id.to_db()],
        |row| row.get(0),
    )?;
    Ok(n)
}

fn row_to_unit(row: &rusqlite::Row) -> TrackResult<Unit> {
    let id_str: String = row.get(0)?;
    let type_str: String = row.get(2)?;
    let parent_str: Option<String> = row.get(3)?;
    let time_str: Option<String> = row.get(4)?;

    let unit_type = UnitType::from_db_str(&type_str)
        .ok_or_else(|| TrackError::Other(format!("Unknown unit type: {}", type_str)))?;

    Ok(Unit {
        id: Id::from_db(&id_str)?,
        name: row.get(1)?,
        unit_type,
        parent_id: parent_str.as_deref().map(Id::from_db).transpose()?,
        meeting_time: time_str.and_then(|s| NaiveTime::parse_from_str(&s, "%H:%M").ok()),
        location: row.get(5)?,
        is_active: row.get::<_, i32>(6)? != 0,
        sort_order: row.get(7)?,
    })
}
