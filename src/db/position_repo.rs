use rusqlite::{params, Connection};

use crate::error::TrackResult;
use crate::model::{Id, Organization, Position};

const POSITION_COLUMNS: &str = "id, organization_id, title, description, is_leadership,
     requires_setting_apart, display_order, is_active";

pub fn insert(conn: &Connection, position: &Position) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO positions (id, organization_id, title, description, is_leadership,
         requires_setting_apart, display_order, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            position.id.to_db(),
            position.organization_id.to_db(),
            position.title,
            position.description,
            position.is_leadership as i32,
            position.requires_setting_apart as i32,
            position.display_order,
            position.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, position: &Position) -> TrackResult<()> {
    conn.execute(
        "UPDATE positions SET organization_id = ?1, title = ?2, description = ?3,
         is_leadership = ?4, requires_setting_apart = ?5, display_order = ?6, is_active = ?7,
         updated_at = datetime('now')
         WHERE id = ?8",
        params![
            position.organization_id.to_db(),
            position.title,
            position.description,
            position.is_leadership as i32,
            position.requires_setting_apart as i32,
            position.display_order,
            position.is_active as i32,
            position.id.to_db(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Position>) -> TrackResult<()> {
    conn.execute("DELETE FROM positions WHERE id = ?1", params![id.to_db()])?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Position>) -> TrackResult<Option<Position>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM positions WHERE id = ?1",
        POSITION_COLUMNS
    ))?;

    let result = stmt.query_row(params![id.to_db()], |row| Ok(row_to_position(row)));

    match result {
        Ok(position) => Ok(Some(position?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_by_title(
    conn: &Connection,
    organization_id: Id<Organization>,
    title: &str,
) -> TrackResult<Option<Position>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM positions WHERE organization_id = ?1 AND title = ?2 COLLATE NOCASE",
        POSITION_COLUMNS
    ))?;

    let result = stmt.query_row(params![organization_id.to_db(), title], |row| {
        Ok(row_to_position(row))
    });

    match result {
        Ok(position) => Ok(Some(position?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Positions of an organization in display order.
pub fn find_by_organization(
    conn: &Connection,
    organization_id: Id<Organization>,
) -> TrackResult<Vec<Position>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM positions WHERE organization_id = ?1 ORDER BY display_order, title",
        POSITION_COLUMNS
    ))?;

    let positions = stmt
        .query_map(params![organization_id.to_db()], |row| {
            Ok(row_to_position(row))
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(positions)
}

pub fn count_callings(conn: &Connection, id: Id<Position>) -> TrackResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM callings WHERE position_id = ?1",
        params![id.to_db()],
        |row| row.get(0),
    )?;
    Ok(n)
}

fn row_to_position(row: &rusqlite::Row) -> TrackResult<Position> {
    let id_str: String = row.get(0)?;
    let org_str: String = row.get(1)?;
    Ok(Position {
        id: Id::from_db(&id_str)?,
        organization_id: Id::from_db(&org_str)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_leadership: row.get::<_, i32>(4)? != 0,
        requires_setting_apart: row.get::<_, i32>(5)? != 0,
        display_order: row.get(6)?,
        is_active: row.get::<_, i32>(7)? != 0,
    })
}
