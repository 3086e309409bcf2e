use rusqlite::{params, Connection};

use crate::error::TrackResult;
use crate::model::{Id, Organization};

pub fn insert(conn: &Connection, org: &Organization) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO organizations (id, name, description, unit_id, leader, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            org.id.to_db(),
            org.name,
            org.description,
            org.unit_id.map(|u| u.to_db()),
            org.leader,
            org.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, org: &Organization) -> TrackResult<()> {
    conn.execute(
        "UPDATE organizations SET name = ?1, description = ?2, unit_id = ?3, leader = ?4,
         is_active = ?5, updated_at = datetime('now')
         WHERE id = ?6",
        params![
            org.name,
            org.description,
            org.unit_id.map(|u| u.to_db()),
            org.leader,
            org.is_active as i32,
            org.id.to_db(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Organization>) -> TrackResult<()> {
    conn.execute("DELETE FROM organizations WHERE id = ?1", params![id.to_db()])?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Organization>) -> TrackResult<Option<Organization>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, unit_id, leader, is_active
         FROM organizations WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_db()], |row| Ok(row_to_org(row)));

    match result {
        Ok(org) => Ok(Some(org?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_by_name(conn: &Connection, name: &str) -> TrackResult<Option<Organization>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, unit_id, leader, is_active
         FROM organizations WHERE name = ?1 COLLATE NOCASE",
    )?;

    let result = stmt.query_row(params![name], |row| Ok(row_to_org(row)));

    match result {
        Ok(org) => Ok(Some(org?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_all(conn: &Connection) -> TrackResult<Vec<Organization>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, unit_id, leader, is_active
         FROM organizations ORDER BY name",
    )?;

    let orgs = stmt
        .query_map([], |row| Ok(row_to_org(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(orgs)
}

/// Number of callings or positions that depend on this organization.
pub fn count_dependents(conn: &Connection, id: Id<Organization>) -> TrackResult<i64> {
    let n = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM callings WHERE organization_id = ?1)
              + (SELECT COUNT(*) FROM positions WHERE organization_id = ?1)",
        params![id.to_db()],
        |row| row.get(0),
    )?;
    Ok(n)
}

fn row_to_org(row: &rusqlite::Row) -> TrackResult<Organization> {
    let id_str: String = row.get(0)?;
    let unit_str: Option<String> = row.get(3)?;
    Ok(Organization {
        id: Id::from_db(&id_str)?,
        name: row.get(1)?,
        description: row.get(2)?,
        unit_id: unit_str.as_deref().map(Id::from_db).transpose()?,
        leader: row.get(4)?,
        is_active: row.get::<_, i32>(5)? != 0,
    })
}
