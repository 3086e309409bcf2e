use rusqlite::{params, Connection};

use crate::error::TrackResult;
use crate::model::{Id, Member};

pub fn insert(conn: &Connection, member: &Member) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO members (id, name, home_unit_id, is_active) VALUES (?1, ?2, ?3, ?4)",
        params![
            member.id.to_db(),
            member.name,
            member.home_unit_id.map(|u| u.to_db()),
            member.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, member: &Member) -> TrackResult<()> {
    conn.execute(
        "UPDATE members SET name = ?1, home_unit_id = ?2, is_active = ?3 WHERE id = ?4",
        params![
            member.name,
            member.home_unit_id.map(|u| u.to_db()),
            member.is_active as i32,
            member.id.to_db(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Member>) -> TrackResult<()> {
    conn.execute("DELETE FROM members WHERE id = ?1", params![id.to_db()])?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Member>) -> TrackResult<Option<Member>> {
    let mut stmt =
        conn.prepare("SELECT id, name, home_unit_id, is_active FROM members WHERE id = ?1")?;

    let result = stmt.query_row(params![id.to_db()], |row| Ok(row_to_member(row)));

    match result {
        Ok(member) => Ok(Some(member?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All members with this exact name (ignoring case), oldest first.
pub fn find_by_name(conn: &Connection, name: &str) -> TrackResult<Vec<Member>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, home_unit_id, is_active FROM members
         WHERE name = ?1 COLLATE NOCASE ORDER BY rowid",
    )?;

    let members = stmt
        .query_map(params![name], |row| Ok(row_to_member(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(members)
}

pub fn find_all(conn: &Connection) -> TrackResult<Vec<Member>> {
    let mut stmt =
        conn.prepare("SELECT id, name, home_unit_id, is_active FROM members ORDER BY name")?;

    let members = stmt
        .query_map([], |row| Ok(row_to_member(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(members)
}

fn row_to_member(row: &rusqlite::Row) -> TrackResult<Member> {
    let id_str: String = row.get(0)?;
    let unit_str: Option<String> = row.get(2)?;
    Ok(Member {
        id: Id::from_db(&id_str)?,
        name: row.get(1)?,
        home_unit_id: unit_str.as_deref().map(Id::from_db).transpose()?,
        is_active: row.get::<_, i32>(3)? != 0,
    })
}
