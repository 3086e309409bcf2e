use rusqlite::{params, Connection, Params};
use serde::Serialize;

use super::{date_from_db, date_to_db};
use crate::error::{TrackError, TrackResult};
use crate::model::{
    Calling, CallingStatus, Holder, Id, Member, Organization, Position, Unit,
};

const CALLING_SELECT: &str = "SELECT c.id, c.unit_id, c.organization_id, c.position_id,
     c.member_id, m.name, c.home_unit_id, c.status, c.is_active,
     c.date_called, c.date_sustained, c.date_set_apart, c.date_released,
     c.presidency_approved, c.hc_approved, c.bishop_consulted_by, c.called_by,
     c.released_by, c.proposed_replacement, c.lcr_updated, c.notes, c.release_notes
     FROM callings c
     LEFT JOIN members m ON m.id = c.member_id";

/// A calling together with the names it is usually listed by.
#[derive(Debug, Clone, Serialize)]
pub struct CallingListing {
    pub calling: Calling,
    pub unit_name: String,
    pub unit_sort_order: i32,
    pub organization_name: String,
    pub position_title: String,
}

pub fn insert(conn: &Connection, calling: &Calling) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO callings (id, unit_id, organization_id, position_id, member_id, home_unit_id,
         status, is_active, date_called, date_sustained, date_set_apart, date_released,
         presidency_approved, hc_approved, bishop_consulted_by, called_by, released_by,
         proposed_replacement, lcr_updated, notes, release_notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
         ?18, ?19, ?20, ?21)",
        params![
            calling.id.to_db(),
            calling.unit_id.to_db(),
            calling.organization_id.to_db(),
            calling.position_id.to_db(),
            calling.holder.as_ref().map(|h| h.member_id.to_db()),
            calling.home_unit_id.map(|u| u.to_db()),
            calling.status.to_db_str(),
            calling.is_active as i32,
            date_to_db(calling.date_called),
            date_to_db(calling.date_sustained),
            date_to_db(calling.date_set_apart),
            date_to_db(calling.date_released),
            date_to_db(calling.presidency_approved),
            date_to_db(calling.hc_approved),
            calling.bishop_consulted_by,
            calling.called_by,
            calling.released_by,
            calling.proposed_replacement,
            calling.lcr_updated as i32,
            calling.notes,
            calling.release_notes,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, calling: &Calling) -> TrackResult<()> {
    conn.execute(
        "UPDATE callings SET unit_id = ?1, organization_id = ?2, position_id = ?3, member_id = ?4,
         home_unit_id = ?5, status = ?6, is_active = ?7, date_called = ?8, date_sustained = ?9,
         date_set_apart = ?10, date_released = ?11, presidency_approved = ?12, hc_approved = ?13,
         bishop_consulted_by = ?14, called_by = ?15, released_by = ?16,
         proposed_replacement = ?17, lcr_updated = ?18, notes = ?19, release_notes = ?20,
         updated_at = datetime('now')
         WHERE id = ?21",
        params![
            calling.unit_id.to_db(),
            calling.organization_id.to_db(),
            calling.position_id.to_db(),
            calling.holder.as_ref().map(|h| h.member_id.to_db()),
            calling.home_unit_id.map(|u| u.to_db()),
            calling.status.to_db_str(),
            calling.is_active as i32,
            date_to_db(calling.date_called),
            date_to_db(calling.date_sustained),
            date_to_db(calling.date_set_apart),
            date_to_db(calling.date_released),
            date_to_db(calling.presidency_approved),
            date_to_db(calling.hc_approved),
            calling.bishop_consulted_by,
            calling.called_by,
            calling.released_by,
            calling.proposed_replacement,
            calling.lcr_updated as i32,
            calling.notes,
            calling.release_notes,
            calling.id.to_db(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Calling>) -> TrackResult<()> {
    conn.execute("DELETE FROM callings WHERE id = ?1", params![id.to_db()])?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Calling>) -> TrackResult<Option<Calling>> {
    first(conn, &format!("{} WHERE c.id = ?1", CALLING_SELECT), params![id.to_db()])
}

/// Callings of a position, most recently called first. Undated callings
/// come last; ties keep insertion order.
pub fn find_by_position(conn: &Connection, position_id: Id<Position>) -> TrackResult<Vec<Calling>> {
    many(
        conn,
        &format!(
            "{} WHERE c.position_id = ?1
             ORDER BY c.date_called IS NULL, c.date_called DESC, c.rowid",
            CALLING_SELECT
        ),
        params![position_id.to_db()],
    )
}

/// The CALLED calling for a unit and position whose holder has this name.
pub fn find_called_by_holder_name(
    conn: &Connection,
    unit_id: Id<Unit>,
    position_id: Id<Position>,
    holder_name: &str,
) -> TrackResult<Option<Calling>> {
    first(
        conn,
        &format!(
            "{} WHERE c.unit_id = ?1 AND c.position_id = ?2 AND c.status = ?3
             AND m.name = ?4 COLLATE NOCASE
             ORDER BY c.rowid LIMIT 1",
            CALLING_SELECT
        ),
        params![
            unit_id.to_db(),
            position_id.to_db(),
            CallingStatus::Called.to_db_str(),
            holder_name,
        ],
    )
}

/// Any calling at this unit, organization and position whose holder has this
/// name. A CALLED one is preferred, then the oldest.
pub fn find_by_place_and_holder_name(
    conn: &Connection,
    unit_id: Id<Unit>,
    organization_id: Id<Organization>,
    position_id: Id<Position>,
    holder_name: &str,
) -> TrackResult<Option<Calling>> {
    first(
        conn,
        &format!(
            "{} WHERE c.unit_id = ?1 AND c.organization_id = ?2 AND c.position_id = ?3
             AND m.name = ?4 COLLATE NOCASE
             ORDER BY c.status <> ?5, c.rowid LIMIT 1",
            CALLING_SELECT
        ),
        params![
            unit_id.to_db(),
            organization_id.to_db(),
            position_id.to_db(),
            holder_name,
            CallingStatus::Called.to_db_str(),
        ],
    )
}

/// Looks up a calling by its natural key. With `status` set, only a calling
/// in that status matches.
pub fn find_by_key(
    conn: &Connection,
    unit_id: Id<Unit>,
    organization_id: Id<Organization>,
    position_id: Id<Position>,
    member_id: Id<Member>,
    status: Option<CallingStatus>,
) -> TrackResult<Option<Calling>> {
    first(
        conn,
        &format!(
            "{} WHERE c.unit_id = ?1 AND c.organization_id = ?2 AND c.position_id = ?3
             AND c.member_id = ?4 AND (?5 IS NULL OR c.status = ?5)
             ORDER BY c.rowid LIMIT 1",
            CALLING_SELECT
        ),
        params![
            unit_id.to_db(),
            organization_id.to_db(),
            position_id.to_db(),
            member_id.to_db(),
            status.map(|s| s.to_db_str()),
        ],
    )
}

pub fn find_all(conn: &Connection) -> TrackResult<Vec<Calling>> {
    many(conn, &format!("{} ORDER BY c.rowid", CALLING_SELECT), [])
}

/// Every calling with its unit, organization and position names, in
/// insertion order.
pub fn find_listings(conn: &Connection) -> TrackResult<Vec<CallingListing>> {
    let mut stmt = conn.prepare(&format!(
        "{}
         JOIN units u ON u.id = c.unit_id
         JOIN organizations o ON o.id = c.organization_id
         JOIN positions p ON p.id = c.position_id
         ORDER BY c.rowid",
        CALLING_SELECT.replacen(
            "c.notes, c.release_notes",
            "c.notes, c.release_notes, u.name, u.sort_order, o.name, p.title",
            1
        )
    ))?;

    let listings = stmt
        .query_map([], |row| Ok(row_to_listing(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(listings)
}

pub fn count(conn: &Connection) -> TrackResult<i64> {
    let n = conn.query_row("SELECT COUNT(*) FROM callings", [], |row| row.get(0))?;
    Ok(n)
}

fn first<P: Params>(conn: &Connection, sql: &str, params: P) -> TrackResult<Option<Calling>> {
    let mut stmt = conn.prepare(sql)?;
    let result = stmt.query_row(params, |row| Ok(row_to_calling(row)));

    match result {
        Ok(calling) => Ok(Some(calling?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn many<P: Params>(conn: &Connection, sql: &str, params: P) -> TrackResult<Vec<Calling>> {
    let mut stmt = conn.prepare(sql)?;
    let callings = stmt
        .query_map(params, |row| Ok(row_to_calling(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(callings)
}

fn row_to_listing(row: &rusqlite::Row) -> TrackResult<CallingListing> {
    Ok(CallingListing {
        calling: row_to_calling(row)?,
        unit_name: row.get(22)?,
        unit_sort_order: row.get(23)?,
        organization_name: row.get(24)?,
        position_title: row.get(25)?,
    })
}

fn row_to_calling(row: &rusqlite::Row) -> TrackResult<Calling> {
    let id_str: String = row.get(0)?;
    let unit_str: String = row.get(1)?;
    let org_str: String = row.get(2)?;
    let position_str: String = row.get(3)?;
    let member_str: Option<String> = row.get(4)?;
    let member_name: Option<String> = row.get(5)?;
    let home_unit_str: Option<String> = row.get(6)?;
    let status_str: String = row.get(7)?;

    let status = CallingStatus::from_db_str(&status_str)
        .ok_or_else(|| TrackError::Other(format!("Unknown calling status: {}", status_str)))?;

    let holder = match (member_str, member_name) {
        (Some(id), Some(name)) => Some(Holder {
            member_id: Id::from_db(&id)?,
            name,
        }),
        _ => None,
    };

    Ok(Calling {
        id: Id::from_db(&id_str)?,
        unit_id: Id::from_db(&unit_str)?,
        organization_id: Id::from_db(&org_str)?,
        position_id: Id::from_db(&position_str)?,
        holder,
        home_unit_id: home_unit_str.as_deref().map(Id::from_db).transpose()?,
        status,
        is_active: row.get::<_, i32>(8)? != 0,
        date_called: date_from_db(row.get(9)?),
        date_sustained: date_from_db(row.get(10)?),
        date_set_apart: date_from_db(row.get(11)?),
        date_released: date_from_db(row.get(12)?),
        presidency_approved: date_from_db(row.get(13)?),
        hc_approved: date_from_db(row.get(14)?),
        bishop_consulted_by: row.get(15)?,
        called_by: row.get(16)?,
        released_by: row.get(17)?,
        proposed_replacement: row.get(18)?,
        lcr_updated: row.get::<_, i32>(19)? != 0,
        notes: row.get(20)?,
        release_notes: row.get(21)?,
    })
}
