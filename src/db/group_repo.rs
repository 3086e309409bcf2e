use rusqlite::{params, Connection};

use crate::error::TrackResult;
use crate::model::{Id, User};

// --- Groups and their permission grants ---

/// Inserts the group if missing. Returns true when it was newly created.
pub fn ensure_group(conn: &Connection, name: &str) -> TrackResult<bool> {
    let inserted = conn.execute(
        "INSERT INTO groups (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    Ok(inserted > 0)
}

pub fn find_group_names(conn: &Connection) -> TrackResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM groups ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

pub fn clear_permissions(conn: &Connection, group_name: &str) -> TrackResult<()> {
    conn.execute(
        "DELETE FROM group_permissions WHERE group_name = ?1",
        params![group_name],
    )?;
    Ok(())
}

pub fn add_permission(conn: &Connection, group_name: &str, codename: &str) -> TrackResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO group_permissions (group_name, codename) VALUES (?1, ?2)",
        params![group_name, codename],
    )?;
    Ok(())
}

pub fn find_permissions(conn: &Connection, group_name: &str) -> TrackResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT codename FROM group_permissions WHERE group_name = ?1 ORDER BY codename",
    )?;
    let codenames = stmt
        .query_map(params![group_name], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(codenames)
}

// --- Users and group membership ---

pub fn insert_user(conn: &Connection, user: &User) -> TrackResult<()> {
    conn.execute(
        "INSERT INTO users (id, username, is_superuser) VALUES (?1, ?2, ?3)",
        params![user.id.to_db(), user.username, user.is_superuser as i32],
    )?;
    Ok(())
}

pub fn find_user_by_username(conn: &Connection, username: &str) -> TrackResult<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, is_superuser FROM users WHERE username = ?1 COLLATE NOCASE",
    )?;

    let result = stmt.query_row(params![username], |row| {
        let id_str: String = row.get(0)?;
        let username: String = row.get(1)?;
        let is_superuser: i32 = row.get(2)?;
        Ok((id_str, username, is_superuser))
    });

    match result {
        Ok((id_str, username, is_superuser)) => Ok(Some(User {
            id: Id::from_db(&id_str)?,
            username,
            is_superuser: is_superuser != 0,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn add_user_to_group(conn: &Connection, user_id: Id<User>, group_name: &str) -> TrackResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO user_groups (user_id, group_name) VALUES (?1, ?2)",
        params![user_id.to_db(), group_name],
    )?;
    Ok(())
}

pub fn find_user_groups(conn: &Connection, user_id: Id<User>) -> TrackResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT group_name FROM user_groups WHERE user_id = ?1 ORDER BY group_name",
    )?;
    let names = stmt
        .query_map(params![user_id.to_db()], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
