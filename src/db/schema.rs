use rusqlite::Connection;

use crate::error::TrackResult;

/// Initialize the database schema. Creates all tables if they don't exist.
pub fn initialize(conn: &Connection) -> TrackResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            is_superuser INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS groups (
            name TEXT PRIMARY KEY NOT NULL
        );

        CREATE TABLE IF NOT EXISTS group_permissions (
            group_name TEXT NOT NULL REFERENCES groups(name) ON DELETE CASCADE,
            codename TEXT NOT NULL,
            PRIMARY KEY (group_name, codename)
        );

        CREATE TABLE IF NOT EXISTS user_groups (
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            group_name TEXT NOT NULL REFERENCES groups(name) ON DELETE CASCADE,
            PRIMARY KEY (user_id, group_name)
        );

        CREATE TABLE IF NOT EXISTS units (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            unit_type TEXT NOT NULL,
            parent_id TEXT REFERENCES units(id) ON DELETE SET NULL,
            meeting_time TEXT,
            location TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,
            unit_id TEXT REFERENCES units(id) ON DELETE SET NULL,
            leader TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS positions (
            id TEXT PRIMARY KEY NOT NULL,
            organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE RESTRICT,
            title TEXT NOT NULL,
            description TEXT,
            is_leadership INTEGER NOT NULL DEFAULT 0,
            requires_setting_apart INTEGER NOT NULL DEFAULT 0,
            display_order INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(organization_id, title COLLATE NOCASE)
        );

        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            home_unit_id TEXT REFERENCES units(id) ON DELETE SET NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_members_name ON members(name COLLATE NOCASE);

        CREATE TABLE IF NOT EXISTS callings (
            id TEXT PRIMARY KEY NOT NULL,
            unit_id TEXT NOT NULL REFERENCES units(id) ON DELETE RESTRICT,
            organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE RESTRICT,
            position_id TEXT NOT NULL REFERENCES positions(id) ON DELETE RESTRICT,
            member_id TEXT REFERENCES members(id) ON DELETE SET NULL,
            home_unit_id TEXT REFERENCES units(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            is_active INTEGER NOT NULL DEFAULT 1,
            date_called TEXT,
            date_sustained TEXT,
            date_set_apart TEXT,
            date_released TEXT,
            presidency_approved TEXT,
            hc_approved TEXT,
            bishop_consulted_by TEXT,
            called_by TEXT,
            released_by TEXT,
            proposed_replacement TEXT,
            lcr_updated INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            release_notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_callings_position ON callings(position_id);
        CREATE INDEX IF NOT EXISTS idx_callings_unit ON callings(unit_id);

        CREATE TABLE IF NOT EXISTS calling_history (
            id TEXT PRIMARY KEY NOT NULL,
            calling_id TEXT NOT NULL REFERENCES callings(id) ON DELETE CASCADE,
            action TEXT NOT NULL,
            member_id TEXT REFERENCES members(id) ON DELETE SET NULL,
            snapshot TEXT NOT NULL,
            changed_by TEXT,
            changed_at TEXT NOT NULL,
            notes TEXT
        );
        ",
    )?;
    Ok(())
}

/// Create an in-memory connection for testing. Available in test builds.
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}
