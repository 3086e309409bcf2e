use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::group_repo;
use crate::error::{TrackError, TrackResult};
use crate::model::User;
use crate::permissions::{Principal, Role};
use crate::validation;

/// Outcome of bootstrapping one permission group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub created: bool,
    pub permissions: usize,
}

/// Creates the permission groups and resets each one's grants to the role
/// table. Running it again only rewrites the grants.
pub fn bootstrap_groups(conn: &Connection) -> TrackResult<Vec<GroupReport>> {
    let tx = conn.unchecked_transaction()?;
    let mut reports = Vec::with_capacity(Role::ALL.len());

    for role in Role::ALL {
        let created = group_repo::ensure_group(&tx, role.name())?;
        group_repo::clear_permissions(&tx, role.name())?;
        for permission in role.grants() {
            group_repo::add_permission(&tx, role.name(), permission.codename())?;
        }
        reports.push(GroupReport {
            name: role.name().to_string(),
            created,
            permissions: role.grants().len(),
        });
    }

    tx.commit()?;
    info!(groups = reports.len(), "permission groups bootstrapped");
    Ok(reports)
}

pub fn add_user(conn: &Connection, username: &str, is_superuser: bool) -> TrackResult<User> {
    let valid_name = validation::non_blank(username, "username")?;
    if group_repo::find_user_by_username(conn, &valid_name)?.is_some() {
        return Err(TrackError::AlreadyExists {
            entity_type: "User".into(),
            identifier: valid_name,
        });
    }

    let user = User::create(valid_name, is_superuser);
    group_repo::insert_user(conn, &user)?;
    info!(user = %user.username, superuser = is_superuser, "user added");
    Ok(user)
}

pub fn assign_group(conn: &Connection, username: &str, group: &str) -> TrackResult<()> {
    let user = group_repo::find_user_by_username(conn, username)?
        .ok_or_else(|| TrackError::not_found("User", username))?;
    let role = Role::from_name(group)
        .ok_or_else(|| TrackError::validation("group", format!("unknown group '{}'", group)))?;

    group_repo::ensure_group(conn, role.name())?;
    group_repo::add_user_to_group(conn, user.id, role.name())?;
    info!(user = %user.username, group = role.name(), "user added to group");
    Ok(())
}

/// Builds the acting principal from a stored user and their groups.
pub fn load_principal(conn: &Connection, username: &str) -> TrackResult<Principal> {
    let user = group_repo::find_user_by_username(conn, username)?
        .ok_or_else(|| TrackError::not_found("User", username))?;

    let mut roles = Vec::new();
    for name in group_repo::find_user_groups(conn, user.id)? {
        match Role::from_name(&name) {
            Some(role) => roles.push(role),
            None => warn!(user = %user.username, group = %name, "ignoring unknown group"),
        }
    }

    Ok(Principal::new(user.username, roles, user.is_superuser))
}
