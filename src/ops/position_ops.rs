use rusqlite::Connection;
use tracing::info;

use crate::db::{organization_repo, position_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::{Id, Organization, Position};
use crate::permissions::{Permission, Principal};
use crate::validation::{self, trim_optional};

pub fn create_position(
    conn: &Connection,
    principal: &Principal,
    organization_id: Id<Organization>,
    title: &str,
    description: Option<&str>,
    requires_setting_apart: bool,
) -> TrackResult<Position> {
    principal.require(Permission::AddPosition)?;

    let valid_title = validation::non_blank(title, "title")?;
    organization_repo::find_by_id(conn, organization_id)?.ok_or_else(|| {
        TrackError::validation(
            "organization",
            format!("no organization with id {}", organization_id),
        )
    })?;
    if position_repo::find_by_title(conn, organization_id, &valid_title)?.is_some() {
        return Err(TrackError::AlreadyExists {
            entity_type: "Position".into(),
            identifier: valid_title,
        });
    }

    let mut position = Position::create(organization_id, valid_title);
    position.is_leadership = Position::is_leadership_title(&position.title);
    position.description = trim_optional(description);
    position.requires_setting_apart = requires_setting_apart;
    position_repo::insert(conn, &position)?;

    info!(position = %position.id, title = %position.title, "position created");
    Ok(position)
}

pub fn delete_position(conn: &Connection, principal: &Principal, id: Id<Position>) -> TrackResult<()> {
    principal.require(Permission::DeletePosition)?;

    position_repo::find_by_id(conn, id)?.ok_or_else(|| TrackError::not_found("Position", id))?;
    if position_repo::count_callings(conn, id)? > 0 {
        return Err(TrackError::InUse {
            entity_type: "Position".into(),
            id: id.to_string(),
        });
    }

    position_repo::delete(conn, id)?;
    info!(position = %id, "position deleted");
    Ok(())
}
