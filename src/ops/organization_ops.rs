use rusqlite::Connection;
use tracing::info;

use crate::db::{organization_repo, unit_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::{Id, Organization, Unit};
use crate::permissions::{Permission, Principal};
use crate::validation::{self, trim_optional};

pub fn create_organization(
    conn: &Connection,
    principal: &Principal,
    name: &str,
    unit_id: Option<Id<Unit>>,
    description: Option<&str>,
) -> TrackResult<Organization> {
    principal.require(Permission::AddOrganization)?;

    let valid_name = validation::non_blank(name, "name")?;
    if organization_repo::find_by_name(conn, &valid_name)?.is_some() {
        return Err(TrackError::AlreadyExists {
            entity_type: "Organization".into(),
            identifier: valid_name,
        });
    }
    if let Some(unit) = unit_id {
        unit_repo::find_by_id(conn, unit)?
            .ok_or_else(|| TrackError::validation("unit", format!("no unit with id {}", unit)))?;
    }

    let mut org = Organization::create(valid_name);
    org.unit_id = unit_id;
    org.description = trim_optional(description);
    organization_repo::insert(conn, &org)?;

    info!(organization = %org.id, name = %org.name, "organization created");
    Ok(org)
}

pub fn rename_organization(
    conn: &Connection,
    principal: &Principal,
    id: Id<Organization>,
    name: &str,
) -> TrackResult<Organization> {
    principal.require(Permission::ChangeOrganization)?;

    let mut org = organization_repo::find_by_id(conn, id)?
        .ok_or_else(|| TrackError::not_found("Organization", id))?;
    let valid_name = validation::non_blank(name, "name")?;
    if let Some(existing) = organization_repo::find_by_name(conn, &valid_name)? {
        if existing.id != id {
            return Err(TrackError::AlreadyExists {
                entity_type: "Organization".into(),
                identifier: valid_name,
            });
        }
    }

    org.name = valid_name;
    organization_repo::update(conn, &org)?;
    Ok(org)
}

/// Refuses while positions or callings still belong to the organization.
pub fn delete_organization(
    conn: &Connection,
    principal: &Principal,
    id: Id<Organization>,
) -> TrackResult<()> {
    principal.require(Permission::DeleteOrganization)?;

    organization_repo::find_by_id(conn, id)?
        .ok_or_else(|| TrackError::not_found("Organization", id))?;
    if organization_repo::count_dependents(conn, id)? > 0 {
        return Err(TrackError::InUse {
            entity_type: "Organization".into(),
            id: id.to_string(),
        });
    }

    organization_repo::delete(conn, id)?;
    info!(organization = %id, "organization deleted");
    Ok(())
}
