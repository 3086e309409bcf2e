use std::collections::HashSet;

use chrono::NaiveTime;
use rusqlite::Connection;
use tracing::info;

use crate::db::unit_repo;
use crate::error::{TrackError, TrackResult};
use crate::model::{Id, Unit, UnitType};
use crate::permissions::{Permission, Principal};
use crate::validation::{self, trim_optional};

#[derive(Debug, Clone, Default)]
pub struct UnitChanges {
    pub name: Option<String>,
    pub unit_type: Option<UnitType>,
    pub parent_id: Option<Option<Id<Unit>>>,
    pub meeting_time: Option<Option<NaiveTime>>,
    pub location: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

pub fn create_unit(
    conn: &Connection,
    principal: &Principal,
    name: &str,
    unit_type: UnitType,
    parent_id: Option<Id<Unit>>,
) -> TrackResult<Unit> {
    principal.require(Permission::AddUnit)?;

    let valid_name = validation::non_blank(name, "name")?;
    if unit_repo::find_by_name(conn, &valid_name)?.is_some() {
        return Err(TrackError::AlreadyExists {
            entity_type: "Unit".into(),
            identifier: valid_name,
        });
    }
    if let Some(parent) = parent_id {
        unit_repo::find_by_id(conn, parent)?
            .ok_or_else(|| TrackError::validation("parent_id", format!("no unit with id {}", parent)))?;
    }

    let mut unit = Unit::create(valid_name, unit_type);
    unit.parent_id = parent_id;
    unit_repo::insert(conn, &unit)?;

    info!(unit = %unit.id, name = %unit.name, "unit created");
    Ok(unit)
}

pub fn update_unit(
    conn: &Connection,
    principal: &Principal,
    id: Id<Unit>,
    changes: &UnitChanges,
) -> TrackResult<Unit> {
    principal.require(Permission::ChangeUnit)?;

    let mut unit = unit_repo::find_by_id(conn, id)?.ok_or_else(|| TrackError::not_found("Unit", id))?;

    if let Some(n) = &changes.name {
        let valid_name = validation::non_blank(n, "name")?;
        if let Some(existing) = unit_repo::find_by_name(conn, &valid_name)? {
            if existing.id != id {
                return Err(TrackError::AlreadyExists {
                    entity_type: "Unit".into(),
                    identifier: valid_name,
                });
            }
        }
        unit.name = valid_name;
    }
    if let Some(t) = changes.unit_type {
        unit.unit_type = t;
    }
    if let Some(parent_id) = changes.parent_id {
        if let Some(parent) = parent_id {
            check_parent(conn, id, parent)?;
        }
        unit.parent_id = parent_id;
    }
    if let Some(t) = changes.meeting_time {
        unit.meeting_time = t;
    }
    if let Some(loc) = &changes.location {
        unit.location = trim_optional(loc.as_deref());
    }
    if let Some(active) = changes.is_active {
        unit.is_active = active;
    }
    if let Some(order) = changes.sort_order {
        unit.sort_order = order;
    }

    unit_repo::update(conn, &unit)?;
    Ok(unit)
}

/// Refuses to delete a unit that callings still point at.
pub fn delete_unit(conn: &Connection, principal: &Principal, id: Id<Unit>) -> TrackResult<()> {
    principal.require(Permission::DeleteUnit)?;

    unit_repo::find_by_id(conn, id)?.ok_or_else(|| TrackError::not_found("Unit", id))?;
    if unit_repo::count_callings(conn, id)? > 0 {
        return Err(TrackError::InUse {
            entity_type: "Unit".into(),
            id: id.to_string(),
        });
    }

    unit_repo::delete(conn, id)?;
    info!(unit = %id, "unit deleted");
    Ok(())
}

// Walks up from the proposed parent; reaching `id` would close a cycle. A
// chain that loops without reaching `id` is already corrupt and is refused.
fn check_parent(conn: &Connection, id: Id<Unit>, parent: Id<Unit>) -> TrackResult<()> {
    let mut seen = HashSet::new();
    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if current == id {
            return Err(TrackError::validation(
                "parent_id",
                "a unit cannot be its own ancestor",
            ));
        }
        if !seen.insert(current) {
            return Err(TrackError::validation(
                "parent_id",
                format!("the ancestors of unit {} form a cycle", parent),
            ));
        }
        let unit = unit_repo::find_by_id(conn, current)?.ok_or_else(|| {
            TrackError::validation("parent_id", format!("no unit with id {}", current))
        })?;
        cursor = unit.parent_id;
    }
    Ok(())
}
