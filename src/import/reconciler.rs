use std::fmt;

use chrono::Utc;
use rusqlite::Connection;
use tracing::debug;

use super::layout::{self, completed, open};
use super::row::{CarryForward, SheetRow};
use super::values::looks_like_date;
use super::{ChangeCounts, ImportKind};
use crate::db::{calling_repo, member_repo, organization_repo, position_repo, unit_repo};
use crate::error::TrackResult;
use crate::model::{
    Calling, CallingStatus, HistoryAction, Holder, Id, Member, Organization, Position, Unit,
    UnitType,
};
use crate::ops::calling_ops::append_history;
use crate::validation::{self, LifecycleDates};

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Applied(ChangeCounts),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    MissingContext,
    MissingHolder,
    DateLikeName(String),
    DateOrder(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => write!(f, "blank row"),
            SkipReason::MissingContext => write!(f, "no unit, organization or position"),
            SkipReason::MissingHolder => write!(f, "no member name"),
            SkipReason::DateLikeName(name) => write!(f, "name looks like a date: {}", name),
            SkipReason::DateOrder(msg) => write!(f, "dates out of order: {}", msg),
        }
    }
}

/// Reconciles one row against the store inside its own transaction. The row
/// is committed only when applied; a skip or an error leaves nothing behind.
pub fn apply_row(
    conn: &Connection,
    kind: ImportKind,
    carry: &CarryForward,
    row: &SheetRow,
) -> TrackResult<RowOutcome> {
    if row.is_blank() {
        return Ok(RowOutcome::Skipped(SkipReason::Blank));
    }
    let (Some(unit_name), Some(org_name), Some(title)) = (
        carry.unit.as_deref(),
        carry.organization.as_deref(),
        row.text(layout::POSITION),
    ) else {
        return Ok(RowOutcome::Skipped(SkipReason::MissingContext));
    };

    let place = Place {
        unit: unit_name,
        organization: org_name,
        position: title,
    };
    match kind {
        ImportKind::Open => apply_open(conn, &place, row),
        ImportKind::Completed => apply_completed(conn, &place, row),
    }
}

struct Place<'a> {
    unit: &'a str,
    organization: &'a str,
    position: &'a str,
}

struct Resolved {
    unit: Id<Unit>,
    organization: Id<Organization>,
    position: Id<Position>,
}

fn apply_open(conn: &Connection, place: &Place, row: &SheetRow) -> TrackResult<RowOutcome> {
    let released_name = row.name(open::CURRENTLY_CALLED);
    let called_name = row.name(open::NAME);
    if let Some(reason) = date_like(&[released_name, called_name]) {
        return Ok(RowOutcome::Skipped(reason));
    }

    let dates = LifecycleDates {
        called: row.date(open::DATE_CALLED),
        sustained: row.date(open::SUSTAINED),
        set_apart: row.date(open::SET_APART),
        released: None,
    };
    if called_name.is_some() {
        if let Err(e) = validation::date_order(&dates) {
            return Ok(RowOutcome::Skipped(SkipReason::DateOrder(e.to_string())));
        }
    }

    let tx = conn.unchecked_transaction()?;
    let mut changes = ChangeCounts::default();
    let at = resolve_place(&tx, place, &mut changes)?;

    if let Some(name) = released_name {
        match calling_repo::find_called_by_holder_name(&tx, at.unit, at.position, name)? {
            Some(mut calling) => {
                calling.status = CallingStatus::Released;
                calling.is_active = false;
                if let Some(by) = row.name(open::RELEASED_BY) {
                    calling.released_by = Some(by.to_string());
                }
                calling_repo::update(&tx, &calling)?;
                append_history(&tx, &calling, HistoryAction::Released, None, None)?;
                changes.callings.updated += 1;
                debug!(line = row.line, calling = %calling.id, holder = name, "released by import");
            }
            None => {
                resolve_named_member(&tx, name, at.unit, &mut changes)?;
            }
        }
    }

    if let Some(name) = called_name {
        let home_unit = match row.name(open::HOME_UNIT) {
            Some(home) => resolve_unit(&tx, home, &mut changes)?,
            None => at.unit,
        };
        let member = resolve_member(&tx, name, home_unit, &mut changes)?;
        let notes = format!("Imported from CSV on {}", Utc::now().format("%Y-%m-%d"));

        upsert_calling(
            &tx,
            &at,
            &member,
            Some(CallingStatus::Called),
            notes,
            |c| {
                c.status = CallingStatus::Called;
                c.is_active = true;
                c.home_unit_id = Some(home_unit);
                c.date_called = dates.called;
                c.date_sustained = dates.sustained;
                c.date_set_apart = dates.set_apart;
                c.presidency_approved = row.date(open::PRESIDENCY_APPROVED);
                c.hc_approved = row.date(open::HC_APPROVED);
                c.bishop_consulted_by = row.name(open::BISHOP_CONSULTED_BY).map(str::to_string);
                c.called_by = row.name(open::CALLED_BY).map(str::to_string);
                c.lcr_updated = row.flag(open::LCR_UPDATED);
            },
            &mut changes,
        )?;
    }

    tx.commit()?;
    Ok(RowOutcome::Applied(changes))
}

fn apply_completed(conn: &Connection, place: &Place, row: &SheetRow) -> TrackResult<RowOutcome> {
    let Some(holder_name) = row.name(completed::HOLDER) else {
        return Ok(RowOutcome::Skipped(SkipReason::MissingHolder));
    };
    if let Some(reason) = date_like(&[Some(holder_name)]) {
        return Ok(RowOutcome::Skipped(reason));
    }

    let dates = LifecycleDates {
        called: row.date(completed::DATE_CALLED),
        sustained: row.date(completed::SUSTAINED),
        set_apart: row.date(completed::SET_APART),
        released: row.date(completed::DATE_RELEASED),
    };
    if let Err(e) = validation::date_order(&dates) {
        return Ok(RowOutcome::Skipped(SkipReason::DateOrder(e.to_string())));
    }

    let tx = conn.unchecked_transaction()?;
    let mut changes = ChangeCounts::default();
    let at = resolve_place(&tx, place, &mut changes)?;

    let home_name = row.name(completed::HOME_UNIT);
    let home_unit = match home_name {
        Some(home) => Some(resolve_unit(&tx, home, &mut changes)?),
        None => None,
    };
    let member = match holder_at_place(&tx, &at, holder_name)? {
        Some(member) => member,
        None => resolve_member(&tx, holder_name, home_unit.unwrap_or(at.unit), &mut changes)?,
    };

    let released_by = row.name(completed::RELEASED_BY);
    let replacement = row.name(completed::PROPOSED_REPLACEMENT);
    let mut notes = vec!["Imported from completed callings.".to_string()];
    if let Some(by) = released_by {
        notes.push(format!("Released by: {}", by));
    }
    if let Some(r) = replacement {
        notes.push(format!("Proposed replacement: {}", r));
    }
    if let Some(home) = home_name {
        notes.push(format!("Home unit: {}", home));
    }

    upsert_calling(
        &tx,
        &at,
        &member,
        None,
        notes.join(" "),
        |c| {
            c.status = CallingStatus::Completed;
            c.is_active = false;
            c.home_unit_id = home_unit.or(c.home_unit_id).or(Some(at.unit));
            c.date_called = dates.called;
            c.date_sustained = dates.sustained;
            c.date_set_apart = dates.set_apart;
            c.date_released = dates.released;
            c.presidency_approved = row.date(completed::PRESIDENCY_APPROVED);
            c.hc_approved = row.date(completed::HC_APPROVED);
            c.bishop_consulted_by = row.name(completed::BISHOP_CONSULTED_BY).map(str::to_string);
            c.called_by = row.name(completed::CALLED_BY).map(str::to_string);
            c.released_by = released_by.map(str::to_string);
            c.proposed_replacement = replacement.map(str::to_string);
            c.lcr_updated = row.flag(completed::LCR_UPDATED);
        },
        &mut changes,
    )?;

    tx.commit()?;
    Ok(RowOutcome::Applied(changes))
}

fn date_like(names: &[Option<&str>]) -> Option<SkipReason> {
    names
        .iter()
        .flatten()
        .find(|name| looks_like_date(name))
        .map(|name| SkipReason::DateLikeName(name.to_string()))
}

fn resolve_place(conn: &Connection, place: &Place, changes: &mut ChangeCounts) -> TrackResult<Resolved> {
    let unit = resolve_unit(conn, place.unit, changes)?;
    let organization = resolve_organization(conn, place.organization, changes)?;
    let position = resolve_position(conn, organization, place.position, changes)?;
    Ok(Resolved {
        unit,
        organization,
        position,
    })
}

fn resolve_unit(conn: &Connection, name: &str, changes: &mut ChangeCounts) -> TrackResult<Id<Unit>> {
    if let Some(unit) = unit_repo::find_by_name(conn, name)? {
        return Ok(unit.id);
    }
    let unit = Unit::create(name.to_string(), UnitType::infer_from_name(name));
    unit_repo::insert(conn, &unit)?;
    changes.units.created += 1;
    debug!(unit = %unit.name, unit_type = unit.unit_type.to_db_str(), "unit created by import");
    Ok(unit.id)
}

fn resolve_organization(
    conn: &Connection,
    name: &str,
    changes: &mut ChangeCounts,
) -> TrackResult<Id<Organization>> {
    if let Some(org) = organization_repo::find_by_name(conn, name)? {
        return Ok(org.id);
    }
    let org = Organization::create(name.to_string());
    organization_repo::insert(conn, &org)?;
    changes.organizations.created += 1;
    debug!(organization = %org.name, "organization created by import");
    Ok(org.id)
}

fn resolve_position(
    conn: &Connection,
    organization_id: Id<Organization>,
    title: &str,
    changes: &mut ChangeCounts,
) -> TrackResult<Id<Position>> {
    if let Some(position) = position_repo::find_by_title(conn, organization_id, title)? {
        return Ok(position.id);
    }
    let mut position = Position::create(organization_id, title.to_string());
    position.is_leadership = Position::is_leadership_title(title);
    position_repo::insert(conn, &position)?;
    changes.positions.created += 1;
    debug!(position = %position.title, "position created by import");
    Ok(position.id)
}

/// Same name in the same home unit, else a same-named member with no home
/// unit (which is adopted into this one), else a new member.
fn resolve_member(
    conn: &Connection,
    name: &str,
    home_unit_id: Id<Unit>,
    changes: &mut ChangeCounts,
) -> TrackResult<Member> {
    let candidates = member_repo::find_by_name(conn, name)?;
    if let Some(member) = candidates.iter().find(|m| m.home_unit_id == Some(home_unit_id)) {
        return Ok(member.clone());
    }
    if let Some(mut member) = candidates.into_iter().find(|m| m.home_unit_id.is_none()) {
        member.home_unit_id = Some(home_unit_id);
        member_repo::update(conn, &member)?;
        changes.members.updated += 1;
        return Ok(member);
    }

    let member = Member::create(name.to_string(), Some(home_unit_id));
    member_repo::insert(conn, &member)?;
    changes.members.created += 1;
    Ok(member)
}

/// The member behind an existing calling at this place held by `name`, so a
/// row naming them reaches that calling whatever its home unit cell says.
fn holder_at_place(conn: &Connection, at: &Resolved, name: &str) -> TrackResult<Option<Member>> {
    let holder = calling_repo::find_by_place_and_holder_name(
        conn,
        at.unit,
        at.organization,
        at.position,
        name,
    )?
    .and_then(|c| c.holder);
    match holder {
        Some(holder) => member_repo::find_by_id(conn, holder.member_id),
        None => Ok(None),
    }
}

/// A holder named only to be released: any member with the name will do,
/// and one is created only when nobody has it.
fn resolve_named_member(
    conn: &Connection,
    name: &str,
    unit_id: Id<Unit>,
    changes: &mut ChangeCounts,
) -> TrackResult<Member> {
    if let Some(member) = member_repo::find_by_name(conn, name)?.into_iter().next() {
        return Ok(member);
    }
    let member = Member::create(name.to_string(), Some(unit_id));
    member_repo::insert(conn, &member)?;
    changes.members.created += 1;
    Ok(member)
}

/// Creates or refreshes the calling for (place, member). Notes are only
/// written on creation. An existing calling the row would not change is
/// left untouched and not counted.
fn upsert_calling(
    conn: &Connection,
    at: &Resolved,
    member: &Member,
    key_status: Option<CallingStatus>,
    notes: String,
    fill: impl Fn(&mut Calling),
    changes: &mut ChangeCounts,
) -> TrackResult<()> {
    let existing = calling_repo::find_by_key(
        conn,
        at.unit,
        at.organization,
        at.position,
        member.id,
        key_status,
    )?;

    match existing {
        Some(existing) => {
            let mut calling = existing.clone();
            fill(&mut calling);
            if calling != existing {
                calling_repo::update(conn, &calling)?;
                append_history(conn, &calling, HistoryAction::Updated, None, None)?;
                changes.callings.updated += 1;
            }
        }
        None => {
            let mut calling = Calling::create(
                at.unit,
                at.organization,
                at.position,
                Some(Holder::from(member)),
            );
            calling.notes = Some(notes);
            fill(&mut calling);
            calling_repo::insert(conn, &calling)?;
            append_history(conn, &calling, HistoryAction::Called, None, None)?;
            changes.callings.created += 1;
        }
    }
    Ok(())
}
