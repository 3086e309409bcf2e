use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{calling_repo, history_repo, member_repo, organization_repo, position_repo, unit_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::{
    Calling, CallingHistory, CallingStatus, HistoryAction, Holder, Id, Member, Organization,
    Position, Unit,
};
use crate::permissions::{Permission, Principal};
use crate::validation::{self, trim_optional};

/// Field edits for a calling. `None` leaves a field alone; `Some(None)` clears it.
///
/// `new_member` names a member to create as the holder, homed at the calling's
/// home unit or else its unit. It takes precedence over `member_id` and is
/// only created if the whole edit succeeds.
#[derive(Debug, Clone, Default)]
pub struct CallingChanges {
    pub member_id: Option<Option<Id<Member>>>,
    pub new_member: Option<String>,
    pub home_unit_id: Option<Option<Id<Unit>>>,
    pub date_called: Option<Option<NaiveDate>>,
    pub date_sustained: Option<Option<NaiveDate>>,
    pub date_set_apart: Option<Option<NaiveDate>>,
    /// A planned release. The calling stays in its status until released.
    pub date_released: Option<Option<NaiveDate>>,
    pub presidency_approved: Option<Option<NaiveDate>>,
    pub hc_approved: Option<Option<NaiveDate>>,
    pub bishop_consulted_by: Option<Option<String>>,
    pub called_by: Option<Option<String>>,
    pub proposed_replacement: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseRequest {
    pub date_released: Option<NaiveDate>,
    pub released_by: Option<String>,
    pub release_notes: Option<String>,
}

pub fn get_calling(conn: &Connection, id: Id<Calling>) -> TrackResult<Calling> {
    calling_repo::find_by_id(conn, id)?.ok_or_else(|| TrackError::not_found("Calling", id))
}

pub fn create_calling(
    conn: &Connection,
    principal: &Principal,
    unit_id: Id<Unit>,
    organization_id: Id<Organization>,
    position_id: Id<Position>,
    changes: &CallingChanges,
) -> TrackResult<Calling> {
    principal.require(Permission::AddCalling)?;

    unit_repo::find_by_id(conn, unit_id)?
        .ok_or_else(|| TrackError::validation("unit", format!("no unit with id {}", unit_id)))?;
    organization_repo::find_by_id(conn, organization_id)?.ok_or_else(|| {
        TrackError::validation(
            "organization",
            format!("no organization with id {}", organization_id),
        )
    })?;
    let position = position_repo::find_by_id(conn, position_id)?.ok_or_else(|| {
        TrackError::validation("position", format!("no position with id {}", position_id))
    })?;
    if position.organization_id != organization_id {
        return Err(TrackError::validation(
            "position",
            format!("'{}' does not belong to this organization", position.title),
        ));
    }

    let tx = conn.unchecked_transaction()?;
    let mut calling = Calling::create(unit_id, organization_id, position_id, None);
    apply_changes(&tx, &mut calling, changes)?;
    validation::date_order(&calling.dates())?;
    calling.apply_auto_approval();

    calling_repo::insert(&tx, &calling)?;
    append_history(&tx, &calling, HistoryAction::Called, Some(&principal.username), None)?;
    tx.commit()?;

    info!(calling = %calling.id, status = calling.status.to_db_str(), "calling created");
    Ok(calling)
}

pub fn update_calling(
    conn: &Connection,
    principal: &Principal,
    id: Id<Calling>,
    changes: &CallingChanges,
) -> TrackResult<Calling> {
    principal.require(Permission::ChangeCalling)?;

    let tx = conn.unchecked_transaction()?;
    let mut calling = get_calling(&tx, id)?;
    apply_changes(&tx, &mut calling, changes)?;
    validation::date_order(&calling.dates())?;
    calling.apply_auto_approval();

    calling_repo::update(&tx, &calling)?;
    append_history(&tx, &calling, HistoryAction::Updated, Some(&principal.username), None)?;
    tx.commit()?;
    info!(calling = %id, "calling updated");
    Ok(calling)
}

/// Stamps the presidency approval date. A pending calling becomes approved.
/// Repeating an approval already on record writes nothing.
pub fn record_approval(
    conn: &Connection,
    principal: &Principal,
    id: Id<Calling>,
    approved_on: NaiveDate,
) -> TrackResult<Calling> {
    principal.require(Permission::ApproveCalling)?;

    let mut calling = get_calling(conn, id)?;
    if calling.presidency_approved == Some(approved_on) && calling.status != CallingStatus::Pending {
        debug!(calling = %id, "approval already recorded");
        return Ok(calling);
    }

    calling.presidency_approved = Some(approved_on);
    calling.apply_auto_approval();

    save(conn, &calling, HistoryAction::Updated, principal, None)?;
    info!(calling = %id, status = calling.status.to_db_str(), "presidency approval recorded");
    Ok(calling)
}

/// Stamps the high council approval date. An approved calling becomes HC approved.
pub fn record_hc_approval(
    conn: &Connection,
    principal: &Principal,
    id: Id<Calling>,
    approved_on: NaiveDate,
) -> TrackResult<Calling> {
    principal.require(Permission::ApproveCalling)?;

    let mut calling = get_calling(conn, id)?;
    if calling.hc_approved == Some(approved_on) && calling.status != CallingStatus::Approved {
        debug!(calling = %id, "hc approval already recorded");
        return Ok(calling);
    }

    calling.hc_approved = Some(approved_on);
    if calling.status == CallingStatus::Approved {
        calling.status = CallingStatus::HcApproved;
    }

    save(conn, &calling, HistoryAction::Updated, principal, None)?;
    info!(calling = %id, status = calling.status.to_db_str(), "hc approval recorded");
    Ok(calling)
}

/// Sets any status. There is no transition table; administrators may move a
/// calling anywhere.
pub fn set_status(
    conn: &Connection,
    principal: &Principal,
    id: Id<Calling>,
    status: CallingStatus,
) -> TrackResult<Calling> {
    principal.require(Permission::ChangeCalling)?;

    let mut calling = get_calling(conn, id)?;
    let previous = calling.status;
    calling.status = status;
    if status == CallingStatus::LcrUpdated {
        calling.lcr_updated = true;
    }

    save(conn, &calling, HistoryAction::Updated, principal, None)?;
    info!(
        calling = %id,
        from = previous.to_db_str(),
        to = status.to_db_str(),
        "calling status changed"
    );
    Ok(calling)
}

pub fn mark_lcr_updated(
    conn: &Connection,
    principal: &Principal,
    id: Id<Calling>,
) -> TrackResult<Calling> {
    set_status(conn, principal, id, CallingStatus::LcrUpdated)
}

pub fn release(
    conn: &Connection,
    principal: &Principal,
    id: Id<Calling>,
    request: &ReleaseRequest,
) -> TrackResult<Calling> {
    principal.require(Permission::ChangeCalling)?;

    let date_released = validation::required(request.date_released, "date_released")?;
    let release_notes = validation::required(
        trim_optional(request.release_notes.as_deref()),
        "release_notes",
    )?;

    let mut calling = get_calling(conn, id)?;
    calling.date_released = Some(date_released);
    validation::date_order(&calling.dates())?;

    calling.status = CallingStatus::Released;
    calling.is_active = false;
    calling.released_by = trim_optional(request.released_by.as_deref());
    calling.release_notes = Some(release_notes.clone());

    save(conn, &calling, HistoryAction::Released, principal, Some(release_notes))?;
    info!(calling = %id, released = %date_released, "calling released");
    Ok(calling)
}

pub fn delete_calling(conn: &Connection, principal: &Principal, id: Id<Calling>) -> TrackResult<()> {
    principal.require(Permission::DeleteCalling)?;

    get_calling(conn, id)?;
    calling_repo::delete(conn, id)?;
    info!(calling = %id, "calling deleted");
    Ok(())
}

pub fn history(conn: &Connection, id: Id<Calling>) -> TrackResult<Vec<CallingHistory>> {
    get_calling(conn, id)?;
    history_repo::find_by_calling(conn, id)
}

/// Writes the calling and its history entry together.
fn save(
    conn: &Connection,
    calling: &Calling,
    action: HistoryAction,
    principal: &Principal,
    notes: Option<String>,
) -> TrackResult<()> {
    let tx = conn.unchecked_transaction()?;
    calling_repo::update(&tx, calling)?;
    append_history(&tx, calling, action, Some(&principal.username), notes)?;
    tx.commit()?;
    Ok(())
}

/// Appends a history entry snapshotting the calling as it now stands.
pub(crate) fn append_history(
    conn: &Connection,
    calling: &Calling,
    action: HistoryAction,
    changed_by: Option<&str>,
    notes: Option<String>,
) -> TrackResult<()> {
    let entry = CallingHistory::record(calling, action, changed_by, notes)?;
    history_repo::insert(conn, &entry)
}

fn apply_changes(conn: &Connection, calling: &mut Calling, changes: &CallingChanges) -> TrackResult<()> {
    if let Some(home_unit_id) = changes.home_unit_id {
        if let Some(unit_id) = home_unit_id {
            unit_repo::find_by_id(conn, unit_id)?.ok_or_else(|| {
                TrackError::validation("home_unit", format!("no unit with id {}", unit_id))
            })?;
        }
        calling.home_unit_id = home_unit_id;
    }
    if let Some(name) = &changes.new_member {
        let name = validation::non_blank(name, "member")?;
        let member = Member::create(name, Some(calling.home_unit_id.unwrap_or(calling.unit_id)));
        member_repo::insert(conn, &member)?;
        debug!(member = %member.id, "holder created with calling");
        calling.holder = Some(Holder::from(&member));
    } else if let Some(member_id) = changes.member_id {
        calling.holder = match member_id {
            Some(member_id) => {
                let member = member_repo::find_by_id(conn, member_id)?.ok_or_else(|| {
                    TrackError::validation("member", format!("no member with id {}", member_id))
                })?;
                Some(Holder::from(&member))
            }
            None => None,
        };
    }
    if let Some(d) = changes.date_called {
        calling.date_called = d;
    }
    if let Some(d) = changes.date_sustained {
        calling.date_sustained = d;
    }
    if let Some(d) = changes.date_set_apart {
        calling.date_set_apart = d;
    }
    if let Some(d) = changes.date_released {
        calling.date_released = d;
    }
    if let Some(d) = changes.presidency_approved {
        calling.presidency_approved = d;
    }
    if let Some(d) = changes.hc_approved {
        calling.hc_approved = d;
    }
    if let Some(v) = &changes.bishop_consulted_by {
        calling.bishop_consulted_by = trim_optional(v.as_deref());
    }
    if let Some(v) = &changes.called_by {
        calling.called_by = trim_optional(v.as_deref());
    }
    if let Some(v) = &changes.proposed_replacement {
        calling.proposed_replacement = trim_optional(v.as_deref());
    }
    if let Some(v) = &changes.notes {
        calling.notes = trim_optional(v.as_deref());
    }
    Ok(())
}
