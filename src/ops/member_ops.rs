use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{member_repo, unit_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::{Id, Member, Unit};
use crate::permissions::{Permission, Principal};
use crate::validation;

pub fn add_member(
    conn: &Connection,
    principal: &Principal,
    name: &str,
    home_unit_id: Option<Id<Unit>>,
) -> TrackResult<Member> {
    principal.require(Permission::AddCalling)?;

    let valid_name = validation::non_blank(name, "name")?;
    if let Some(unit) = home_unit_id {
        unit_repo::find_by_id(conn, unit)?
            .ok_or_else(|| TrackError::validation("home_unit", format!("no unit with id {}", unit)))?;
    }

    let member = Member::create(valid_name, home_unit_id);
    member_repo::insert(conn, &member)?;
    Ok(member)
}

/// Deletes members whose whole name is a date such as `06/29/2025`, left
/// behind by spreadsheets that put dates in name columns. Callings that
/// pointed at them keep their record without a holder.
pub fn cleanup_date_like_members(conn: &Connection) -> TrackResult<Vec<Member>> {
    let doomed: Vec<Member> = member_repo::find_all(conn)?
        .into_iter()
        .filter(|m| is_date_name(&m.name))
        .collect();

    let tx = conn.unchecked_transaction()?;
    for member in &doomed {
        warn!(member = %member.id, name = %member.name, "removing date-like member");
        member_repo::delete(&tx, member.id)?;
    }
    tx.commit()?;

    info!(removed = doomed.len(), "member cleanup finished");
    Ok(doomed)
}

/// `D{1,2}[/-]D{1,2}[/-]D{2,4}`, surrounding whitespace allowed.
pub fn is_date_name(name: &str) -> bool {
    let parts: Vec<&str> = name.trim().split(['/', '-']).collect();
    if parts.len() != 3 {
        return false;
    }
    let widths = [(1, 2), (1, 2), (2, 4)];
    parts.iter().zip(widths).all(|(part, (min, max))| {
        (min..=max).contains(&part.len()) && part.chars().all(|c| c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_names_are_recognized() {
        assert!(is_date_name("06/29/2025"));
        assert!(is_date_name(" 6-1-25 "));
        assert!(is_date_name("12/3-2024"));
    }

    #[test]
    fn real_names_are_kept() {
        assert!(!is_date_name("Jane Smith"));
        assert!(!is_date_name("06/29"));
        assert!(!is_date_name("2025-06-29"));
        assert!(!is_date_name("06/29/20255"));
        assert!(!is_date_name("ab/cd/efgh"));
    }
}
