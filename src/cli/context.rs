use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{member_repo, organization_repo, position_repo, unit_repo};
use crate::error::{TrackError, TrackResult};
use crate::import::values::parse_sheet_date;
use crate::model::*;
use crate::ops::group_ops;
use crate::permissions::Principal;

pub struct CliContext {
    pub conn: Connection,
    pub acting_user: Option<String>,
    pub json: bool,
    pub page_size: usize,
}

impl CliContext {
    pub fn new(conn: Connection, acting_user: Option<String>, json: bool, page_size: usize) -> Self {
        Self {
            conn,
            acting_user,
            json,
            page_size,
        }
    }

    /// The user named by `--as`, with their group grants.
    pub fn principal(&self) -> TrackResult<Principal> {
        let username = self.acting_user.as_deref().ok_or_else(|| {
            TrackError::Config("this command needs --as <USER> (or CALLTRACK_USER)".into())
        })?;
        group_ops::load_principal(&self.conn, username)
    }

    pub fn unit_by_name(&self, name: &str) -> TrackResult<Unit> {
        unit_repo::find_by_name(&self.conn, name.trim())?
            .ok_or_else(|| TrackError::not_found("Unit", name.trim()))
    }

    pub fn organization_by_name(&self, name: &str) -> TrackResult<Organization> {
        organization_repo::find_by_name(&self.conn, name.trim())?
            .ok_or_else(|| TrackError::not_found("Organization", name.trim()))
    }

    pub fn position_by_title(&self, organization: &Organization, title: &str) -> TrackResult<Position> {
        position_repo::find_by_title(&self.conn, organization.id, title.trim())?.ok_or_else(|| {
            TrackError::not_found("Position", format!("{} / {}", organization.name, title.trim()))
        })
    }

    /// Exactly one member with this name must exist.
    pub fn member_by_name(&self, name: &str) -> TrackResult<Member> {
        let mut matches = member_repo::find_by_name(&self.conn, name.trim())?;
        match matches.len() {
            0 => Err(TrackError::not_found("Member", name.trim())),
            1 => Ok(matches.remove(0)),
            n => Err(TrackError::validation(
                "member",
                format!("{} members are named '{}'; use the member id", n, name.trim()),
            )),
        }
    }

    /// A member named by id or by unique name.
    pub fn member(&self, id_or_name: &str) -> TrackResult<Member> {
        if let Ok(id) = Id::<Member>::parse(id_or_name) {
            return member_repo::find_by_id(&self.conn, id)?
                .ok_or_else(|| TrackError::not_found("Member", id));
        }
        self.member_by_name(id_or_name)
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> TrackResult<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn print_error(e: &TrackError) {
        eprintln!("Error: {}", e);
    }
}

/// clap value parser for dates on the command line.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_sheet_date(s).ok_or_else(|| format!("'{}' is not a date (use YYYY-MM-DD or MM/DD/YYYY)", s))
}

pub fn parse_calling_id(s: &str) -> Result<Id<Calling>, String> {
    Id::parse(s).map_err(|e| format!("'{}' is not a calling id: {}", s, e))
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into())
}
