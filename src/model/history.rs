use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::calling::Calling;
use super::ids::Id;
use super::member::Member;
use crate::error::TrackResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryAction {
    Called,
    Released,
    Updated,
}

impl HistoryAction {
    pub fn display_name(&self) -> &'static str {
        match self {
            HistoryAction::Called => "Called",
            HistoryAction::Released => "Released",
            HistoryAction::Updated => "Updated",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CALLED" => Some(HistoryAction::Called),
            "RELEASED" => Some(HistoryAction::Released),
            "UPDATED" => Some(HistoryAction::Updated),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            HistoryAction::Called => "CALLED",
            HistoryAction::Released => "RELEASED",
            HistoryAction::Updated => "UPDATED",
        }
    }
}

/// An append-only audit entry describing one change to a calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallingHistory {
    pub id: Id<CallingHistory>,
    pub calling_id: Id<Calling>,
    pub action: HistoryAction,
    pub member_id: Option<Id<Member>>,
    /// The calling's field values right after the change.
    pub snapshot: Value,
    /// Username of whoever made the change; `None` for batch imports.
    pub changed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl CallingHistory {
    pub fn record(
        calling: &Calling,
        action: HistoryAction,
        changed_by: Option<&str>,
        notes: Option<String>,
    ) -> TrackResult<Self> {
        Ok(Self {
            id: Id::generate(),
            calling_id: calling.id,
            action,
            member_id: calling.holder.as_ref().map(|h| h.member_id),
            snapshot: serde_json::to_value(calling)?,
            changed_by: changed_by.map(|s| s.to_string()),
            changed_at: Utc::now(),
            notes,
        })
    }
}
