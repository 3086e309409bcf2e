use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::member::Member;
use super::organization::Organization;
use super::position::Position;
use super::unit::Unit;
use crate::validation::LifecycleDates;

/// Suffix shown after a holder's name while the calling is not released.
pub const NOT_RELEASED_MARKER: &str = " (N/R)";

/// Where a calling is in its lifecycle. The model is permissive: any status
/// may be set administratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallingStatus {
    Pending,
    Approved,
    HcApproved,
    OnHold,
    Called,
    Released,
    Cancelled,
    Completed,
    LcrUpdated,
}

impl CallingStatus {
    pub const ALL: &'static [CallingStatus] = &[
        CallingStatus::Pending,
        CallingStatus::Approved,
        CallingStatus::HcApproved,
        CallingStatus::OnHold,
        CallingStatus::Called,
        CallingStatus::Released,
        CallingStatus::Cancelled,
        CallingStatus::Completed,
        CallingStatus::LcrUpdated,
    ];

    /// Statuses after which a calling no longer fills its position.
    pub const TERMINAL: &'static [CallingStatus] = &[
        CallingStatus::Completed,
        CallingStatus::Cancelled,
        CallingStatus::LcrUpdated,
        CallingStatus::Released,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CallingStatus::Pending => "Pending",
            CallingStatus::Approved => "Approved",
            CallingStatus::HcApproved => "HC Approved",
            CallingStatus::OnHold => "On Hold",
            CallingStatus::Called => "Called",
            CallingStatus::Released => "Released",
            CallingStatus::Cancelled => "Cancelled",
            CallingStatus::Completed => "Completed",
            CallingStatus::LcrUpdated => "LCR Updated",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(CallingStatus::Pending),
            "APPROVED" => Some(CallingStatus::Approved),
            "HC_APPROVED" => Some(CallingStatus::HcApproved),
            "ON_HOLD" => Some(CallingStatus::OnHold),
            "CALLED" => Some(CallingStatus::Called),
            "RELEASED" => Some(CallingStatus::Released),
            "CANCELLED" => Some(CallingStatus::Cancelled),
            "COMPLETED" => Some(CallingStatus::Completed),
            "LCR_UPDATED" => Some(CallingStatus::LcrUpdated),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CallingStatus::Pending => "PENDING",
            CallingStatus::Approved => "APPROVED",
            CallingStatus::HcApproved => "HC_APPROVED",
            CallingStatus::OnHold => "ON_HOLD",
            CallingStatus::Called => "CALLED",
            CallingStatus::Released => "RELEASED",
            CallingStatus::Cancelled => "CANCELLED",
            CallingStatus::Completed => "COMPLETED",
            CallingStatus::LcrUpdated => "LCR_UPDATED",
        }
    }

    /// Lenient parse for user input: accepts labels in any case, with
    /// spaces or dashes in place of underscores.
    pub fn parse_label(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        Self::from_db_str(&normalized)
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    pub fn badge(&self) -> StatusBadge {
        StatusBadge::for_label(self.to_db_str())
    }
}

/// Presentation category for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusBadge {
    Warning,
    Success,
    Danger,
    Info,
    Secondary,
}

impl StatusBadge {
    /// Total over all strings; labels without a mapping are `Secondary`.
    pub fn for_label(label: &str) -> Self {
        match label {
            "PENDING" | "ON_HOLD" => StatusBadge::Warning,
            "APPROVED" => StatusBadge::Success,
            "CANCELLED" => StatusBadge::Danger,
            "LCR_UPDATED" => StatusBadge::Info,
            _ => StatusBadge::Secondary,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            StatusBadge::Warning => "warning",
            StatusBadge::Success => "success",
            StatusBadge::Danger => "danger",
            StatusBadge::Info => "info",
            StatusBadge::Secondary => "secondary",
        }
    }
}

/// The member holding a calling, with the name joined in from the member row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub member_id: Id<Member>,
    pub name: String,
}

impl From<&Member> for Holder {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.id,
            name: member.name.clone(),
        }
    }
}

/// An assignment of a person to a position within an organization and unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calling {
    pub id: Id<Calling>,
    pub unit_id: Id<Unit>,
    pub organization_id: Id<Organization>,
    pub position_id: Id<Position>,
    pub holder: Option<Holder>,
    pub home_unit_id: Option<Id<Unit>>,
    pub status: CallingStatus,
    pub is_active: bool,
    pub date_called: Option<NaiveDate>,
    pub date_sustained: Option<NaiveDate>,
    pub date_set_apart: Option<NaiveDate>,
    pub date_released: Option<NaiveDate>,
    pub presidency_approved: Option<NaiveDate>,
    pub hc_approved: Option<NaiveDate>,
    pub bishop_consulted_by: Option<String>,
    pub called_by: Option<String>,
    pub released_by: Option<String>,
    pub proposed_replacement: Option<String>,
    pub lcr_updated: bool,
    pub notes: Option<String>,
    pub release_notes: Option<String>,
}

impl Calling {
    pub fn create(
        unit_id: Id<Unit>,
        organization_id: Id<Organization>,
        position_id: Id<Position>,
        holder: Option<Holder>,
    ) -> Self {
        Self {
            id: Id::generate(),
            unit_id,
            organization_id,
            position_id,
            holder,
            home_unit_id: None,
            status: CallingStatus::Pending,
            is_active: true,
            date_called: None,
            date_sustained: None,
            date_set_apart: None,
            date_released: None,
            presidency_approved: None,
            hc_approved: None,
            bishop_consulted_by: None,
            called_by: None,
            released_by: None,
            proposed_replacement: None,
            lcr_updated: false,
            notes: None,
            release_notes: None,
        }
    }

    pub fn dates(&self) -> LifecycleDates {
        LifecycleDates {
            called: self.date_called,
            sustained: self.date_sustained,
            set_apart: self.date_set_apart,
            released: self.date_released,
        }
    }

    pub fn holder_name(&self) -> Option<&str> {
        self.holder.as_ref().map(|h| h.name.as_str())
    }

    /// Holder name, marked "(N/R)" until a release date is recorded.
    pub fn display_name(&self) -> Option<String> {
        let name = self.holder_name()?;
        if self.date_released.is_none() {
            Some(format!("{}{}", name, NOT_RELEASED_MARKER))
        } else {
            Some(name.to_string())
        }
    }

    pub fn status_badge(&self) -> StatusBadge {
        self.status.badge()
    }

    /// Whether this calling still counts as filling its position.
    pub fn is_current(&self) -> bool {
        !self.status.is_terminal() && self.date_released.is_none()
    }

    /// The automatic PENDING -> APPROVED step taken whenever a presidency
    /// approval date is present. Returns true if the status changed.
    pub fn apply_auto_approval(&mut self) -> bool {
        if self.presidency_approved.is_some() && self.status == CallingStatus::Pending {
            self.status = CallingStatus::Approved;
            true
        } else {
            false
        }
    }
}
