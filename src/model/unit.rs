use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    Ward,
    Branch,
    Stake,
}

impl UnitType {
    pub const ALL: &'static [UnitType] = &[UnitType::Ward, UnitType::Branch, UnitType::Stake];

    pub fn display_name(&self) -> &'static str {
        match self {
            UnitType::Ward => "Ward",
            UnitType::Branch => "Branch",
            UnitType::Stake => "Stake",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "WARD" => Some(UnitType::Ward),
            "BRANCH" => Some(UnitType::Branch),
            "STAKE" => Some(UnitType::Stake),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnitType::Ward => "WARD",
            UnitType::Branch => "BRANCH",
            UnitType::Stake => "STAKE",
        }
    }

    /// Guess the type from a unit name. Anything that is not obviously a
    /// stake or a branch is treated as a ward.
    pub fn infer_from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("stake") {
            UnitType::Stake
        } else if lower.contains("branch") {
            UnitType::Branch
        } else {
            UnitType::Ward
        }
    }
}

/// A ward, branch or stake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: Id<Unit>,
    pub name: String,
    pub unit_type: UnitType,
    pub parent_id: Option<Id<Unit>>,
    pub meeting_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl Unit {
    pub fn create(name: String, unit_type: UnitType) -> Self {
        Self {
            id: Id::generate(),
            name,
            unit_type,
            parent_id: None,
            meeting_time: None,
            location: None,
            is_active: true,
            sort_order: 0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.unit_type.display_name())
    }
}
