use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::organization::Organization;

/// Title fragments that mark a position as part of a leadership council.
pub const LEADERSHIP_TERMS: &[&str] = &[
    "president",
    "bishop",
    "counselor",
    "secretary",
    "clerk",
    "executive",
];

/// A named role within an organization, held by one person at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Id<Position>,
    pub organization_id: Id<Organization>,
    pub title: String,
    pub description: Option<String>,
    pub is_leadership: bool,
    pub requires_setting_apart: bool,
    pub display_order: i32,
    pub is_active: bool,
}

impl Position {
    pub fn create(organization_id: Id<Organization>, title: String) -> Self {
        Self {
            id: Id::generate(),
            organization_id,
            title,
            description: None,
            is_leadership: false,
            requires_setting_apart: false,
            display_order: 0,
            is_active: true,
        }
    }

    pub fn is_leadership_title(title: &str) -> bool {
        let lower = title.to_lowercase();
        LEADERSHIP_TERMS.iter().any(|term| lower.contains(term))
    }
}
