use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::unit::Unit;

/// A sub-group within a unit, such as the Relief Society or the Bishopric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Id<Organization>,
    pub name: String,
    pub description: Option<String>,
    pub unit_id: Option<Id<Unit>>,
    pub leader: Option<String>,
    pub is_active: bool,
}

impl Organization {
    pub fn create(name: String) -> Self {
        Self {
            id: Id::generate(),
            name,
            description: None,
            unit_id: None,
            leader: None,
            is_active: true,
        }
    }
}
