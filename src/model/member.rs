use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::unit::Unit;

/// A person who can hold a calling. Names are not unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Id<Member>,
    pub name: String,
    pub home_unit_id: Option<Id<Unit>>,
    pub is_active: bool,
}

impl Member {
    pub fn create(name: String, home_unit_id: Option<Id<Unit>>) -> Self {
        Self {
            id: Id::generate(),
            name,
            home_unit_id,
            is_active: true,
        }
    }
}
