use serde::{Deserialize, Serialize};

use super::ids::Id;

/// An account that can act on callings. Group membership lives in the
/// permission registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id<User>,
    pub username: String,
    pub is_superuser: bool,
}

impl User {
    pub fn create(username: String, is_superuser: bool) -> Self {
        Self {
            id: Id::generate(),
            username,
            is_superuser,
        }
    }
}
