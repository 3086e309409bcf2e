use std::collections::HashSet;

use serde::Serialize;

use crate::error::{TrackError, TrackResult};

/// A named permission group. Users gain capabilities through group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    StakePresident,
    Bishop,
    StakeClerk,
    Clerk,
    Leadership,
}

/// A single capability, named by the codename it carries in the group registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Permission {
    AddCalling,
    ChangeCalling,
    DeleteCalling,
    ViewCalling,
    AddUnit,
    ChangeUnit,
    DeleteUnit,
    ViewUnit,
    AddOrganization,
    ChangeOrganization,
    DeleteOrganization,
    ViewOrganization,
    AddPosition,
    ChangePosition,
    DeletePosition,
    ViewPosition,
    ApproveCalling,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::AddCalling,
        Permission::ChangeCalling,
        Permission::DeleteCalling,
        Permission::ViewCalling,
        Permission::AddUnit,
        Permission::ChangeUnit,
        Permission::DeleteUnit,
        Permission::ViewUnit,
        Permission::AddOrganization,
        Permission::ChangeOrganization,
        Permission::DeleteOrganization,
        Permission::ViewOrganization,
        Permission::AddPosition,
        Permission::ChangePosition,
        Permission::DeletePosition,
        Permission::ViewPosition,
        Permission::ApproveCalling,
    ];

    pub fn codename(&self) -> &'static str {
        match self {
            Permission::AddCalling => "add_calling",
            Permission::ChangeCalling => "change_calling",
            Permission::DeleteCalling => "delete_calling",
            Permission::ViewCalling => "view_calling",
            Permission::AddUnit => "add_unit",
            Permission::ChangeUnit => "change_unit",
            Permission::DeleteUnit => "delete_unit",
            Permission::ViewUnit => "view_unit",
            Permission::AddOrganization => "add_organization",
            Permission::ChangeOrganization => "change_organization",
            Permission::DeleteOrganization => "delete_organization",
            Permission::ViewOrganization => "view_organization",
            Permission::AddPosition => "add_position",
            Permission::ChangePosition => "change_position",
            Permission::DeletePosition => "delete_position",
            Permission::ViewPosition => "view_position",
            Permission::ApproveCalling => "approve_calling",
        }
    }

    pub fn from_codename(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.codename() == s)
    }
}

use Permission::*;

const STAKE_PRESIDENT_GRANTS: &[Permission] = Permission::ALL;

const BISHOP_GRANTS: &[Permission] = &[
    AddCalling,
    ChangeCalling,
    ViewCalling,
    ViewUnit,
    ViewOrganization,
    ViewPosition,
    ApproveCalling,
];

const STAKE_CLERK_GRANTS: &[Permission] = &[
    AddCalling,
    ChangeCalling,
    ViewCalling,
    AddUnit,
    ChangeUnit,
    ViewUnit,
    AddOrganization,
    ChangeOrganization,
    ViewOrganization,
    AddPosition,
    ChangePosition,
    ViewPosition,
];

const CLERK_GRANTS: &[Permission] = &[
    AddCalling,
    ChangeCalling,
    ViewCalling,
    AddUnit,
    ChangeUnit,
    ViewUnit,
    ViewOrganization,
    ViewPosition,
];

const LEADERSHIP_GRANTS: &[Permission] = &[ViewCalling, ViewUnit, ViewOrganization, ViewPosition];

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::StakePresident,
        Role::Bishop,
        Role::StakeClerk,
        Role::Clerk,
        Role::Leadership,
    ];

    /// The group name as stored in the registry.
    pub fn name(&self) -> &'static str {
        match self {
            Role::StakePresident => "Stake President",
            Role::Bishop => "Bishop",
            Role::StakeClerk => "Stake Clerk",
            Role::Clerk => "Clerk",
            Role::Leadership => "Leadership",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
    }

    pub fn grants(&self) -> &'static [Permission] {
        match self {
            Role::StakePresident => STAKE_PRESIDENT_GRANTS,
            Role::Bishop => BISHOP_GRANTS,
            Role::StakeClerk => STAKE_CLERK_GRANTS,
            Role::Clerk => CLERK_GRANTS,
            Role::Leadership => LEADERSHIP_GRANTS,
        }
    }
}

/// Whoever is performing an operation, with the capabilities their groups grant.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<Role>,
    pub is_superuser: bool,
    capabilities: HashSet<Permission>,
}

impl Principal {
    pub fn new(username: impl Into<String>, roles: Vec<Role>, is_superuser: bool) -> Self {
        let capabilities = if is_superuser {
            Permission::ALL.iter().copied().collect()
        } else {
            roles
                .iter()
                .flat_map(|r| r.grants().iter().copied())
                .collect()
        };
        Self {
            username: username.into(),
            roles,
            is_superuser,
            capabilities,
        }
    }

    pub fn with_role(username: impl Into<String>, role: Role) -> Self {
        Self::new(username, vec![role], false)
    }

    pub fn superuser(username: impl Into<String>) -> Self {
        Self::new(username, Vec::new(), true)
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.capabilities.contains(&permission)
    }

    fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_stake_president(&self) -> bool {
        self.is_superuser || self.has_role(Role::StakePresident)
    }

    pub fn is_bishop(&self) -> bool {
        self.is_superuser || self.has_role(Role::Bishop)
    }

    pub fn is_leadership(&self) -> bool {
        self.is_stake_president() || self.is_bishop() || self.has_role(Role::Leadership)
    }

    pub fn is_clerk(&self) -> bool {
        self.is_superuser || self.has_role(Role::Clerk) || self.has_role(Role::StakeClerk)
    }

    pub fn can_edit(&self) -> bool {
        self.has(ChangeCalling)
    }

    pub fn can_approve(&self) -> bool {
        self.has(ApproveCalling)
    }

    pub fn can_delete(&self) -> bool {
        self.has(DeleteCalling)
    }

    pub fn can_manage_units(&self) -> bool {
        self.has(ChangeUnit)
    }

    /// Fails with `PermissionDenied` unless the principal holds `permission`.
    pub fn require(&self, permission: Permission) -> TrackResult<()> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(TrackError::PermissionDenied {
                action: permission.codename().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codenames_round_trip() {
        for p in Permission::ALL {
            assert_eq!(Permission::from_codename(p.codename()), Some(*p));
        }
        assert_eq!(Permission::from_codename("fly"), None);
    }

    #[test]
    fn stake_president_holds_every_permission() {
        let p = Principal::with_role("sp", Role::StakePresident);
        assert!(Permission::ALL.iter().all(|perm| p.has(*perm)));
    }

    #[test]
    fn bishop_can_approve_but_not_delete() {
        let p = Principal::with_role("bishop", Role::Bishop);
        assert!(p.can_edit());
        assert!(p.can_approve());
        assert!(!p.can_delete());
        assert!(!p.can_manage_units());
    }

    #[test]
    fn leadership_group_is_view_only() {
        let p = Principal::with_role("counselor", Role::Leadership);
        assert!(p.is_leadership());
        assert!(!p.can_edit());
        assert!(!p.can_delete());
        assert!(p.has(ViewCalling));
    }

    #[test]
    fn clerks_manage_units() {
        assert!(Principal::with_role("c", Role::Clerk).can_manage_units());
        assert!(Principal::with_role("sc", Role::StakeClerk).can_manage_units());
        assert!(Principal::with_role("c", Role::Clerk).is_clerk());
    }

    #[test]
    fn union_over_roles() {
        let p = Principal::new("both", vec![Role::Leadership, Role::Clerk], false);
        assert!(p.can_edit());
        assert!(!p.can_approve());
    }

    #[test]
    fn superuser_has_everything() {
        let p = Principal::superuser("admin");
        assert!(p.is_leadership() && p.is_clerk());
        assert!(p.can_delete() && p.can_approve());
    }

    #[test]
    fn require_names_the_missing_permission() {
        let err = Principal::new("nobody", Vec::new(), false)
            .require(DeleteCalling)
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("delete_calling"));
    }

    #[test]
    fn role_names_parse_case_insensitively() {
        assert_eq!(Role::from_name("stake clerk"), Some(Role::StakeClerk));
        assert_eq!(Role::from_name("Janitor"), None);
    }
}
