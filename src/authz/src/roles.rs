//! Predefined role catalogue
//!
//! System roles always exist and cannot be edited by administrators.
//! Besides the special roles assigned from the account state there is a
//! family of administrator roles, all implicitly contained in
//! [`ADMIN`].

use wiking_core::{Role, RoleEdge, RoleId};

/// Everyone, including anonymous callers
pub const ANYONE: &str = "anyone";
/// Any successfully authenticated user, whatever the account state
pub const AUTHENTICATED: &str = "authenticated";
/// Users whose registration has been confirmed
pub const REGISTERED: &str = "registered";
/// Users with an enabled account
pub const USER: &str = "user";
/// Pseudo-role held by the owner of a particular record
pub const OWNER: &str = "owner";

pub const USER_ADMIN: &str = "cms-user-admin";
pub const CRYPTO_ADMIN: &str = "cms-crypto-admin";
pub const CONTENT_ADMIN: &str = "cms-content-admin";
pub const SETTINGS_ADMIN: &str = "cms-settings-admin";
pub const MAIL_ADMIN: &str = "cms-mail-admin";
pub const STYLE_ADMIN: &str = "cms-style-admin";
/// Container of all administrator roles
pub const ADMIN: &str = "cms-admin";

/// Administrator roles contained in [`ADMIN`]
pub const ADMIN_ROLES: [&str; 6] = [
    USER_ADMIN,
    CRYPTO_ADMIN,
    CONTENT_ADMIN,
    SETTINGS_ADMIN,
    MAIL_ADMIN,
    STYLE_ADMIN,
];

const CATALOGUE: [(&str, &str); 12] = [
    (ANYONE, "Anyone"),
    (AUTHENTICATED, "Authenticated user"),
    (REGISTERED, "Registered user"),
    (USER, "User"),
    (OWNER, "Owner"),
    (USER_ADMIN, "User administrator"),
    (CRYPTO_ADMIN, "Crypto administrator"),
    (CONTENT_ADMIN, "Content administrator"),
    (SETTINGS_ADMIN, "Settings administrator"),
    (MAIL_ADMIN, "Mail administrator"),
    (STYLE_ADMIN, "Style administrator"),
    (ADMIN, "Administrator"),
];

/// All predefined roles
pub fn predefined_roles() -> Vec<Role> {
    CATALOGUE
        .iter()
        .map(|(id, name)| Role::new(*id, *name))
        .collect()
}

/// Predefined role with the given id
pub fn predefined_role(id: &str) -> Option<Role> {
    CATALOGUE
        .iter()
        .find(|(role_id, _)| *role_id == id)
        .map(|(id, name)| Role::new(*id, *name))
}

pub fn is_predefined(id: &str) -> bool {
    CATALOGUE.iter().any(|(role_id, _)| *role_id == id)
}

/// Containment edges that exist regardless of stored data
pub fn builtin_edges() -> Vec<RoleEdge> {
    ADMIN_ROLES
        .iter()
        .map(|granted| RoleEdge::new(ADMIN, *granted))
        .collect()
}

/// Convert a slice of constants into owned role ids
pub fn ids(roles: &[&str]) -> Vec<RoleId> {
    roles.iter().map(|r| r.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_lookup() {
        let admin = predefined_role(ADMIN).unwrap();
        assert_eq!(admin.display_name, "Administrator");
        assert!(predefined_role("editor").is_none());
        assert!(is_predefined(OWNER));
    }

    #[test]
    fn test_admin_contains_every_admin_role() {
        let edges = builtin_edges();
        assert_eq!(edges.len(), ADMIN_ROLES.len());
        assert!(edges.iter().all(|e| e.container == ADMIN));
        assert!(edges.iter().any(|e| e.granted == CRYPTO_ADMIN));
    }

    #[test]
    fn test_predefined_roles_are_unique() {
        let roles = predefined_roles();
        let unique: std::collections::HashSet<_> = roles.iter().collect();
        assert_eq!(unique.len(), roles.len());
    }
}
