//! Permission evaluation over an actor's current role assignments.
//!
//! Everything here is a pure function of the data passed in. Callers load the
//! actor's roles and grants for the request at hand and discard them after.

use std::collections::BTreeSet;

use quillboard_core::permissions::SUPERADMIN_ROLE;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A permission assigned to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionGrant {
    pub slug: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActorRole {
    pub slug: String,
    pub permissions: Vec<PermissionGrant>,
}

/// An authenticated user with the roles they hold right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: i64,
    pub roles: Vec<ActorRole>,
}

impl Actor {
    pub fn has_role(&self, slug: &str) -> bool {
        self.roles.iter().any(|r| r.slug == slug)
    }

    /// Holders of the superadmin role bypass every check.
    pub fn is_privileged(&self) -> bool {
        self.has_role(SUPERADMIN_ROLE)
    }

    fn active_slugs(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .flat_map(|r| r.permissions.iter())
            .filter(|p| p.is_active)
            .map(|p| p.slug.as_str())
    }
}

/// Whether `actor` may perform the action named by `slug`.
///
/// Privileged actors always may. Otherwise some role must carry an active
/// grant with that exact slug; inactive grants never count.
pub fn has_permission(actor: &Actor, slug: &str) -> bool {
    if actor.is_privileged() {
        return true;
    }
    actor.active_slugs().any(|s| s == slug)
}

/// True when any of `slugs` passes [`has_permission`].
pub fn has_any_permission(actor: &Actor, slugs: &[&str]) -> bool {
    slugs.iter().any(|s| has_permission(actor, s))
}

/// Slugs the actor may exercise, deduplicated and sorted.
///
/// `catalog` holds every permission slug in the system and is only read for
/// privileged actors.
pub fn effective_permission_slugs(actor: &Actor, catalog: &[String]) -> BTreeSet<String> {
    if actor.is_privileged() {
        return catalog.iter().cloned().collect();
    }
    actor.active_slugs().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(slug: &str, is_active: bool) -> PermissionGrant {
        PermissionGrant {
            slug: slug.to_string(),
            is_active,
        }
    }

    fn role(slug: &str, permissions: Vec<PermissionGrant>) -> ActorRole {
        ActorRole {
            slug: slug.to_string(),
            permissions,
        }
    }

    fn actor(roles: Vec<ActorRole>) -> Actor {
        Actor { id: 1, roles }
    }

    #[test]
    fn test_superadmin_passes_any_slug() {
        let a = actor(vec![role("superadmin", vec![])]);
        assert!(has_permission(&a, "blogs.delete"));
        assert!(has_permission(&a, "anything.at.all"));
        assert!(a.is_privileged());
    }

    #[test]
    fn test_no_roles_denies() {
        let a = actor(vec![]);
        assert!(!has_permission(&a, "blogs.view"));
        assert!(effective_permission_slugs(&a, &["blogs.view".to_string()]).is_empty());
    }

    #[test]
    fn test_inactive_grant_denies() {
        let a = actor(vec![role("editor", vec![grant("blogs.edit", false)])]);
        assert!(!has_permission(&a, "blogs.edit"));
    }

    #[test]
    fn test_active_grant_on_any_role_allows() {
        let a = actor(vec![
            role("viewer", vec![grant("blogs.view", true)]),
            role("editor", vec![grant("blogs.edit", false), grant("blogs.create", true)]),
        ]);
        assert!(has_permission(&a, "blogs.view"));
        assert!(has_permission(&a, "blogs.create"));
        assert!(!has_permission(&a, "blogs.edit"));
        assert!(!has_permission(&a, "roles.view"));
    }

    #[test]
    fn test_active_grant_beats_inactive_duplicate() {
        let a = actor(vec![
            role("a", vec![grant("blogs.edit", false)]),
            role("b", vec![grant("blogs.edit", true)]),
        ]);
        assert!(has_permission(&a, "blogs.edit"));
    }

    #[test]
    fn test_has_any_permission() {
        let a = actor(vec![role("user", vec![grant("blogs.view", true)])]);
        assert!(has_any_permission(&a, &["roles.view", "blogs.view"]));
        assert!(!has_any_permission(&a, &["roles.view"]));
    }

    #[test]
    fn test_effective_slugs_dedup_and_skip_inactive() {
        let a = actor(vec![
            role("a", vec![grant("blogs.view", true), grant("blogs.edit", false)]),
            role("b", vec![grant("blogs.view", true), grant("users.view", true)]),
        ]);
        let slugs: Vec<_> = effective_permission_slugs(&a, &[]).into_iter().collect();
        assert_eq!(slugs, vec!["blogs.view", "users.view"]);
    }

    #[test]
    fn test_effective_slugs_privileged_is_catalog() {
        let a = actor(vec![role("superadmin", vec![])]);
        let catalog = vec!["roles.view".to_string(), "blogs.view".to_string()];
        let slugs = effective_permission_slugs(&a, &catalog);
        assert_eq!(slugs.len(), 2);
        assert!(slugs.contains("roles.view"));
    }
}
