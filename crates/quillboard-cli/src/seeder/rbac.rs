//! Role and permission seeding, plus superadmin creation.
//!
//! Permissions come from [`quillboard_core::permissions::ALL`]. Re-running the
//! seeder updates names and modules in place and re-syncs each seeded role's
//! grants, so it is safe to run against an existing database.

use std::time::Instant;

use quillboard_core::permissions::{ALL, BLOGS_VIEW, PermissionSeed, SUPERADMIN_ROLE};
use quillboard_models::{PermissionId, RoleId, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::models::{Grant, RoleSeed};

pub const ROLES: &[RoleSeed] = &[
    RoleSeed {
        slug: SUPERADMIN_ROLE,
        name: "Super Admin",
        description: "Full access to every module",
        grant: Grant::All,
    },
    RoleSeed {
        slug: "admin",
        name: "Admin",
        description: "Manages content, users and permissions",
        grant: Grant::AllExceptModule("Roles"),
    },
    RoleSeed {
        slug: "editor",
        name: "Editor",
        description: "Manages blog content",
        grant: Grant::Module("Blogs"),
    },
    RoleSeed {
        slug: "user",
        name: "User",
        description: "Reads blog content",
        grant: Grant::Only(&[BLOGS_VIEW]),
    },
];

/// Slugs `role` is granted out of `catalog`.
pub fn granted_slugs<'a>(role: &RoleSeed, catalog: &'a [PermissionSeed]) -> Vec<&'a str> {
    catalog
        .iter()
        .filter(|p| role.grant.includes(p.slug, p.module))
        .map(|p| p.slug)
        .collect()
}

async fn upsert_permissions(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<Vec<(PermissionId, String)>, Box<dyn std::error::Error>> {
    let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO permissions (slug, name, module) ");
    qb.push_values(ALL, |mut row, p| {
        row.push_bind(p.slug).push_bind(p.name).push_bind(p.module);
    });
    qb.push(
        " ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name, module = EXCLUDED.module, \
         updated_at = NOW() RETURNING id, slug",
    );

    let rows = qb
        .build_query_as::<(PermissionId, String)>()
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows)
}

async fn upsert_role(
    tx: &mut Transaction<'_, Postgres>,
    role: &RoleSeed,
) -> Result<RoleId, sqlx::Error> {
    sqlx::query_scalar::<_, RoleId>(
        "INSERT INTO roles (slug, name, description) VALUES ($1, $2, $3)
         ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()
         RETURNING id",
    )
    .bind(role.slug)
    .bind(role.name)
    .bind(role.description)
    .fetch_one(&mut **tx)
    .await
}

/// Seeds every permission and role and syncs each role's grants.
pub async fn seed_rbac(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🔐 Seeding {} permissions and {} roles...", ALL.len(), ROLES.len());

    let mut tx = db.begin().await?;
    let permissions = upsert_permissions(&mut tx).await?;

    for role in ROLES {
        let role_id = upsert_role(&mut tx, role).await?;
        let granted = granted_slugs(role, ALL);
        let permission_ids: Vec<PermissionId> = permissions
            .iter()
            .filter(|(_, slug)| granted.contains(&slug.as_str()))
            .map(|(id, _)| *id)
            .collect();

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(role_id)
        .bind(&permission_ids)
        .execute(&mut *tx)
        .await?;

        println!("   ✓ {} ({} permissions)", role.slug, permission_ids.len());
    }

    tx.commit().await?;
    println!("   ✓ RBAC seeded in {:?}", start_time.elapsed());
    Ok(())
}

/// Assigns the role with `role_slug` to the user, creating nothing else.
pub async fn assign_role(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    role_slug: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let assigned = sqlx::query(
        "INSERT INTO user_roles (user_id, role_id)
         SELECT $1, id FROM roles WHERE slug = $2
         ON CONFLICT (user_id, role_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(role_slug)
    .execute(&mut **tx)
    .await?;

    if assigned.rows_affected() == 0 {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE slug = $1)")
                .bind(role_slug)
                .fetch_one(&mut **tx)
                .await?;
        if !exists {
            return Err(format!("Role '{}' does not exist. Run `seed-rbac` first.", role_slug).into());
        }
    }
    Ok(())
}

/// Creates a user holding the superadmin role. Fails when the email is taken.
pub async fn create_superadmin(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = user_id else {
        tx.rollback().await?;
        return Err("User with this email already exists".into());
    };

    assign_role(&mut tx, user_id, SUPERADMIN_ROLE).await?;
    tx.commit().await?;

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(slug: &str) -> &'static RoleSeed {
        ROLES.iter().find(|r| r.slug == slug).unwrap()
    }

    #[test]
    fn test_superadmin_gets_everything() {
        assert_eq!(granted_slugs(role("superadmin"), ALL).len(), ALL.len());
    }

    #[test]
    fn test_admin_excludes_roles_module() {
        let slugs = granted_slugs(role("admin"), ALL);
        assert!(slugs.iter().all(|s| !s.starts_with("roles.")));
        assert!(slugs.contains(&"permissions.edit"));
        assert!(slugs.contains(&"users.delete"));
        assert_eq!(slugs.len(), ALL.len() - 4);
    }

    #[test]
    fn test_editor_gets_blogs_module() {
        let slugs = granted_slugs(role("editor"), ALL);
        assert_eq!(slugs, vec!["blogs.view", "blogs.create", "blogs.edit", "blogs.delete"]);
    }

    #[test]
    fn test_user_only_views_blogs() {
        assert_eq!(granted_slugs(role("user"), ALL), vec!["blogs.view"]);
    }
}
