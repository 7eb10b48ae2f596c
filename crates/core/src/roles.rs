//! Well-known role names and the permissions each role carries.
//!
//! Role names must match the seed data in `20260301000001_create_roles_and_users.sql`.
//! Permissions are not stored in the database; every role maps to a fixed set
//! and `admin` acts as the superuser.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_AUTHOR: &str = "author";
pub const ROLE_STUDENT: &str = "student";

/// All known role names, in descending privilege order.
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_EDITOR,
    ROLE_MODERATOR,
    ROLE_AUTHOR,
    ROLE_STUDENT,
];

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: &str = ROLE_STUDENT;

/// Individual capabilities checked by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// See own posts, drafts included.
    ViewOnlyPosts,
    /// See every published post.
    ViewAllPosts,
    /// See every post, published or not.
    ViewAllUnpublishedPosts,
    /// Toggle the `allowed` moderation flag.
    AllowPosts,
    /// Edit posts written by other users.
    EditUsersPosts,
    ModerateComments,
    /// Approve, reject and delete memes and song suggestions.
    ModerateMedia,
    ManagePolls,
    /// Settings, legal documents, events, notifications, users.
    ManageSite,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::ViewOnlyPosts,
        Permission::ViewAllPosts,
        Permission::ViewAllUnpublishedPosts,
        Permission::AllowPosts,
        Permission::EditUsersPosts,
        Permission::ModerateComments,
        Permission::ModerateMedia,
        Permission::ManagePolls,
        Permission::ManageSite,
    ];

    pub fn codename(self) -> &'static str {
        match self {
            Permission::ViewOnlyPosts => "view_only_posts",
            Permission::ViewAllPosts => "can_view_all_posts",
            Permission::ViewAllUnpublishedPosts => "can_view_all_pnp_posts",
            Permission::AllowPosts => "can_allow_posts",
            Permission::EditUsersPosts => "can_edit_users_post",
            Permission::ModerateComments => "moderate_comments",
            Permission::ModerateMedia => "moderate_media",
            Permission::ManagePolls => "manage_polls",
            Permission::ManageSite => "manage_site",
        }
    }
}

const EDITOR_PERMISSIONS: &[Permission] = &[
    Permission::ViewAllUnpublishedPosts,
    Permission::AllowPosts,
    Permission::EditUsersPosts,
    Permission::ModerateComments,
    Permission::ManagePolls,
];

const MODERATOR_PERMISSIONS: &[Permission] = &[
    Permission::ViewAllPosts,
    Permission::ModerateComments,
    Permission::ModerateMedia,
];

const AUTHOR_PERMISSIONS: &[Permission] = &[Permission::ViewOnlyPosts];

/// Whether the role bypasses every permission check.
pub fn is_superuser(role: &str) -> bool {
    role == ROLE_ADMIN
}

/// Whether the role may use the `/admin` surface at all.
pub fn is_staff(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_EDITOR | ROLE_MODERATOR | ROLE_AUTHOR)
}

/// Check whether `role` carries `permission`. Superusers carry everything.
pub fn has_permission(role: &str, permission: Permission) -> bool {
    let granted: &[Permission] = match role {
        ROLE_ADMIN => return true,
        ROLE_EDITOR => EDITOR_PERMISSIONS,
        ROLE_MODERATOR => MODERATOR_PERMISSIONS,
        ROLE_AUTHOR => AUTHOR_PERMISSIONS,
        _ => &[],
    };
    granted.contains(&permission)
}

/// Every permission `role` carries, in declaration order.
pub fn permissions_for(role: &str) -> Vec<Permission> {
    Permission::ALL
        .iter()
        .copied()
        .filter(|p| has_permission(role, *p))
        .collect()
}

/// Validate that a role name is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

/// Which posts a staff user sees in the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    PublishedOnly,
    Own(DbId),
    OwnPublished(DbId),
}

impl PostScope {
    /// Whether a post with the given author and state falls inside the scope.
    pub fn includes(self, author_id: DbId, published: bool) -> bool {
        match self {
            PostScope::All => true,
            PostScope::PublishedOnly => published,
            PostScope::Own(user_id) => author_id == user_id,
            PostScope::OwnPublished(user_id) => author_id == user_id && published,
        }
    }
}

/// Resolve the admin post scope for a user.
///
/// The checks run in a fixed order and the first match wins; in particular
/// `can_view_all_posts` (published only) is consulted before
/// `can_view_all_pnp_posts`.
pub fn post_scope(role: &str, user_id: DbId) -> PostScope {
    if is_superuser(role) {
        return PostScope::All;
    }
    if has_permission(role, Permission::ViewAllPosts) {
        return PostScope::PublishedOnly;
    }
    if has_permission(role, Permission::ViewAllUnpublishedPosts) {
        return PostScope::All;
    }
    if has_permission(role, Permission::ViewOnlyPosts) {
        return PostScope::Own(user_id);
    }
    PostScope::OwnPublished(user_id)
}

/// `allowed` is read-only for anyone without `can_allow_posts`.
pub fn can_set_allowed(role: &str) -> bool {
    has_permission(role, Permission::AllowPosts)
}

/// Authors may edit their own posts; editing others' needs `can_edit_users_post`.
pub fn can_edit_post(role: &str, user_id: DbId, author_id: DbId) -> bool {
    user_id == author_id || has_permission(role, Permission::EditUsersPosts)
}
