//! Group repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::database::repositories::unique_violation_as_invalid;
use crate::models::group::{Group, GroupMembership, MembershipRole, CreateGroupRequest};
use crate::utils::errors::SocialPlatformError;

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

/// Delete a group and everything hanging off it on an open connection or transaction
pub(crate) async fn delete_group_rows(conn: &mut PgConnection, group_id: i64) -> Result<(), SocialPlatformError> {
    sqlx::query("DELETE FROM group_memberships WHERE group_id = $1")
        .bind(group_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM conversation_participants WHERE conversation_id IN (SELECT id FROM conversations WHERE group_id = $1)")
        .bind(group_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM messages WHERE conversation_id IN (SELECT id FROM conversations WHERE group_id = $1)")
        .bind(group_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM conversations WHERE group_id = $1")
        .bind(group_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM groups WHERE id = $1")
        .bind(group_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn set_conversation_access(
    conn: &mut PgConnection,
    group_id: i64,
    user_id: i64,
    access: bool,
) -> Result<(), SocialPlatformError> {
    if access {
        sqlx::query(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id, last_entry)
            SELECT id, $2, $3 FROM conversations WHERE group_id = $1
            ON CONFLICT (conversation_id, user_id) DO NOTHING
            "#
        )
        .bind(group_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    } else {
        sqlx::query(
            r#"
            DELETE FROM conversation_participants
            WHERE conversation_id IN (SELECT id FROM conversations WHERE group_id = $1)
              AND user_id = $2
            "#
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group with its conversation and Owner membership
    pub async fn create(&self, request: CreateGroupRequest, owner_id: i64) -> Result<(Group, GroupMembership), SocialPlatformError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_at
            "#
        )
        .bind(request.name)
        .bind(request.description)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO conversations (group_id, created_at) VALUES ($1, $2)")
            .bind(group.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let membership = sqlx::query_as::<_, GroupMembership>(
            r#"
            INSERT INTO group_memberships (group_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, group_id, user_id, role, joined_at
            "#
        )
        .bind(group.id)
        .bind(owner_id)
        .bind(MembershipRole::Owner.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        set_conversation_access(&mut *tx, group.id, owner_id, true).await?;

        tx.commit().await?;
        Ok((group, membership))
    }

    /// Find group by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Group>, SocialPlatformError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, description, created_at FROM groups WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// List all groups
    pub async fn list(&self) -> Result<Vec<Group>, SocialPlatformError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, name, description, created_at FROM groups ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// Find a user's membership in a group
    pub async fn find_membership(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMembership>, SocialPlatformError> {
        let membership = sqlx::query_as::<_, GroupMembership>(
            "SELECT id, group_id, user_id, role, joined_at FROM group_memberships WHERE group_id = $1 AND user_id = $2"
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Find membership by ID
    pub async fn find_membership_by_id(&self, id: i64) -> Result<Option<GroupMembership>, SocialPlatformError> {
        let membership = sqlx::query_as::<_, GroupMembership>(
            "SELECT id, group_id, user_id, role, joined_at FROM group_memberships WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Add member to group
    pub async fn add_member(
        &self,
        group_id: i64,
        user_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership, SocialPlatformError> {
        let mut tx = self.pool.begin().await?;

        let membership = sqlx::query_as::<_, GroupMembership>(
            r#"
            INSERT INTO group_memberships (group_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, group_id, user_id, role, joined_at
            "#
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation_as_invalid(e, || {
            format!("User {} already has a membership in group {}", user_id, group_id)
        }))?;

        set_conversation_access(&mut *tx, group_id, user_id, conversation_access).await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// Change a member's role
    pub async fn set_role(
        &self,
        membership_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership, SocialPlatformError> {
        let mut tx = self.pool.begin().await?;

        let membership = sqlx::query_as::<_, GroupMembership>(
            r#"
            UPDATE group_memberships
            SET role = $2
            WHERE id = $1
            RETURNING id, group_id, user_id, role, joined_at
            "#
        )
        .bind(membership_id)
        .bind(role.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SocialPlatformError::MembershipNotFound { membership_id })?;

        set_conversation_access(&mut *tx, membership.group_id, membership.user_id, conversation_access).await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// Remove member from group
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> Result<(), SocialPlatformError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM group_memberships WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        set_conversation_access(&mut *tx, group_id, user_id, false).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a group with its memberships, conversation and messages
    pub async fn delete_cascade(&self, group_id: i64) -> Result<(), SocialPlatformError> {
        let mut tx = self.pool.begin().await?;
        delete_group_rows(&mut *tx, group_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Get group members
    pub async fn get_members(&self, group_id: i64) -> Result<Vec<GroupMembership>, SocialPlatformError> {
        let members = sqlx::query_as::<_, GroupMembership>(
            "SELECT id, group_id, user_id, role, joined_at FROM group_memberships WHERE group_id = $1 ORDER BY id"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Get the memberships a user holds
    pub async fn get_user_memberships(&self, user_id: i64) -> Result<Vec<GroupMembership>, SocialPlatformError> {
        let memberships = sqlx::query_as::<_, GroupMembership>(
            "SELECT id, group_id, user_id, role, joined_at FROM group_memberships WHERE user_id = $1 ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }
}
