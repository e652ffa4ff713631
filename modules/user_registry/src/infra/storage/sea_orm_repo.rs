//! SeaORM-backed repository implementations for the domain ports.
//!
//! Both structs are generic over `C: ConnectionTrait`, so they can be built
//! with a `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::contract::model::{User, UserFilter};
use crate::domain::repo::{ManagersRepository, UsersRepository};
use crate::infra::storage::entity::managers::{
    ActiveModel as ManagerAM, Column as ManagerColumn, Entity as ManagerEntity,
};
use crate::infra::storage::entity::users::{ActiveModel as UserAM, Column, Entity as UserEntity};

/// SeaORM users repository.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(user_id.to_string())
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_first_by_mobile(&self, mob_num: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::MobNum.eq(mob_num))
            .one(&self.conn)
            .await
            .context("find_first_by_mobile failed")?;
        Ok(found.map(Into::into))
    }

    async fn list_active(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        let query = UserEntity::find().filter(Column::IsActive.eq(true));
        let query = match filter {
            UserFilter::ById(id) => query.filter(Column::UserId.eq(id.as_str())),
            UserFilter::ByMobile(mob) => query.filter(Column::MobNum.eq(mob.as_str())),
            UserFilter::ByManager(manager) => query.filter(Column::ManagerId.eq(manager.as_str())),
            UserFilter::All => query,
        };
        let rows = query
            .all(&self.conn)
            .await
            .context("list_active failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, u: User) -> anyhow::Result<()> {
        let m = UserAM {
            user_id: Set(u.user_id),
            full_name: Set(u.full_name),
            mob_num: Set(u.mob_num),
            pan_num: Set(u.pan_num),
            manager_id: Set(u.manager_id),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
            is_active: Set(u.is_active),
        };
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn update(&self, u: User) -> anyhow::Result<()> {
        // Only the mutable columns are set; manager, created_at and is_active stay untouched
        let m = UserAM {
            user_id: Set(u.user_id),
            full_name: Set(u.full_name),
            mob_num: Set(u.mob_num),
            pan_num: Set(u.pan_num),
            updated_at: Set(u.updated_at),
            ..Default::default()
        };
        let _ = m.update(&self.conn).await.context("update failed")?;
        Ok(())
    }

    async fn deactivate(&self, user_id: &str) -> anyhow::Result<()> {
        UserEntity::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("deactivate failed")?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(user_id.to_string())
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

/// SeaORM managers repository.
pub struct SeaOrmManagersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmManagersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> ManagersRepository for SeaOrmManagersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn is_active(&self, manager_id: &str) -> anyhow::Result<bool> {
        let count = ManagerEntity::find()
            .filter(ManagerColumn::ManagerId.eq(manager_id))
            .filter(ManagerColumn::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("is_active failed")?;
        Ok(count > 0)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        ManagerEntity::find()
            .count(&self.conn)
            .await
            .context("count managers failed")
    }

    async fn insert_active(&self, manager_id: &str) -> anyhow::Result<()> {
        let m = ManagerAM {
            manager_id: Set(manager_id.to_string()),
            is_active: Set(true),
        };
        let _ = m
            .insert(&self.conn)
            .await
            .context("insert manager failed")?;
        Ok(())
    }
}
