use crate::contract::model::{User, UserFilter};
use async_trait::async_trait;

/// Port for the domain layer: user persistence operations the service needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id regardless of `is_active`.
    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>>;
    /// First row (in storage order) with this normalized mobile, regardless of `is_active`.
    async fn find_first_by_mobile(&self, mob_num: &str) -> anyhow::Result<Option<User>>;
    /// Active rows matching the filter. `ByMobile` carries an already normalized value.
    async fn list_active(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>>;
    /// Insert a fully-formed domain user.
    ///
    /// Service computes id/timestamps/validation; repo persists.
    async fn insert(&self, u: User) -> anyhow::Result<()>;
    /// Overwrite name, mobile, PAN and `updated_at` of the row `u.user_id`.
    async fn update(&self, u: User) -> anyhow::Result<()>;
    /// Mark a row as superseded.
    async fn deactivate(&self, user_id: &str) -> anyhow::Result<()>;
    /// Hard delete by id. Returns true if a row was deleted.
    async fn delete(&self, user_id: &str) -> anyhow::Result<bool>;
}

/// Port for the manager table.
#[async_trait]
pub trait ManagersRepository: Send + Sync {
    /// True iff the manager exists and is active.
    async fn is_active(&self, manager_id: &str) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<u64>;
    async fn insert_active(&self, manager_id: &str) -> anyhow::Result<()>;
}
