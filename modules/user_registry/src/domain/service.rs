use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{NewUser, UpdateSummary, User, UserFilter, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::managers::ManagerRegistry;
use crate::domain::repo::UsersRepository;
use crate::domain::validation::{normalize_mobile, normalize_pan, present};

/// Domain service with business rules for user management.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    managers: ManagerRegistry,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(users: Arc<dyn UsersRepository>, managers: ManagerRegistry) -> Self {
        Self { users, managers }
    }

    pub fn managers(&self) -> &ManagerRegistry {
        &self.managers
    }

    /// Validation order: required fields, manager, mobile, PAN. The first failure wins.
    #[instrument(name = "user_registry.service.create_user", skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let (Some(full_name), Some(mob_num), Some(pan_num), Some(manager_id)) = (
            present(new_user.full_name),
            present(new_user.mob_num),
            present(new_user.pan_num),
            present(new_user.manager_id),
        ) else {
            return Err(DomainError::MissingFields);
        };

        if !self.managers.is_active(&manager_id).await? {
            return Err(DomainError::inactive_manager(manager_id));
        }
        let mob_num = normalize_mobile(&mob_num).ok_or_else(|| DomainError::invalid_mobile(mob_num))?;
        let pan_num = normalize_pan(&pan_num).ok_or_else(|| DomainError::invalid_pan(pan_num))?;

        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4().to_string(),
            full_name,
            mob_num,
            pan_num,
            manager_id,
            created_at: now,
            updated_at: now,
            is_active: true,
        };

        self.users
            .insert(user.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created user with id={}", user.user_id);
        Ok(user)
    }

    /// Active users matching the filter. A mobile filter is normalized first
    /// and rejected when it is not a valid number.
    #[instrument(name = "user_registry.service.list_users", skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");

        let filter = match filter {
            UserFilter::ByMobile(raw) => UserFilter::ByMobile(
                normalize_mobile(&raw).ok_or_else(|| DomainError::invalid_mobile(raw))?,
            ),
            other => other,
        };

        let users = self
            .users
            .list_active(&filter)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    /// Apply one patch to every id, in order.
    ///
    /// Missing ids are skipped. A changed manager supersedes the row with a new one
    /// that keeps the original `created_at`. An invalid mobile, PAN or manager aborts
    /// the remaining ids; rows handled before the failure stay changed.
    #[instrument(
        name = "user_registry.service.update_users",
        skip(self, user_ids, patch),
        fields(batch = user_ids.len())
    )]
    pub async fn update_users(
        &self,
        user_ids: &[String],
        patch: Option<UserPatch>,
    ) -> Result<UpdateSummary, DomainError> {
        info!("Updating users");

        if user_ids.is_empty() {
            return Err(DomainError::InvalidUserIds);
        }
        let patch = patch.ok_or(DomainError::NoUpdateData)?;
        let full_name = present(patch.full_name);
        let mob_num = present(patch.mob_num);
        let pan_num = present(patch.pan_num);
        let manager_id = present(patch.manager_id);

        let now = Utc::now();
        let mut summary = UpdateSummary::default();

        for id in user_ids {
            let Some(current) = self
                .users
                .find_by_id(id)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
            else {
                debug!(user_id = %id, "User not found, skipping");
                summary.skipped += 1;
                continue;
            };

            let new_name = full_name.clone().unwrap_or_else(|| current.full_name.clone());
            let new_mob = match &mob_num {
                Some(raw) => normalize_mobile(raw).ok_or_else(|| DomainError::invalid_mobile(raw))?,
                None => current.mob_num.clone(),
            };
            let new_pan = match &pan_num {
                Some(raw) => normalize_pan(raw).ok_or_else(|| DomainError::invalid_pan(raw))?,
                None => current.pan_num.clone(),
            };

            if let Some(manager_id) = &manager_id {
                if !self.managers.is_active(manager_id).await? {
                    warn!(user_id = %id, "Reassignment to inactive manager rejected");
                    return Err(DomainError::inactive_manager(manager_id.clone()));
                }

                self.users
                    .deactivate(id)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;

                let fork = User {
                    user_id: Uuid::new_v4().to_string(),
                    full_name: new_name,
                    mob_num: new_mob,
                    pan_num: new_pan,
                    manager_id: manager_id.clone(),
                    created_at: current.created_at,
                    updated_at: now,
                    is_active: true,
                };
                debug!(old_id = %id, new_id = %fork.user_id, "Forking user onto new manager");
                self.users
                    .insert(fork)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;
                summary.forked += 1;
                continue;
            }

            let updated = User {
                full_name: new_name,
                mob_num: new_mob,
                pan_num: new_pan,
                updated_at: now,
                ..current
            };
            self.users
                .update(updated)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
            summary.updated += 1;
        }

        info!(
            updated = summary.updated,
            forked = summary.forked,
            skipped = summary.skipped,
            "Update completed"
        );
        Ok(summary)
    }

    /// Hard delete one row found by id or, failing that, by normalized mobile.
    /// Inactive rows are found too. Returns the removed row.
    #[instrument(name = "user_registry.service.delete_user", skip(self))]
    pub async fn delete_user(
        &self,
        user_id: Option<String>,
        mob_num: Option<String>,
    ) -> Result<User, DomainError> {
        info!("Deleting user");

        let found = match (present(user_id), present(mob_num)) {
            (Some(id), _) => self.users.find_by_id(&id).await,
            (None, Some(raw)) => match normalize_mobile(&raw) {
                Some(mob) => self.users.find_first_by_mobile(&mob).await,
                // an unparseable number can never match a stored one
                None => Ok(None),
            },
            (None, None) => return Err(DomainError::MissingLookupKey),
        }
        .map_err(|e| DomainError::database(e.to_string()))?;

        let user = found.ok_or(DomainError::UserNotFound)?;

        let deleted = self
            .users
            .delete(&user.user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::UserNotFound);
        }

        info!("Successfully deleted user with id={}", user.user_id);
        Ok(user)
    }

    /// Startup bootstrap: seed managers when none exist.
    pub async fn seed_managers(&self, count: usize) -> Result<Vec<String>, DomainError> {
        self.managers.seed_if_empty(count).await
    }
}
