use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::ManagersRepository;

/// Read-only view of the manager table plus the startup seed.
#[derive(Clone)]
pub struct ManagerRegistry {
    repo: Arc<dyn ManagersRepository>,
}

impl ManagerRegistry {
    pub fn new(repo: Arc<dyn ManagersRepository>) -> Self {
        Self { repo }
    }

    /// Unknown managers are reported as inactive.
    #[instrument(name = "user_registry.managers.is_active", skip(self))]
    pub async fn is_active(&self, manager_id: &str) -> Result<bool, DomainError> {
        let active = self
            .repo
            .is_active(manager_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(active, "Manager lookup finished");
        Ok(active)
    }

    /// Insert `count` fresh active managers when the table is empty.
    /// Returns the inserted ids; an already populated table yields an empty list.
    #[instrument(name = "user_registry.managers.seed_if_empty", skip(self))]
    pub async fn seed_if_empty(&self, count: usize) -> Result<Vec<String>, DomainError> {
        let existing = self
            .repo
            .count()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if existing > 0 {
            debug!(existing, "Managers already present, skipping seed");
            return Ok(Vec::new());
        }

        let mut seeded = Vec::with_capacity(count);
        for _ in 0..count {
            let id = Uuid::new_v4().to_string();
            self.repo
                .insert_active(&id)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
            seeded.push(id);
        }

        info!(count = seeded.len(), "Seeded managers");
        Ok(seeded)
    }
}
