use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UserRegistryConfig;
use crate::domain::managers::ManagerRegistry;
use crate::domain::service::Service;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmManagersRepository, SeaOrmUsersRepository};

/// The wired module: migrated schema, seeded managers, domain service and REST routes.
pub struct UserRegistry {
    service: Arc<Service>,
    seeded_managers: Vec<String>,
}

impl UserRegistry {
    /// Run migrations, wire repositories into the service and seed managers.
    pub async fn init(db: &db::DbHandle, cfg: &UserRegistryConfig) -> anyhow::Result<Self> {
        info!("Initializing user_registry module");
        debug!("Loaded user_registry config: seed_managers={}", cfg.seed_managers);

        let conn = db.sea();
        Self::migrate(&conn).await?;

        let service = Arc::new(Self::build_service(conn));
        let seeded_managers = service.seed_managers(cfg.seed_managers).await?;
        for id in &seeded_managers {
            info!(manager_id = %id, "Seeded active manager");
        }

        Ok(Self {
            service,
            seeded_managers,
        })
    }

    /// Apply the schema; safe to run on every start.
    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running user_registry database migrations");
        Migrator::up(conn, None).await?;
        info!("user_registry database migrations completed successfully");
        Ok(())
    }

    /// Service over SeaORM repositories sharing one connection.
    pub fn build_service(conn: DatabaseConnection) -> Service {
        let users = SeaOrmUsersRepository::new(conn.clone());
        let managers = SeaOrmManagersRepository::new(conn);
        Service::new(Arc::new(users), ManagerRegistry::new(Arc::new(managers)))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Ids inserted by the startup seed; empty when managers already existed.
    pub fn seeded_managers(&self) -> &[String] {
        &self.seeded_managers
    }

    /// REST routes bound to this module's service.
    pub fn router(&self) -> Router {
        routes::register_routes(Router::new(), self.service.clone())
    }
}
