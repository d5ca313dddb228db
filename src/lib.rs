pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod test_utils;

use application::{
    command_bus::CommandBus,
    command_handlers::{
        CreateProfileCommandHandler, DeleteProfileCommandHandler,
        ToggleProfileStatusCommandHandler, UpdateProfileCommandHandler,
    },
    commands::{
        CreateProfileCommand, DeleteProfileCommand, ToggleProfileStatusCommand,
        UpdateProfileCommand,
    },
    queries::{GetPermissionCatalogQuery, GetProfileByIdQuery, SearchProfilesQuery},
    query_bus::QueryBus,
    query_handlers::{
        GetPermissionCatalogQueryHandler, GetProfileByIdQueryHandler, SearchProfilesQueryHandler,
    },
};
use domain::catalog::PermissionCatalog;
use domain::error::ProfileError;
use infrastructure::{
    InMemoryProfileRepository, InMemoryUserAssignmentRepository, Notifier,
    PostgresProfileRepository, ProfileRepository, ProfileSearch, TracingNotifier,
    UserAssignmentService, seed::seed_demo_data,
};
use interface::AppState;
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Where access profiles are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(ConfigError::Invalid(format!(
                "STORAGE_BACKEND must be 'memory' or 'postgres', got '{other}'"
            ))),
        }
    }
}

/// Application configuration with all environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub http_host: String,
    pub http_port: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub seed_demo_data: bool,
    pub fallback_profile_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_host: "127.0.0.1".to_string(),
            http_port: "8080".to_string(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            seed_demo_data: true,
            fallback_profile_name: "Administrador".to_string(),
        }
    }
}

impl AppConfig {
    /// Creates a new AppConfig from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let http_host = std::env::var("HTTP_HOST").unwrap_or(defaults.http_host);
        let http_port = std::env::var("HTTP_PORT").unwrap_or(defaults.http_port);
        let storage_backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingRequired("DATABASE_URL".to_string()));
        }

        let seed_demo_data = match std::env::var("SEED_DEMO_DATA") {
            Ok(value) => parse_flag("SEED_DEMO_DATA", &value)?,
            Err(_) => storage_backend == StorageBackend::Memory,
        };
        let fallback_profile_name = std::env::var("FALLBACK_PROFILE_NAME")
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.fallback_profile_name);

        Ok(AppConfig {
            http_host,
            http_port,
            storage_backend,
            database_url,
            seed_demo_data,
            fallback_profile_name,
        })
    }

    /// In-memory configuration without demo data (useful for testing)
    pub fn in_memory() -> Self {
        Self {
            seed_demo_data: false,
            ..Self::default()
        }
    }

    /// Creates the HTTP address string from host and port
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingRequired(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// APPLICATION BUILDER
// ============================================================================

/// Builder for creating application state with better testability
#[derive(Default)]
pub struct AppStateBuilder {
    pool: Option<PgPool>,
    config: Option<AppConfig>,
    catalog: Option<Arc<PermissionCatalog>>,
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    assignments: Option<Arc<InMemoryUserAssignmentRepository>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl AppStateBuilder {
    /// Creates a new AppStateBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database pool; profiles are then stored in PostgreSQL
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Sets the configuration
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<PermissionCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_profile_repository(mut self, profile_repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(profile_repo);
        self
    }

    pub fn with_assignments(mut self, assignments: Arc<InMemoryUserAssignmentRepository>) -> Self {
        self.assignments = Some(assignments);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Builds the application state
    pub async fn build(self) -> Result<Arc<AppState>, AppError> {
        let config = self.config.unwrap_or_default();
        let catalog = self.catalog.unwrap_or_else(PermissionCatalog::builtin);

        // Create repositories
        let profile_repo: Arc<dyn ProfileRepository> = match (self.profile_repo, self.pool) {
            (Some(repo), _) => repo,
            (None, Some(pool)) => {
                let repo = PostgresProfileRepository::new(pool);
                repo.ensure_schema().await?;
                Arc::new(repo)
            }
            (None, None) if config.storage_backend == StorageBackend::Postgres => {
                return Err(AppError::MissingPool);
            }
            (None, None) => Arc::new(InMemoryProfileRepository::new()),
        };
        let assignments = self
            .assignments
            .unwrap_or_else(|| Arc::new(InMemoryUserAssignmentRepository::new()));
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn Notifier>);

        if config.seed_demo_data {
            if profile_repo.list().await?.is_empty() {
                seed_demo_data(
                    catalog.clone(),
                    profile_repo.as_ref(),
                    &assignments,
                    &config.fallback_profile_name,
                )
                .await?;
            } else {
                tracing::info!("Profiles already stored, skipping demo data");
            }
        }
        assignments.bind_profile_repository(profile_repo.clone()).await;
        match Self::resolve_fallback_profile(profile_repo.as_ref(), &config.fallback_profile_name)
            .await?
        {
            Some(fallback_id) => {
                tracing::info!(fallback_id = %fallback_id, "Fallback profile resolved");
                assignments.set_fallback_profile(Some(fallback_id)).await;
            }
            None => tracing::warn!(
                name = %config.fallback_profile_name,
                "Fallback profile not found, deactivated profiles keep their users"
            ),
        }
        let assignments: Arc<dyn UserAssignmentService> = assignments;

        // Create CQRS buses
        let command_bus = Arc::new(CommandBus::new());
        let query_bus = Arc::new(QueryBus::new());

        Self::register_command_handlers(&command_bus, &profile_repo, &assignments, &notifier)
            .await;
        Self::register_query_handlers(&query_bus, &profile_repo, &catalog).await;

        Ok(Arc::new(AppState {
            profile_repo,
            assignments,
            notifier,
            catalog,
            command_bus,
            query_bus,
        }))
    }

    /// Finds the stored profile whose name equals `name`, ignoring case
    async fn resolve_fallback_profile(
        profile_repo: &dyn ProfileRepository,
        name: &str,
    ) -> Result<Option<String>, ProfileError> {
        let candidates = profile_repo
            .search(&ProfileSearch {
                term: Some(name.to_string()),
                status: None,
            })
            .await?;
        Ok(candidates
            .into_iter()
            .find(|p| p.name_matches(name))
            .map(|p| p.id))
    }

    /// Registers all command handlers
    async fn register_command_handlers(
        command_bus: &Arc<CommandBus>,
        profile_repo: &Arc<dyn ProfileRepository>,
        assignments: &Arc<dyn UserAssignmentService>,
        notifier: &Arc<dyn Notifier>,
    ) {
        command_bus
            .register_handler::<CreateProfileCommand, _>(CreateProfileCommandHandler::new(
                profile_repo.clone(),
                notifier.clone(),
            ))
            .await;

        command_bus
            .register_handler::<UpdateProfileCommand, _>(UpdateProfileCommandHandler::new(
                profile_repo.clone(),
                assignments.clone(),
                notifier.clone(),
            ))
            .await;

        command_bus
            .register_handler::<DeleteProfileCommand, _>(DeleteProfileCommandHandler::new(
                profile_repo.clone(),
                notifier.clone(),
            ))
            .await;

        command_bus
            .register_handler::<ToggleProfileStatusCommand, _>(
                ToggleProfileStatusCommandHandler::new(
                    profile_repo.clone(),
                    assignments.clone(),
                    notifier.clone(),
                ),
            )
            .await;
    }

    /// Registers all query handlers
    async fn register_query_handlers(
        query_bus: &Arc<QueryBus>,
        profile_repo: &Arc<dyn ProfileRepository>,
        catalog: &Arc<PermissionCatalog>,
    ) {
        query_bus
            .register_handler::<GetProfileByIdQuery, _>(GetProfileByIdQueryHandler::new(
                profile_repo.clone(),
            ))
            .await;

        query_bus
            .register_handler::<SearchProfilesQuery, _>(SearchProfilesQueryHandler::new(
                profile_repo.clone(),
            ))
            .await;

        query_bus
            .register_handler::<GetPermissionCatalogQuery, _>(
                GetPermissionCatalogQueryHandler::new(catalog.clone()),
            )
            .await;
    }
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing database pool")]
    MissingPool,
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Initialization error: {0}")]
    Initialization(#[from] ProfileError),
}
