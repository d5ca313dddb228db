use crate::application::validators::CreateProfileInput;
use crate::domain::access_profile::{AccessProfile, ScreenPermissionState};
use crate::domain::catalog::{Module, PermissionCatalog, Screen};
use crate::domain::permission::PermissionType;
use crate::infrastructure::{
    InMemoryProfileRepository, InMemoryUserAssignmentRepository, ProfileRepository,
    RecordingNotifier,
};
use crate::interface::app_state::AppState;
use crate::{AppConfig, AppStateBuilder};
use std::sync::Arc;

/// Header carrying the acting user over HTTP
pub const TEST_USER_HEADER: (&str, &str) = ("x-user-id", "admin");

/// Small catalog with two modules and eleven permissions
pub fn create_test_catalog() -> Arc<PermissionCatalog> {
    use PermissionType::*;
    Arc::new(PermissionCatalog::new(
        vec![
            Module::new("juridico", "Jurídico"),
            Module::new("sistema", "Sistema"),
        ],
        vec![
            Screen::new(
                "processos",
                "Processos",
                "juridico",
                &[View, Create, Edit, Delete, EditConfidential],
            ),
            Screen::new("relatorio", "Relatório", "juridico", &[View, Export]),
            Screen::new("usuarios", "Usuários", "sistema", &[View, Create, Edit, Delete]),
        ],
    ))
}

pub fn screen_permissions(screen_id: &str, permissions: &[PermissionType]) -> ScreenPermissionState {
    ScreenPermissionState::new(screen_id, permissions.to_vec())
}

/// Valid creation input with view access to one builtin screen
pub fn create_profile_input(name: &str) -> CreateProfileInput {
    CreateProfileInput {
        permissions: vec![screen_permissions("clientes", &[PermissionType::View])],
        ..CreateProfileInput::new(name)
    }
}

/// Creates a profile and sets its assigned user count
pub async fn create_test_profile(
    repo: &dyn ProfileRepository,
    name: &str,
    users_count: usize,
) -> AccessProfile {
    let profile = repo
        .create(create_profile_input(name), Some("admin".to_string()))
        .await
        .unwrap();
    if users_count > 0 {
        repo.set_users_count(&profile.id, users_count).await.unwrap();
    }
    repo.find_by_id(&profile.id).await.unwrap().unwrap()
}

/// Application state plus handles on its in-memory collaborators
pub struct TestContext {
    pub state: Arc<AppState>,
    pub profile_repo: Arc<InMemoryProfileRepository>,
    pub assignments: Arc<InMemoryUserAssignmentRepository>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Creates an empty in-memory application with recording collaborators
pub async fn create_test_context() -> TestContext {
    let profile_repo = Arc::new(InMemoryProfileRepository::new());
    let assignments = Arc::new(InMemoryUserAssignmentRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let state = AppStateBuilder::new()
        .with_config(AppConfig::in_memory())
        .with_profile_repository(profile_repo.clone())
        .with_assignments(assignments.clone())
        .with_notifier(notifier.clone())
        .build()
        .await
        .unwrap();

    TestContext {
        state,
        profile_repo,
        assignments,
        notifier,
    }
}

/// Creates an in-memory application loaded with the demo profiles
pub async fn create_test_app_state() -> Arc<AppState> {
    AppStateBuilder::new()
        .with_config(AppConfig::default())
        .build()
        .await
        .unwrap()
}

/// Connects to `DATABASE_URL`, or `None` when it is unset
pub async fn create_test_pool() -> Option<sqlx::PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    Some(
        sqlx::PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database"),
    )
}
