use access_profiles_service::interface::{
    CatalogResponse, CreateProfileRequest, ErrorResponse, ModuleResponse, ProfileListResponse,
    ProfileResponse, ScreenPermissionDto, ScreenResponse, UpdateProfileRequest, routes,
};
use access_profiles_service::domain::access_profile::ProfileStatus;
use access_profiles_service::domain::permission::PermissionType;
use access_profiles_service::{AppConfig, AppStateBuilder, StorageBackend};
use dotenvy::dotenv;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        access_profiles_service::interface::http_handlers::get_catalog_handler,
        access_profiles_service::interface::http_handlers::search_profiles_handler,
        access_profiles_service::interface::http_handlers::create_profile_handler,
        access_profiles_service::interface::http_handlers::get_profile_handler,
        access_profiles_service::interface::http_handlers::update_profile_handler,
        access_profiles_service::interface::http_handlers::delete_profile_handler,
        access_profiles_service::interface::http_handlers::toggle_profile_status_handler,
    ),
    components(schemas(
        CatalogResponse, ModuleResponse, ScreenResponse, CreateProfileRequest, UpdateProfileRequest,
        ProfileResponse, ProfileListResponse, ScreenPermissionDto, ErrorResponse, ProfileStatus,
        PermissionType
    )),
    tags(
        (name = "Access Profiles", description = "Access profile and permission matrix management")
    )
)]
pub struct ApiDoc;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse environment variables
    let config = AppConfig::from_env().expect("Failed to parse environment variables");

    // Setup application state
    let mut builder = AppStateBuilder::new().with_config(config.clone());
    if config.storage_backend == StorageBackend::Postgres {
        let database_url = config
            .database_url
            .as_deref()
            .expect("DATABASE_URL is required for the postgres backend");
        let pool = PgPool::connect(database_url)
            .await
            .expect("Failed to connect to DB");
        builder = builder.with_pool(pool);
    }
    let app_state = builder.build().await.expect("Failed to setup application");

    // Create HTTP address
    let http_addr = config.http_address();

    // Create OpenAPI documentation
    let openapi = ApiDoc::openapi();

    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger").url("/openapi.json", openapi));

    let listener = TcpListener::bind(&http_addr).await.expect("Failed to bind");
    tracing::info!(
        address = %http_addr,
        backend = ?config.storage_backend,
        "HTTP server running"
    );
    axum::serve(listener, app).await.expect("HTTP server failed");
}
