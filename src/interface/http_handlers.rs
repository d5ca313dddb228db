use crate::application::commands::CommandFactory;
use crate::application::editing::{ProfileEditingSession, ProfileForm, SubmitError};
use crate::application::queries::QueryFactory;
use crate::domain::access_profile::{AccessProfile, ProfileStatus, ScreenPermissionState};
use crate::domain::catalog::PermissionCatalog;
use crate::domain::error::ProfileError;
use crate::interface::app_state::AppState;
use crate::interface::{
    CatalogResponse, CreateProfileRequest, ErrorResponse, ProfileListResponse, ProfileResponse,
    ProfileSearchParams, ScreenPermissionDto, UpdateProfileRequest,
};
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::{StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Actor of the request, taken from the `x-user-id` header.
pub struct CurrentUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Missing user id", None))?;
        Ok(CurrentUser { user_id })
    }
}

/// Error body plus status code; every handler failure goes through here.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    field: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, field: Option<&str>) -> Self {
        Self {
            status,
            error: error.into(),
            field: field.map(str::to_string),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        SubmitError::from(err).into()
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        let field = err.field().map(|f| f.as_str());
        let status = match err.error() {
            ProfileError::EmptyName
            | ProfileError::DuplicateName(_)
            | ProfileError::NoPermissionsSelected => StatusCode::UNPROCESSABLE_ENTITY,
            ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
            ProfileError::HasAssignedUsers(_) | ProfileError::SessionClosed => StatusCode::CONFLICT,
            ProfileError::Storage(_) | ProfileError::Dispatch(_) => {
                tracing::error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, err.error().to_string(), field)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.error,
                field: self.field,
            }),
        )
            .into_response()
    }
}

fn permission_states(dtos: Vec<ScreenPermissionDto>) -> Vec<ScreenPermissionState> {
    dtos.into_iter().map(Into::into).collect()
}

async fn load_profile(state: &AppState, profile_id: String) -> Result<AccessProfile, ApiError> {
    let profile = state
        .query_bus
        .execute::<_, AccessProfile>(QueryFactory::get_profile_by_id(profile_id))
        .await?;
    Ok(profile)
}

// --- CATALOG ---

#[axum::debug_handler]
#[utoipa::path(
    get,
    path = "/v1/access-profiles/catalog",
    responses(
        (status = 200, description = "Modules with their screens", body = CatalogResponse),
        (status = 401, description = "Missing user id", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Read the permission catalog used to build the permission matrix."
)]
pub async fn get_catalog_handler(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<CatalogResponse>, ApiError> {
    let catalog = state
        .query_bus
        .execute::<_, Arc<PermissionCatalog>>(QueryFactory::get_permission_catalog())
        .await?;
    Ok(Json(CatalogResponse::from(catalog.as_ref())))
}

// --- PROFILES ---

#[axum::debug_handler]
#[utoipa::path(
    get,
    path = "/v1/access-profiles",
    params(ProfileSearchParams),
    responses(
        (status = 200, description = "Matching profiles in creation order", body = ProfileListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Search access profiles by name or description and status."
)]
pub async fn search_profiles_handler(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(params): Query<ProfileSearchParams>,
) -> Result<Json<ProfileListResponse>, ApiError> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<ProfileStatus>)
        .transpose()
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e, Some("status")))?;

    let profiles = state
        .query_bus
        .execute::<_, Vec<AccessProfile>>(QueryFactory::search_profiles(params.q, status))
        .await?;

    Ok(Json(ProfileListResponse {
        total: profiles.len(),
        profiles: profiles.iter().map(ProfileResponse::from).collect(),
    }))
}

#[axum::debug_handler]
#[utoipa::path(
    post,
    path = "/v1/access-profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 422, description = "Invalid name or no permission selected", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Create an access profile. Permissions not offered by a screen are ignored."
)]
pub async fn create_profile_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser { user_id }: CurrentUser,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let mut session = ProfileEditingSession::open_for_create(
        state.catalog.clone(),
        state.command_bus.clone(),
        Some(user_id),
    );
    session
        .matrix_mut()
        .initialize(&permission_states(payload.permissions));

    let profile = session
        .submit(ProfileForm {
            name: payload.name,
            description: payload.description,
            status: payload.status.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(&profile))))
}

#[axum::debug_handler]
#[utoipa::path(
    get,
    path = "/v1/access-profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Get an access profile by id."
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(profile_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = load_profile(&state, profile_id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

#[axum::debug_handler]
#[utoipa::path(
    put,
    path = "/v1/access-profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 422, description = "Invalid name or no permission selected", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Update an access profile. Omitted fields keep their current value."
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser { user_id }: CurrentUser,
    Path(profile_id): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let current = load_profile(&state, profile_id).await?;
    let mut session = ProfileEditingSession::open_for_edit(
        state.catalog.clone(),
        state.command_bus.clone(),
        &current,
        Some(user_id),
    );
    if let Some(permissions) = payload.permissions {
        session
            .matrix_mut()
            .initialize(&permission_states(permissions));
    }

    let mut form = session.form().clone();
    if let Some(name) = payload.name {
        form.name = name;
    }
    if let Some(description) = payload.description {
        form.description = Some(description);
    }
    if let Some(status) = payload.status {
        form.status = status;
    }

    let profile = session.submit(form).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

#[axum::debug_handler]
#[utoipa::path(
    delete,
    path = "/v1/access-profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile id")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 409, description = "Profile still has assigned users", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Delete an access profile that has no assigned users."
)]
pub async fn delete_profile_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser { user_id }: CurrentUser,
    Path(profile_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .command_bus
        .execute::<_, ()>(CommandFactory::delete_profile(profile_id, Some(user_id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
#[utoipa::path(
    post,
    path = "/v1/access-profiles/{profile_id}/toggle-status",
    params(("profile_id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Status toggled", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    tags = ["Access Profiles"],
    description = "Flip a profile between active and inactive. Deactivation moves its users to the fallback profile."
)]
pub async fn toggle_profile_status_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser { user_id }: CurrentUser,
    Path(profile_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .command_bus
        .execute::<_, AccessProfile>(CommandFactory::toggle_profile_status(
            profile_id,
            Some(user_id),
        ))
        .await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Versioned API routes bound to the application state.
pub fn routes(app_state: Arc<AppState>) -> Router {
    let v1_routes = Router::new()
        .route("/access-profiles/catalog", get(get_catalog_handler))
        .route(
            "/access-profiles",
            get(search_profiles_handler).post(create_profile_handler),
        )
        .route(
            "/access-profiles/{profile_id}",
            get(get_profile_handler)
                .put(update_profile_handler)
                .delete(delete_profile_handler),
        )
        .route(
            "/access-profiles/{profile_id}/toggle-status",
            post(toggle_profile_status_handler),
        );

    Router::new().nest("/v1", v1_routes).with_state(app_state)
}
