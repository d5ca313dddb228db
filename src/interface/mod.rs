// Interface layer: HTTP API, DTOs and router

use crate::domain::access_profile::{AccessProfile, ProfileStatus, ScreenPermissionState};
use crate::domain::catalog::{PermissionCatalog, Screen};
use crate::domain::permission::PermissionType;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ScreenPermissionDto {
    pub screen_id: String,
    pub permissions: Vec<PermissionType>,
}

impl From<ScreenPermissionDto> for ScreenPermissionState {
    fn from(dto: ScreenPermissionDto) -> Self {
        ScreenPermissionState {
            screen_id: dto.screen_id,
            permissions: dto.permissions,
        }
    }
}

impl From<&ScreenPermissionState> for ScreenPermissionDto {
    fn from(state: &ScreenPermissionState) -> Self {
        Self {
            screen_id: state.screen_id.clone(),
            permissions: state.permissions.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateProfileRequest {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProfileStatus>,
    #[serde(default)]
    pub permissions: Vec<ScreenPermissionDto>,
}

/// Omitted fields keep their current value; an empty description clears it.
#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProfileStatus>,
    pub permissions: Option<Vec<ScreenPermissionDto>>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProfileStatus,
    pub permissions: Vec<ScreenPermissionDto>,
    pub permission_count: usize,
    pub users_count: usize,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl From<&AccessProfile> for ProfileResponse {
    fn from(profile: &AccessProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            description: profile.description.clone(),
            status: profile.status,
            permissions: profile.permissions.iter().map(Into::into).collect(),
            permission_count: profile.permission_count(),
            users_count: profile.users_count,
            created_at: profile.created_at.to_rfc3339(),
            updated_at: profile.updated_at.to_rfc3339(),
            created_by: profile.created_by.clone(),
            updated_by: profile.updated_by.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileResponse>,
    pub total: usize,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileSearchParams {
    /// Case-insensitive match on name or description
    pub q: Option<String>,
    /// `active` or `inactive`
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ScreenResponse {
    pub id: String,
    pub name: String,
    pub available_permissions: Vec<PermissionType>,
}

impl From<&Screen> for ScreenResponse {
    fn from(screen: &Screen) -> Self {
        Self {
            id: screen.id.clone(),
            name: screen.name.clone(),
            available_permissions: screen.available_permissions.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ModuleResponse {
    pub key: String,
    pub label: String,
    pub screens: Vec<ScreenResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub modules: Vec<ModuleResponse>,
    pub total_permissions: usize,
}

impl From<&PermissionCatalog> for CatalogResponse {
    fn from(catalog: &PermissionCatalog) -> Self {
        let modules = catalog
            .list_modules()
            .iter()
            .map(|module| ModuleResponse {
                key: module.key.clone(),
                label: module.label.clone(),
                screens: catalog
                    .screens_in_module(&module.key)
                    .map(ScreenResponse::from)
                    .collect(),
            })
            .collect();
        Self {
            modules,
            total_permissions: catalog.total_permissions(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub field: Option<String>,
}

pub mod app_state;
pub mod http_handlers;

pub use app_state::AppState;
pub use http_handlers::{
    create_profile_handler, delete_profile_handler, get_catalog_handler, get_profile_handler,
    routes, search_profiles_handler, toggle_profile_status_handler, update_profile_handler,
};
