use super::queries::{GetPermissionCatalogQuery, GetProfileByIdQuery, SearchProfilesQuery};
use super::query_bus::QueryHandler;
use crate::domain::access_profile::AccessProfile;
use crate::domain::catalog::PermissionCatalog;
use crate::domain::error::ProfileError;
use crate::infrastructure::{ProfileRepository, ProfileSearch};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

// ============================================================================
// QUERY HANDLERS
// ============================================================================

/// Get access profile by id query handler
pub struct GetProfileByIdQueryHandler {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl GetProfileByIdQueryHandler {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }
}

#[async_trait]
impl QueryHandler<GetProfileByIdQuery> for GetProfileByIdQueryHandler {
    type Result = AccessProfile;

    #[instrument(name = "get_profile_by_id_query_handler", skip(self, query), fields(profile_id = %query.profile_id))]
    async fn handle(&self, query: GetProfileByIdQuery) -> Result<Self::Result, ProfileError> {
        self.profile_repo
            .find_by_id(&query.profile_id)
            .await?
            .ok_or(ProfileError::NotFound(query.profile_id))
    }
}

/// Search access profiles query handler
pub struct SearchProfilesQueryHandler {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl SearchProfilesQueryHandler {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }
}

#[async_trait]
impl QueryHandler<SearchProfilesQuery> for SearchProfilesQueryHandler {
    type Result = Vec<AccessProfile>;

    #[instrument(name = "search_profiles_query_handler", skip(self, query))]
    async fn handle(&self, query: SearchProfilesQuery) -> Result<Self::Result, ProfileError> {
        let filter = ProfileSearch {
            term: query.term,
            status: query.status,
        };
        let profiles = self.profile_repo.search(&filter).await?;
        tracing::debug!(count = profiles.len(), "Profiles matched search");
        Ok(profiles)
    }
}

/// Permission catalog query handler
pub struct GetPermissionCatalogQueryHandler {
    catalog: Arc<PermissionCatalog>,
}

impl GetPermissionCatalogQueryHandler {
    pub fn new(catalog: Arc<PermissionCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl QueryHandler<GetPermissionCatalogQuery> for GetPermissionCatalogQueryHandler {
    type Result = Arc<PermissionCatalog>;

    async fn handle(&self, _query: GetPermissionCatalogQuery) -> Result<Self::Result, ProfileError> {
        Ok(self.catalog.clone())
    }
}
