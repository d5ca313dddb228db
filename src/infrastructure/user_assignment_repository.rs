use crate::infrastructure::{ProfileRepository, Reassignment, RepoResult, UserAssignmentService};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Internal user holding one access profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAssignment {
    pub user_id: String,
    pub user_name: String,
    pub profile_id: String,
}

/// User-to-profile assignments kept in process memory.
///
/// When a profile is deactivated its users move to the fallback profile, if one
/// is configured and it is not the deactivated profile itself. Once a profile
/// repository is bound, the fallback must also exist and be active.
pub struct InMemoryUserAssignmentRepository {
    assignments: RwLock<Vec<UserAssignment>>,
    fallback_profile_id: RwLock<Option<String>>,
    profiles: RwLock<Option<Arc<dyn ProfileRepository>>>,
    deactivations: RwLock<Vec<String>>,
}

impl InMemoryUserAssignmentRepository {
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(vec![]),
            fallback_profile_id: RwLock::new(None),
            profiles: RwLock::new(None),
            deactivations: RwLock::new(vec![]),
        }
    }

    pub async fn set_fallback_profile(&self, profile_id: Option<String>) {
        *self.fallback_profile_id.write().await = profile_id;
    }

    pub async fn fallback_profile(&self) -> Option<String> {
        self.fallback_profile_id.read().await.clone()
    }

    /// Profile store used to check the fallback's status before moving users.
    pub async fn bind_profile_repository(&self, profiles: Arc<dyn ProfileRepository>) {
        *self.profiles.write().await = Some(profiles);
    }

    async fn fallback_is_active(&self, fallback_id: &str) -> RepoResult<bool> {
        let profiles = self.profiles.read().await.clone();
        let Some(profiles) = profiles else {
            return Ok(true);
        };
        Ok(profiles
            .find_by_id(fallback_id)
            .await?
            .is_some_and(|p| p.is_active()))
    }

    /// Assigns a profile to a user, replacing the user's previous profile.
    pub async fn assign(&self, user_id: &str, user_name: &str, profile_id: &str) {
        let mut assignments = self.assignments.write().await;
        assignments.retain(|a| a.user_id != user_id);
        assignments.push(UserAssignment {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            profile_id: profile_id.to_string(),
        });
    }

    pub async fn users_of(&self, profile_id: &str) -> Vec<UserAssignment> {
        self.assignments
            .read()
            .await
            .iter()
            .filter(|a| a.profile_id == profile_id)
            .cloned()
            .collect()
    }

    /// Profiles for which the deactivation contract point fired, in call order.
    pub async fn deactivations(&self) -> Vec<String> {
        self.deactivations.read().await.clone()
    }
}

impl Default for InMemoryUserAssignmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserAssignmentService for InMemoryUserAssignmentRepository {
    async fn count_users_for_profile(&self, profile_id: &str) -> RepoResult<usize> {
        let assignments = self.assignments.read().await;
        Ok(assignments.iter().filter(|a| a.profile_id == profile_id).count())
    }

    #[instrument(skip(self))]
    async fn profile_deactivated(&self, profile_id: &str) -> RepoResult<Option<Reassignment>> {
        self.deactivations.write().await.push(profile_id.to_string());

        let fallback = self.fallback_profile_id.read().await.clone();
        let Some(fallback) = fallback.filter(|f| f != profile_id) else {
            tracing::warn!("No fallback profile available, users keep the inactive profile");
            return Ok(None);
        };
        if !self.fallback_is_active(&fallback).await? {
            tracing::warn!(fallback_profile_id = %fallback, "Fallback profile is missing or inactive, users keep the inactive profile");
            return Ok(None);
        }

        let mut assignments = self.assignments.write().await;
        let mut moved = 0;
        for assignment in assignments.iter_mut().filter(|a| a.profile_id == profile_id) {
            assignment.profile_id = fallback.clone();
            moved += 1;
        }
        tracing::info!(moved, fallback_profile_id = %fallback, "Users reassigned to fallback profile");
        Ok(Some(Reassignment {
            fallback_profile_id: fallback,
            moved,
        }))
    }
}
