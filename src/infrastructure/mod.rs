use crate::domain::access_profile::{AccessProfile, ProfileStatus};
use crate::domain::error::ProfileError;
use crate::domain::notification::Notification;
use crate::application::validators::{CreateProfileInput, UpdateProfileInput};
use async_trait::async_trait;
pub type RepoResult<T> = Result<T, ProfileError>;

// Infrastructure layer: storage adapters and collaborator implementations
pub mod profile_repository;
pub use profile_repository::InMemoryProfileRepository;
pub use profile_repository::PostgresProfileRepository;

pub mod user_assignment_repository;
pub use user_assignment_repository::InMemoryUserAssignmentRepository;
pub use user_assignment_repository::UserAssignment;

pub mod notifier;
pub use notifier::RecordingNotifier;
pub use notifier::TracingNotifier;

pub mod seed;

/// Filter of a profile search. Empty term matches every profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileSearch {
    pub term: Option<String>,
    pub status: Option<ProfileStatus>,
}

impl ProfileSearch {
    pub fn matches(&self, profile: &AccessProfile) -> bool {
        let term_ok = match self.term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => profile.matches_term(term),
            _ => true,
        };
        term_ok && self.status.is_none_or(|status| profile.status == status)
    }
}

/// Exclusive owner of the access-profile collection.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, input: CreateProfileInput, actor: Option<String>)
    -> RepoResult<AccessProfile>;
    async fn update(
        &self,
        profile_id: &str,
        changes: UpdateProfileInput,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile>;
    async fn delete(&self, profile_id: &str) -> RepoResult<()>;
    async fn toggle_status(&self, profile_id: &str, actor: Option<String>)
    -> RepoResult<AccessProfile>;
    async fn find_by_id(&self, profile_id: &str) -> RepoResult<Option<AccessProfile>>;
    async fn search(&self, filter: &ProfileSearch) -> RepoResult<Vec<AccessProfile>>;
    async fn list(&self) -> RepoResult<Vec<AccessProfile>>;
    async fn set_users_count(&self, profile_id: &str, users_count: usize) -> RepoResult<()>;
}

/// Keeps track of which users hold which profile.
#[async_trait]
pub trait UserAssignmentService: Send + Sync {
    async fn count_users_for_profile(&self, profile_id: &str) -> RepoResult<usize>;
    /// Contract point invoked once when a profile goes from active to inactive.
    /// Implementations move the profile's users to an active fallback profile
    /// and report how many were moved, or `None` when nothing was reassigned.
    async fn profile_deactivated(&self, profile_id: &str) -> RepoResult<Option<Reassignment>>;
}

/// Outcome of moving a deactivated profile's users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reassignment {
    pub fallback_profile_id: String,
    pub moved: usize,
}

/// Receives operation outcomes. Delivery failures are the notifier's own concern.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
