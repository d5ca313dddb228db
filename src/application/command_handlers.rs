use super::command_bus::CommandHandler;
use super::commands::{
    CreateProfileCommand, DeleteProfileCommand, ToggleProfileStatusCommand, UpdateProfileCommand,
};
use super::events::{DomainEvent, EventFactory};
use crate::domain::access_profile::{AccessProfile, ProfileStatus};
use crate::domain::error::ProfileError;
use crate::domain::notification::{Notification, ProfileAction};
use crate::infrastructure::{Notifier, ProfileRepository, UserAssignmentService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

/// Reports a failed mutation. Field-level validation errors are left to the
/// form and are not broadcast.
fn report_failure(
    notifier: &dyn Notifier,
    action: ProfileAction,
    profile_id: Option<&str>,
    actor: Option<String>,
    err: &ProfileError,
) {
    tracing::warn!(?action, profile_id, error = %err, "Profile command rejected");
    if err.is_validation() {
        return;
    }
    notifier.notify(Notification::failure(action, profile_id, err.to_string()).with_actor(actor));
}

/// Runs the user-assignment contract point for a profile that just became
/// inactive. Stored user counts move by the number of users actually
/// reassigned; when nobody moved they are left as they are.
async fn reassign_users(
    profile_repo: &dyn ProfileRepository,
    assignments: &dyn UserAssignmentService,
    profile: &mut AccessProfile,
) -> Option<String> {
    let reassignment = match assignments.profile_deactivated(&profile.id).await {
        Ok(Some(reassignment)) => reassignment,
        Ok(None) => return None,
        Err(err) => {
            tracing::error!(error = %err, "User reassignment failed");
            return None;
        }
    };
    let fallback_id = reassignment.fallback_profile_id;
    if reassignment.moved == 0 {
        return Some(fallback_id);
    }

    let remaining = profile.users_count.saturating_sub(reassignment.moved);
    match profile_repo.set_users_count(&profile.id, remaining).await {
        Ok(()) => profile.users_count = remaining,
        Err(err) => tracing::error!(error = %err, "Failed to refresh users count"),
    }
    let fallback_count = match profile_repo.find_by_id(&fallback_id).await {
        Ok(Some(fallback)) => fallback.users_count + reassignment.moved,
        Ok(None) => {
            tracing::warn!(fallback_id = %fallback_id, "Fallback profile not stored");
            return Some(fallback_id);
        }
        Err(err) => {
            tracing::error!(error = %err, fallback_id = %fallback_id, "Failed to load fallback profile");
            return Some(fallback_id);
        }
    };
    if let Err(err) = profile_repo.set_users_count(&fallback_id, fallback_count).await {
        tracing::error!(error = %err, fallback_id = %fallback_id, "Failed to refresh fallback users count");
    }
    Some(fallback_id)
}

/// Create access profile command handler
pub struct CreateProfileCommandHandler {
    profile_repo: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn Notifier>,
}

impl CreateProfileCommandHandler {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            profile_repo,
            notifier,
        }
    }
}

#[async_trait]
impl CommandHandler<CreateProfileCommand> for CreateProfileCommandHandler {
    type Result = AccessProfile;

    #[instrument(name = "create_profile_command_handler", skip(self, command))]
    async fn handle(&self, command: CreateProfileCommand) -> Result<Self::Result, ProfileError> {
        let actor = command.actor.clone();
        let profile = match self.profile_repo.create(command.input, command.actor).await {
            Ok(profile) => profile,
            Err(err) => {
                report_failure(&*self.notifier, ProfileAction::Create, None, actor, &err);
                return Err(err);
            }
        };

        let event = EventFactory::profile_created(
            profile.id.clone(),
            profile.name.clone(),
            profile.permission_count(),
            actor.clone(),
        );
        tracing::info!(event_id = %event.event_id(), profile_id = %profile.id, "Profile created event published");

        self.notifier.notify(
            Notification::success(
                ProfileAction::Create,
                &profile.id,
                format!("Perfil \"{}\" criado com sucesso", profile.name),
            )
            .with_actor(actor),
        );
        Ok(profile)
    }
}

/// Update access profile command handler
///
/// An update that moves the profile from active to inactive goes through the
/// same user reassignment as a status toggle.
pub struct UpdateProfileCommandHandler {
    profile_repo: Arc<dyn ProfileRepository>,
    assignments: Arc<dyn UserAssignmentService>,
    notifier: Arc<dyn Notifier>,
}

impl UpdateProfileCommandHandler {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        assignments: Arc<dyn UserAssignmentService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            profile_repo,
            assignments,
            notifier,
        }
    }

    async fn update_and_reassign(
        &self,
        command: UpdateProfileCommand,
    ) -> Result<AccessProfile, ProfileError> {
        let deactivating = command.changes.status == Some(ProfileStatus::Inactive);
        let was_active = self
            .profile_repo
            .find_by_id(&command.profile_id)
            .await?
            .is_some_and(|p| p.is_active());
        let mut profile = self
            .profile_repo
            .update(&command.profile_id, command.changes, command.actor)
            .await?;
        if deactivating && was_active && profile.status == ProfileStatus::Inactive {
            reassign_users(&*self.profile_repo, &*self.assignments, &mut profile).await;
        }
        Ok(profile)
    }
}

#[async_trait]
impl CommandHandler<UpdateProfileCommand> for UpdateProfileCommandHandler {
    type Result = AccessProfile;

    #[instrument(name = "update_profile_command_handler", skip(self, command), fields(profile_id = %command.profile_id))]
    async fn handle(&self, command: UpdateProfileCommand) -> Result<Self::Result, ProfileError> {
        let actor = command.actor.clone();
        let profile_id = command.profile_id.clone();
        let profile = match self.update_and_reassign(command).await {
            Ok(profile) => profile,
            Err(err) => {
                report_failure(
                    &*self.notifier,
                    ProfileAction::Update,
                    Some(&profile_id),
                    actor,
                    &err,
                );
                return Err(err);
            }
        };

        let event = EventFactory::profile_updated(
            profile.id.clone(),
            profile.name.clone(),
            profile.permission_count(),
            actor.clone(),
        );
        tracing::info!(event_id = %event.event_id(), "Profile updated event published");

        self.notifier.notify(
            Notification::success(
                ProfileAction::Update,
                &profile.id,
                format!("Perfil \"{}\" atualizado com sucesso", profile.name),
            )
            .with_actor(actor),
        );
        Ok(profile)
    }
}

/// Delete access profile command handler
pub struct DeleteProfileCommandHandler {
    profile_repo: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn Notifier>,
}

impl DeleteProfileCommandHandler {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            profile_repo,
            notifier,
        }
    }
}

#[async_trait]
impl CommandHandler<DeleteProfileCommand> for DeleteProfileCommandHandler {
    type Result = ();

    #[instrument(name = "delete_profile_command_handler", skip(self, command), fields(profile_id = %command.profile_id))]
    async fn handle(&self, command: DeleteProfileCommand) -> Result<Self::Result, ProfileError> {
        if let Err(err) = self.profile_repo.delete(&command.profile_id).await {
            report_failure(
                &*self.notifier,
                ProfileAction::Delete,
                Some(&command.profile_id),
                command.actor,
                &err,
            );
            return Err(err);
        }

        let event = EventFactory::profile_deleted(command.profile_id.clone(), command.actor.clone());
        tracing::info!(event_id = %event.event_id(), "Profile deleted event published");

        self.notifier.notify(
            Notification::success(
                ProfileAction::Delete,
                &command.profile_id,
                "Perfil excluído com sucesso".to_string(),
            )
            .with_actor(command.actor),
        );
        Ok(())
    }
}

/// Toggle access profile status command handler
///
/// Deactivation fires the user-assignment contract point once. A collaborator
/// failure is logged and never undoes the status change.
pub struct ToggleProfileStatusCommandHandler {
    profile_repo: Arc<dyn ProfileRepository>,
    assignments: Arc<dyn UserAssignmentService>,
    notifier: Arc<dyn Notifier>,
}

impl ToggleProfileStatusCommandHandler {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        assignments: Arc<dyn UserAssignmentService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            profile_repo,
            assignments,
            notifier,
        }
    }
}

#[async_trait]
impl CommandHandler<ToggleProfileStatusCommand> for ToggleProfileStatusCommandHandler {
    type Result = AccessProfile;

    #[instrument(name = "toggle_profile_status_command_handler", skip(self, command), fields(profile_id = %command.profile_id))]
    async fn handle(
        &self,
        command: ToggleProfileStatusCommand,
    ) -> Result<Self::Result, ProfileError> {
        let actor = command.actor.clone();
        let mut profile = match self
            .profile_repo
            .toggle_status(&command.profile_id, command.actor)
            .await
        {
            Ok(profile) => profile,
            Err(err) => {
                report_failure(
                    &*self.notifier,
                    ProfileAction::ToggleStatus,
                    Some(&command.profile_id),
                    actor,
                    &err,
                );
                return Err(err);
            }
        };

        let reassigned_to = if profile.status == ProfileStatus::Inactive {
            reassign_users(&*self.profile_repo, &*self.assignments, &mut profile).await
        } else {
            None
        };

        let event = EventFactory::profile_status_toggled(
            profile.id.clone(),
            profile.status,
            reassigned_to,
            actor.clone(),
        );
        tracing::info!(event_id = %event.event_id(), status = %profile.status, "Profile status toggled event published");

        let message = match profile.status {
            ProfileStatus::Active => format!("Perfil \"{}\" ativado", profile.name),
            ProfileStatus::Inactive => format!("Perfil \"{}\" desativado", profile.name),
        };
        self.notifier.notify(
            Notification::success(ProfileAction::ToggleStatus, &profile.id, message)
                .with_actor(actor),
        );
        Ok(profile)
    }
}
