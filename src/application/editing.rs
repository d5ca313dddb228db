use super::command_bus::CommandBus;
use super::commands::CommandFactory;
use super::validators::{CreateProfileInput, ProfileValidator, UpdateProfileInput};
use crate::domain::access_profile::{AccessProfile, ProfileStatus};
use crate::domain::catalog::PermissionCatalog;
use crate::domain::error::ProfileError;
use crate::domain::permission_matrix::PermissionMatrix;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Form field a submit error is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Permissions,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Permissions => "permissions",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("{field}: {error}")]
    Field { field: FormField, error: ProfileError },
    #[error(transparent)]
    Operation(ProfileError),
}

impl SubmitError {
    pub fn field(&self) -> Option<FormField> {
        match self {
            SubmitError::Field { field, .. } => Some(*field),
            SubmitError::Operation(_) => None,
        }
    }

    pub fn error(&self) -> &ProfileError {
        match self {
            SubmitError::Field { error, .. } | SubmitError::Operation(error) => error,
        }
    }
}

impl From<ProfileError> for SubmitError {
    fn from(error: ProfileError) -> Self {
        let field = match error {
            ProfileError::EmptyName | ProfileError::DuplicateName(_) => FormField::Name,
            ProfileError::NoPermissionsSelected => FormField::Permissions,
            other => return SubmitError::Operation(other),
        };
        SubmitError::Field { field, error }
    }
}

/// Plain form fields of the profile editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub description: Option<String>,
    pub status: ProfileStatus,
}

impl From<&AccessProfile> for ProfileForm {
    fn from(profile: &AccessProfile) -> Self {
        Self {
            name: profile.name.clone(),
            description: profile.description.clone(),
            status: profile.status,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum EditTarget {
    Create,
    Edit(String),
}

/// One create or edit of a profile: a form, a permission matrix, and a single
/// successful submit.
pub struct ProfileEditingSession {
    command_bus: Arc<CommandBus>,
    target: EditTarget,
    form: ProfileForm,
    matrix: PermissionMatrix,
    actor: Option<String>,
    closed: bool,
}

impl ProfileEditingSession {
    pub fn open_for_create(
        catalog: Arc<PermissionCatalog>,
        command_bus: Arc<CommandBus>,
        actor: Option<String>,
    ) -> Self {
        Self {
            command_bus,
            target: EditTarget::Create,
            form: ProfileForm::default(),
            matrix: PermissionMatrix::new(catalog),
            actor,
            closed: false,
        }
    }

    pub fn open_for_edit(
        catalog: Arc<PermissionCatalog>,
        command_bus: Arc<CommandBus>,
        profile: &AccessProfile,
        actor: Option<String>,
    ) -> Self {
        let mut matrix = PermissionMatrix::new(catalog);
        matrix.initialize(&profile.permissions);
        Self {
            command_bus,
            target: EditTarget::Edit(profile.id.clone()),
            form: ProfileForm::from(profile),
            matrix,
            actor,
            closed: false,
        }
    }

    /// Prefilled form values.
    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut PermissionMatrix {
        &mut self.matrix
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.target, EditTarget::Edit(_))
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    pub fn cancel(&mut self) {
        if !self.closed {
            tracing::debug!("Profile editing session cancelled");
        }
        self.closed = true;
    }

    /// Validates the form and the matrix, then creates or updates the profile.
    /// The session closes only on success.
    #[instrument(name = "profile_editing_submit", skip(self, form), fields(editing = self.is_editing()))]
    pub async fn submit(&mut self, form: ProfileForm) -> Result<AccessProfile, SubmitError> {
        if self.closed {
            return Err(SubmitError::Operation(ProfileError::SessionClosed));
        }

        let name = ProfileValidator::validate_name(&form.name)?;
        let permissions = self.matrix.export_state();
        if permissions.is_empty() {
            return Err(ProfileError::NoPermissionsSelected.into());
        }

        let profile = match &self.target {
            EditTarget::Create => {
                let input = CreateProfileInput {
                    name,
                    description: form.description.clone(),
                    status: form.status,
                    permissions,
                };
                let command = CommandFactory::create_profile(input, self.actor.clone());
                self.command_bus
                    .execute::<_, AccessProfile>(command)
                    .await?
            }
            EditTarget::Edit(profile_id) => {
                let changes = UpdateProfileInput {
                    name: Some(name),
                    description: Some(form.description.clone()),
                    status: Some(form.status),
                    permissions: Some(permissions),
                };
                let command =
                    CommandFactory::update_profile(profile_id.clone(), changes, self.actor.clone());
                self.command_bus
                    .execute::<_, AccessProfile>(command)
                    .await?
            }
        };

        self.form = form;
        self.closed = true;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::command_handlers::{
        CreateProfileCommandHandler, UpdateProfileCommandHandler,
    };
    use crate::application::commands::{CreateProfileCommand, UpdateProfileCommand};
    use crate::domain::permission::PermissionType;
    use crate::infrastructure::{
        InMemoryProfileRepository, InMemoryUserAssignmentRepository, ProfileRepository,
        RecordingNotifier,
    };

    async fn bus_with(repo: Arc<InMemoryProfileRepository>) -> Arc<CommandBus> {
        let notifier = Arc::new(RecordingNotifier::new());
        let bus = CommandBus::new();
        bus.register_handler::<CreateProfileCommand, _>(CreateProfileCommandHandler::new(
            repo.clone(),
            notifier.clone(),
        ))
        .await;
        bus.register_handler::<UpdateProfileCommand, _>(UpdateProfileCommandHandler::new(
            repo,
            Arc::new(InMemoryUserAssignmentRepository::new()),
            notifier,
        ))
        .await;
        Arc::new(bus)
    }

    fn form(name: &str) -> ProfileForm {
        ProfileForm {
            name: name.to_string(),
            ..ProfileForm::default()
        }
    }

    #[tokio::test]
    async fn test_submit_without_permissions_reports_permissions_field() {
        let repo = Arc::new(InMemoryProfileRepository::new());
        let mut session = ProfileEditingSession::open_for_create(
            PermissionCatalog::builtin(),
            bus_with(repo.clone()).await,
            None,
        );

        let err = session.submit(form("Estagiário")).await.unwrap_err();
        assert_eq!(err.field(), Some(FormField::Permissions));
        assert_eq!(err.error(), &ProfileError::NoPermissionsSelected);
        assert!(session.is_open());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_reports_name_field() {
        let repo = Arc::new(InMemoryProfileRepository::new());
        let mut session = ProfileEditingSession::open_for_create(
            PermissionCatalog::builtin(),
            bus_with(repo).await,
            None,
        );
        session.matrix_mut().toggle_screen("dashboard");

        let err = session.submit(form("   ")).await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::Field {
                field: FormField::Name,
                error: ProfileError::EmptyName
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_surfaces_on_name_field() {
        let repo = Arc::new(InMemoryProfileRepository::new());
        let bus = bus_with(repo.clone()).await;

        let mut first =
            ProfileEditingSession::open_for_create(PermissionCatalog::builtin(), bus.clone(), None);
        first.matrix_mut().toggle_screen("clientes");
        first.submit(form("Advogado")).await.unwrap();

        let mut second =
            ProfileEditingSession::open_for_create(PermissionCatalog::builtin(), bus, None);
        second.matrix_mut().toggle_screen("clientes");
        let err = second.submit(form("advogado")).await.unwrap_err();

        assert_eq!(err.field(), Some(FormField::Name));
        assert!(matches!(err.error(), ProfileError::DuplicateName(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_submit_closes_session() {
        let repo = Arc::new(InMemoryProfileRepository::new());
        let mut session = ProfileEditingSession::open_for_create(
            PermissionCatalog::builtin(),
            bus_with(repo).await,
            Some("admin".to_string()),
        );
        session.matrix_mut().toggle_module("financeiro");

        let profile = session.submit(form("Financeiro")).await.unwrap();
        assert_eq!(profile.created_by.as_deref(), Some("admin"));
        assert!(profile.has_permission("balancete", PermissionType::Export));
        assert!(!session.is_open());

        let err = session.submit(form("Financeiro 2")).await.unwrap_err();
        assert_eq!(err, SubmitError::Operation(ProfileError::SessionClosed));
    }

    #[tokio::test]
    async fn test_edit_session_prefills_and_updates() {
        let repo = Arc::new(InMemoryProfileRepository::new());
        let bus = bus_with(repo.clone()).await;

        let mut create =
            ProfileEditingSession::open_for_create(PermissionCatalog::builtin(), bus.clone(), None);
        create.matrix_mut().toggle_screen("processos");
        let created = create.submit(form("Advogado")).await.unwrap();

        let mut edit =
            ProfileEditingSession::open_for_edit(PermissionCatalog::builtin(), bus, &created, None);
        assert_eq!(edit.form().name, "Advogado");
        assert!(edit.matrix().is_screen_fully_selected("processos"));

        edit.matrix_mut()
            .toggle_permission("processos", PermissionType::Delete);
        let mut fields = edit.form().clone();
        fields.description = Some("Sem exclusão".to_string());
        let updated = edit.submit(fields).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert!(!updated.has_permission("processos", PermissionType::Delete));
        assert_eq!(updated.description.as_deref(), Some("Sem exclusão"));
    }

    #[tokio::test]
    async fn test_cancel_closes_without_side_effects() {
        let repo = Arc::new(InMemoryProfileRepository::new());
        let mut session = ProfileEditingSession::open_for_create(
            PermissionCatalog::builtin(),
            bus_with(repo.clone()).await,
            None,
        );
        session.matrix_mut().toggle_all();
        session.cancel();

        assert!(!session.is_open());
        let err = session.submit(form("Administrador")).await.unwrap_err();
        assert_eq!(err, SubmitError::Operation(ProfileError::SessionClosed));
        assert!(repo.list().await.unwrap().is_empty());
    }
}
