use crate::application::validators::{CreateProfileInput, UpdateProfileInput};

/// Command to create an access profile
#[derive(Clone, Debug)]
pub struct CreateProfileCommand {
    pub input: CreateProfileInput,
    pub actor: Option<String>,
}

/// Command to update an access profile
#[derive(Clone, Debug)]
pub struct UpdateProfileCommand {
    pub profile_id: String,
    pub changes: UpdateProfileInput,
    pub actor: Option<String>,
}

/// Command to delete an access profile
#[derive(Clone, Debug)]
pub struct DeleteProfileCommand {
    pub profile_id: String,
    pub actor: Option<String>,
}

/// Command to flip a profile between active and inactive
#[derive(Clone, Debug)]
pub struct ToggleProfileStatusCommand {
    pub profile_id: String,
    pub actor: Option<String>,
}

/// Command factory for creating commands
pub struct CommandFactory;

impl CommandFactory {
    pub fn create_profile(input: CreateProfileInput, actor: Option<String>) -> CreateProfileCommand {
        CreateProfileCommand { input, actor }
    }

    pub fn update_profile(
        profile_id: String,
        changes: UpdateProfileInput,
        actor: Option<String>,
    ) -> UpdateProfileCommand {
        UpdateProfileCommand {
            profile_id,
            changes,
            actor,
        }
    }

    pub fn delete_profile(profile_id: String, actor: Option<String>) -> DeleteProfileCommand {
        DeleteProfileCommand { profile_id, actor }
    }

    pub fn toggle_profile_status(
        profile_id: String,
        actor: Option<String>,
    ) -> ToggleProfileStatusCommand {
        ToggleProfileStatusCommand { profile_id, actor }
    }
}
