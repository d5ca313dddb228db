/// Failure kinds of the access-profile subsystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile name is required")]
    EmptyName,
    #[error("A profile named '{0}' already exists")]
    DuplicateName(String),
    #[error("At least one permission must be selected")]
    NoPermissionsSelected,
    #[error("Profile has {0} assigned users and cannot be deleted; deactivate it first")]
    HasAssignedUsers(usize),
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Dispatch error: {0}")]
    Dispatch(String),
    #[error("Editing session is already closed")]
    SessionClosed,
}

impl ProfileError {
    /// Validation kinds are recovered at the form boundary as field errors.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProfileError::EmptyName
                | ProfileError::DuplicateName(_)
                | ProfileError::NoPermissionsSelected
        )
    }
}

impl From<sqlx::Error> for ProfileError {
    fn from(err: sqlx::Error) -> Self {
        ProfileError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        ProfileError::Storage(err.to_string())
    }
}
