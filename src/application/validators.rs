use crate::domain::access_profile::{ProfileStatus, ScreenPermissionState};
use crate::domain::error::ProfileError;

/// Profile field validation rules
pub struct ProfileValidator;

impl ProfileValidator {
    /// Validates a profile name and returns it trimmed.
    pub fn validate_name(name: &str) -> Result<String, ProfileError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        Ok(trimmed.to_string())
    }

    /// Blank descriptions are stored as absent.
    pub fn normalize_description(description: Option<String>) -> Option<String> {
        description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
    }

    /// Validates that at least one screen has an enabled permission.
    pub fn validate_permissions(
        permissions: &[ScreenPermissionState],
    ) -> Result<(), ProfileError> {
        if permissions.iter().all(|s| s.permissions.is_empty()) {
            return Err(ProfileError::NoPermissionsSelected);
        }
        Ok(())
    }
}

/// Input of a profile creation, validated before it reaches storage.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateProfileInput {
    pub name: String,
    pub description: Option<String>,
    pub status: ProfileStatus,
    pub permissions: Vec<ScreenPermissionState>,
}

impl CreateProfileInput {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            status: ProfileStatus::Active,
            permissions: vec![],
        }
    }

    pub fn validate(self) -> Result<Self, ProfileError> {
        Ok(Self {
            name: ProfileValidator::validate_name(&self.name)?,
            description: ProfileValidator::normalize_description(self.description),
            status: self.status,
            permissions: self
                .permissions
                .into_iter()
                .filter(|s| !s.permissions.is_empty())
                .collect(),
        })
    }
}

/// Partial update of a profile; `None` leaves the field untouched.
///
/// `description: Some(None)` clears the description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProfileStatus>,
    pub permissions: Option<Vec<ScreenPermissionState>>,
}

impl UpdateProfileInput {
    pub fn validate(self) -> Result<Self, ProfileError> {
        let name = match self.name {
            Some(name) => Some(ProfileValidator::validate_name(&name)?),
            None => None,
        };
        Ok(Self {
            name,
            description: self
                .description
                .map(ProfileValidator::normalize_description),
            status: self.status,
            permissions: self.permissions.map(|permissions| {
                permissions
                    .into_iter()
                    .filter(|s| !s.permissions.is_empty())
                    .collect()
            }),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.permissions.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::PermissionType;

    #[test]
    fn test_name_validation() {
        assert_eq!(
            ProfileValidator::validate_name("  Financeiro ").unwrap(),
            "Financeiro"
        );
        assert_eq!(
            ProfileValidator::validate_name("   "),
            Err(ProfileError::EmptyName)
        );
        assert_eq!(ProfileValidator::validate_name(""), Err(ProfileError::EmptyName));
    }

    #[test]
    fn test_permissions_validation() {
        assert_eq!(
            ProfileValidator::validate_permissions(&[]),
            Err(ProfileError::NoPermissionsSelected)
        );
        assert_eq!(
            ProfileValidator::validate_permissions(&[ScreenPermissionState::new(
                "agenda",
                vec![]
            )]),
            Err(ProfileError::NoPermissionsSelected)
        );
        assert!(
            ProfileValidator::validate_permissions(&[ScreenPermissionState::new(
                "agenda",
                vec![PermissionType::View]
            )])
            .is_ok()
        );
    }

    #[test]
    fn test_create_input_normalization() {
        let input = CreateProfileInput {
            name: " Estagiário ".to_string(),
            description: Some("   ".to_string()),
            status: ProfileStatus::Inactive,
            permissions: vec![
                ScreenPermissionState::new("agenda", vec![]),
                ScreenPermissionState::new("processos", vec![PermissionType::View]),
            ],
        }
        .validate()
        .unwrap();

        assert_eq!(input.name, "Estagiário");
        assert!(input.description.is_none());
        assert_eq!(input.status, ProfileStatus::Inactive);
        assert_eq!(input.permissions.len(), 1);
    }

    #[test]
    fn test_update_input_validation() {
        let err = UpdateProfileInput {
            name: Some(" ".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ProfileError::EmptyName);

        let input = UpdateProfileInput {
            description: Some(Some("".to_string())),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(input.description, Some(None));
        assert!(input.name.is_none());
        assert!(UpdateProfileInput::default().is_empty());
    }
}
