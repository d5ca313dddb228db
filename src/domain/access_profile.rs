use super::permission::PermissionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enabled permissions of one screen inside a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPermissionState {
    pub screen_id: String,
    pub permissions: Vec<PermissionType>,
}

impl ScreenPermissionState {
    pub fn new(screen_id: &str, permissions: Vec<PermissionType>) -> Self {
        Self {
            screen_id: screen_id.to_string(),
            permissions,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    #[default]
    Active,
    Inactive,
}

impl ProfileStatus {
    pub fn toggled(self) -> Self {
        match self {
            ProfileStatus::Active => ProfileStatus::Inactive,
            ProfileStatus::Inactive => ProfileStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Active => "active",
            ProfileStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProfileStatus::Active),
            "inactive" => Ok(ProfileStatus::Inactive),
            other => Err(format!("unknown profile status: {other}")),
        }
    }
}

/// AccessProfile aggregate: a named set of screen permissions assigned to users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessProfile {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProfileStatus,
    pub permissions: Vec<ScreenPermissionState>,
    pub users_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl AccessProfile {
    /// Creates an active profile with no permissions and no assigned users.
    pub fn new(id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: None,
            status: ProfileStatus::Active,
            permissions: vec![],
            users_count: 0,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_status(mut self, status: ProfileStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<ScreenPermissionState>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn created_by(mut self, actor: Option<String>) -> Self {
        self.updated_by = actor.clone();
        self.created_by = actor;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }

    /// Flips the status and stamps the change.
    pub fn toggle_status(&mut self, actor: Option<String>) -> ProfileStatus {
        self.status = self.status.toggled();
        self.touch(actor);
        self.status
    }

    pub fn touch(&mut self, actor: Option<String>) {
        self.updated_at = Utc::now();
        self.updated_by = actor;
    }

    pub fn has_permission(&self, screen_id: &str, permission: PermissionType) -> bool {
        self.permissions
            .iter()
            .any(|s| s.screen_id == screen_id && s.permissions.contains(&permission))
    }

    /// Number of enabled (screen, permission) pairs.
    pub fn permission_count(&self) -> usize {
        self.permissions.iter().map(|s| s.permissions.len()).sum()
    }

    /// Case-insensitive name comparison used for the uniqueness rule.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}
