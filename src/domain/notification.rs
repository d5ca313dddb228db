use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Human-readable outcome of a profile operation, delivered fire-and-forget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: ProfileAction,
    pub level: NotificationLevel,
    pub profile_id: Option<String>,
    pub actor: Option<String>,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileAction {
    Create,
    Update,
    Delete,
    ToggleStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
    Failure,
}

impl Notification {
    pub fn success(action: ProfileAction, profile_id: &str, message: String) -> Self {
        Self::new(action, NotificationLevel::Success, Some(profile_id.to_string()), message)
    }

    pub fn failure(action: ProfileAction, profile_id: Option<&str>, message: String) -> Self {
        Self::new(
            action,
            NotificationLevel::Failure,
            profile_id.map(str::to_string),
            message,
        )
    }

    fn new(
        action: ProfileAction,
        level: NotificationLevel,
        profile_id: Option<String>,
        message: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            level,
            profile_id,
            actor: None,
            message,
        }
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_notification() {
        let notification = Notification::success(
            ProfileAction::Create,
            "p1",
            "Perfil criado com sucesso".to_string(),
        )
        .with_actor(Some("admin".to_string()));

        assert!(notification.is_success());
        assert_eq!(notification.profile_id.as_deref(), Some("p1"));
        assert_eq!(notification.actor.as_deref(), Some("admin"));
        assert!(!notification.id.is_empty());
    }

    #[test]
    fn test_failure_notification_without_profile() {
        let notification = Notification::failure(
            ProfileAction::Delete,
            None,
            "Perfil não encontrado".to_string(),
        );

        assert!(!notification.is_success());
        assert!(notification.profile_id.is_none());
    }
}
