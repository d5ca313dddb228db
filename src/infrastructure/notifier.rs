use crate::domain::notification::Notification;
use crate::infrastructure::Notifier;
use std::sync::Mutex;

/// Delivers notifications as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_success() {
            tracing::info!(
                notification_id = %notification.id,
                action = ?notification.action,
                profile_id = ?notification.profile_id,
                actor = ?notification.actor,
                "{}",
                notification.message
            );
        } else {
            tracing::warn!(
                notification_id = %notification.id,
                action = ?notification.action,
                profile_id = ?notification.profile_id,
                actor = ?notification.actor,
                "{}",
                notification.message
            );
        }
    }
}

/// Keeps every notification in memory; used to observe outcomes in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(notifications) => notifications.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        // A poisoned lock drops the notification; the mutation it reports stands.
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::ProfileAction;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::success(
            ProfileAction::Create,
            "p1",
            "created".to_string(),
        ));
        notifier.notify(Notification::failure(
            ProfileAction::Delete,
            Some("p1"),
            "blocked".to_string(),
        ));

        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].action, ProfileAction::Create);
        assert!(!notifications[1].is_success());
    }

    #[test]
    fn test_tracing_notifier_accepts_both_levels() {
        let notifier = TracingNotifier;
        notifier.notify(Notification::success(
            ProfileAction::Update,
            "p1",
            "updated".to_string(),
        ));
        notifier.notify(Notification::failure(
            ProfileAction::ToggleStatus,
            None,
            "missing".to_string(),
        ));
    }
}
