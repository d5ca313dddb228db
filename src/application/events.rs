use crate::domain::access_profile::ProfileStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base trait for all domain events
pub trait DomainEvent: Send + Sync {
    fn event_id(&self) -> &str;
    fn aggregate_id(&self) -> &str;
    fn occurred_at(&self) -> DateTime<Utc>;
    fn event_type(&self) -> &str;
}

/// Access-profile domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreatedEvent {
    pub event_id: String,
    pub aggregate_id: String,
    pub occurred_at: DateTime<Utc>,
    pub profile_name: String,
    pub permission_count: usize,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdatedEvent {
    pub event_id: String,
    pub aggregate_id: String,
    pub occurred_at: DateTime<Utc>,
    pub profile_name: String,
    pub permission_count: usize,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDeletedEvent {
    pub event_id: String,
    pub aggregate_id: String,
    pub occurred_at: DateTime<Utc>,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStatusToggledEvent {
    pub event_id: String,
    pub aggregate_id: String,
    pub occurred_at: DateTime<Utc>,
    pub new_status: ProfileStatus,
    pub users_reassigned_to: Option<String>,
    pub actor: Option<String>,
}

/// Event factory for creating domain events
pub struct EventFactory;

impl EventFactory {
    pub fn profile_created(
        profile_id: String,
        profile_name: String,
        permission_count: usize,
        actor: Option<String>,
    ) -> ProfileCreatedEvent {
        ProfileCreatedEvent {
            event_id: Uuid::new_v4().to_string(),
            aggregate_id: profile_id,
            occurred_at: Utc::now(),
            profile_name,
            permission_count,
            actor,
        }
    }

    pub fn profile_updated(
        profile_id: String,
        profile_name: String,
        permission_count: usize,
        actor: Option<String>,
    ) -> ProfileUpdatedEvent {
        ProfileUpdatedEvent {
            event_id: Uuid::new_v4().to_string(),
            aggregate_id: profile_id,
            occurred_at: Utc::now(),
            profile_name,
            permission_count,
            actor,
        }
    }

    pub fn profile_deleted(profile_id: String, actor: Option<String>) -> ProfileDeletedEvent {
        ProfileDeletedEvent {
            event_id: Uuid::new_v4().to_string(),
            aggregate_id: profile_id,
            occurred_at: Utc::now(),
            actor,
        }
    }

    pub fn profile_status_toggled(
        profile_id: String,
        new_status: ProfileStatus,
        users_reassigned_to: Option<String>,
        actor: Option<String>,
    ) -> ProfileStatusToggledEvent {
        ProfileStatusToggledEvent {
            event_id: Uuid::new_v4().to_string(),
            aggregate_id: profile_id,
            occurred_at: Utc::now(),
            new_status,
            users_reassigned_to,
            actor,
        }
    }
}

macro_rules! impl_domain_event {
    ($event:ty, $name:literal) => {
        impl DomainEvent for $event {
            fn event_id(&self) -> &str {
                &self.event_id
            }
            fn aggregate_id(&self) -> &str {
                &self.aggregate_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &str {
                $name
            }
        }
    };
}

impl_domain_event!(ProfileCreatedEvent, "ProfileCreated");
impl_domain_event!(ProfileUpdatedEvent, "ProfileUpdated");
impl_domain_event!(ProfileDeletedEvent, "ProfileDeleted");
impl_domain_event!(ProfileStatusToggledEvent, "ProfileStatusToggled");
