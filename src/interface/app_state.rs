use crate::application::command_bus::CommandBus;
use crate::application::query_bus::QueryBus;
use crate::domain::catalog::PermissionCatalog;
use crate::infrastructure::{Notifier, ProfileRepository, UserAssignmentService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub assignments: Arc<dyn UserAssignmentService>,
    pub notifier: Arc<dyn Notifier>,
    pub catalog: Arc<PermissionCatalog>,
    pub command_bus: Arc<CommandBus>,
    pub query_bus: Arc<QueryBus>,
}
