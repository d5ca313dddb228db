use crate::application::validators::CreateProfileInput;
use crate::domain::access_profile::ProfileStatus;
use crate::domain::catalog::PermissionCatalog;
use crate::domain::permission::PermissionType;
use crate::domain::permission_matrix::PermissionMatrix;
use crate::infrastructure::{
    InMemoryUserAssignmentRepository, ProfileRepository, RepoResult, UserAssignmentService,
};
use std::sync::Arc;

const SEED_ACTOR: &str = "system";

/// Loads the demo profiles and users of the law-firm back office.
///
/// The profile named `fallback_name` becomes the reassignment target of the
/// assignment repository. Returns the id of that profile.
pub async fn seed_demo_data(
    catalog: Arc<PermissionCatalog>,
    profiles: &dyn ProfileRepository,
    assignments: &InMemoryUserAssignmentRepository,
    fallback_name: &str,
) -> RepoResult<String> {
    let actor = Some(SEED_ACTOR.to_string());

    let mut admin = PermissionMatrix::new(catalog.clone());
    admin.toggle_all();
    let admin = profiles
        .create(
            CreateProfileInput {
                name: fallback_name.to_string(),
                description: Some("Acesso completo a todas as telas do sistema".to_string()),
                status: ProfileStatus::Active,
                permissions: admin.export_state(),
            },
            actor.clone(),
        )
        .await?;

    let mut lawyer = PermissionMatrix::new(catalog.clone());
    lawyer.toggle_module("escritorio");
    lawyer.toggle_permission("processos", PermissionType::Delete);
    lawyer.toggle_permission("chamados", PermissionType::View);
    lawyer.toggle_permission("chamados", PermissionType::Create);
    lawyer.toggle_permission("chat_interno", PermissionType::View);
    lawyer.toggle_permission("chat_interno", PermissionType::Create);
    lawyer.toggle_permission("dashboard", PermissionType::View);
    let lawyer = profiles
        .create(
            CreateProfileInput {
                name: "Advogado".to_string(),
                description: Some("Gestão de clientes, processos e agenda".to_string()),
                status: ProfileStatus::Active,
                permissions: lawyer.export_state(),
            },
            actor.clone(),
        )
        .await?;

    let mut intern = PermissionMatrix::new(catalog.clone());
    for screen in ["clientes", "processos", "agenda", "documentos"] {
        intern.toggle_permission(screen, PermissionType::View);
    }
    intern.toggle_permission("agenda", PermissionType::Create);
    let intern = profiles
        .create(
            CreateProfileInput {
                name: "Estagiário".to_string(),
                description: Some("Consulta de processos e agenda".to_string()),
                status: ProfileStatus::Active,
                permissions: intern.export_state(),
            },
            actor.clone(),
        )
        .await?;

    let mut finance = PermissionMatrix::new(catalog.clone());
    finance.toggle_module("financeiro");
    finance.toggle_permission("dashboard", PermissionType::View);
    let finance = profiles
        .create(
            CreateProfileInput {
                name: "Financeiro".to_string(),
                description: Some("Balancete, lançamentos e relatórios".to_string()),
                status: ProfileStatus::Active,
                permissions: finance.export_state(),
            },
            actor.clone(),
        )
        .await?;

    let mut support = PermissionMatrix::new(catalog);
    support.toggle_module("atendimento");
    profiles
        .create(
            CreateProfileInput {
                name: "Atendimento".to_string(),
                description: Some("Chat interno e chamados".to_string()),
                status: ProfileStatus::Inactive,
                permissions: support.export_state(),
            },
            actor,
        )
        .await?;

    let users = [
        ("u-001", "Marina Albuquerque", &admin.id),
        ("u-002", "Rafael Teixeira", &lawyer.id),
        ("u-003", "Juliana Prado", &lawyer.id),
        ("u-004", "Carlos Menezes", &lawyer.id),
        ("u-005", "Beatriz Lima", &intern.id),
        ("u-006", "Paulo Siqueira", &finance.id),
    ];
    for (user_id, user_name, profile_id) in users {
        assignments.assign(user_id, user_name, profile_id).await;
    }
    assignments.set_fallback_profile(Some(admin.id.clone())).await;

    for profile in profiles.list().await? {
        let count = assignments.count_users_for_profile(&profile.id).await?;
        profiles.set_users_count(&profile.id, count).await?;
    }

    tracing::info!(fallback_profile_id = %admin.id, "Demo access profiles loaded");
    Ok(admin.id)
}
