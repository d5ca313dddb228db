use super::permission::PermissionType;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Grouping of screens shown as one block of the permission matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub key: String,
    pub label: String,
}

impl Module {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Screen entity: one protectable unit of the host application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub module: String,
    pub available_permissions: Vec<PermissionType>,
}

impl Screen {
    /// Creates a screen. Repeated permission types are dropped, first occurrence wins.
    pub fn new(id: &str, name: &str, module: &str, available: &[PermissionType]) -> Self {
        let mut available_permissions = Vec::with_capacity(available.len());
        for permission in available {
            if !available_permissions.contains(permission) {
                available_permissions.push(*permission);
            }
        }
        Self {
            id: id.to_string(),
            name: name.to_string(),
            module: module.to_string(),
            available_permissions,
        }
    }

    /// Returns true if the permission type can be granted on this screen.
    pub fn supports(&self, permission: PermissionType) -> bool {
        self.available_permissions.contains(&permission)
    }
}

/// Static, read-only registry of screens grouped by module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionCatalog {
    modules: Vec<Module>,
    screens: Vec<Screen>,
}

static LAW_FIRM_CATALOG: Lazy<Arc<PermissionCatalog>> =
    Lazy::new(|| Arc::new(PermissionCatalog::law_firm()));

impl PermissionCatalog {
    pub fn new(modules: Vec<Module>, screens: Vec<Screen>) -> Self {
        Self { modules, screens }
    }

    /// Shared handle to the built-in catalog of the law-firm application.
    pub fn builtin() -> Arc<PermissionCatalog> {
        LAW_FIRM_CATALOG.clone()
    }

    /// Screens in declaration order.
    pub fn list_screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Modules in declaration order.
    pub fn list_modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn screens_in_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a Screen> + 'a {
        self.screens.iter().filter(move |s| s.module == module)
    }

    pub fn find_screen(&self, screen_id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == screen_id)
    }

    pub fn find_module(&self, key: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.key == key)
    }

    /// Number of grantable (screen, permission) pairs across the catalog.
    pub fn total_permissions(&self) -> usize {
        self.screens
            .iter()
            .map(|s| s.available_permissions.len())
            .sum()
    }

    fn law_firm() -> Self {
        use PermissionType::*;

        let modules = vec![
            Module::new("escritorio", "Escritório"),
            Module::new("financeiro", "Financeiro"),
            Module::new("atendimento", "Atendimento"),
            Module::new("sistema", "Sistema"),
        ];

        let screens = vec![
            Screen::new(
                "clientes",
                "Clientes",
                "escritorio",
                &[View, Create, Edit, Delete, EditConfidential, Export],
            ),
            Screen::new(
                "processos",
                "Processos",
                "escritorio",
                &[View, Create, Edit, Delete, EditConfidential, Export],
            ),
            Screen::new("agenda", "Agenda", "escritorio", &[View, Create, Edit, Delete]),
            Screen::new(
                "documentos",
                "Documentos",
                "escritorio",
                &[View, Create, Edit, Delete, EditConfidential, Export],
            ),
            Screen::new("balancete", "Balancete", "financeiro", &[View, Export]),
            Screen::new(
                "lancamentos",
                "Lançamentos",
                "financeiro",
                &[View, Create, Edit, Delete, Export],
            ),
            Screen::new(
                "relatorios_financeiros",
                "Relatórios financeiros",
                "financeiro",
                &[View, Export],
            ),
            Screen::new("chat_interno", "Chat interno", "atendimento", &[View, Create]),
            Screen::new("chamados", "Chamados", "atendimento", &[View, Create, Edit, Delete]),
            Screen::new("dashboard", "Dashboard", "sistema", &[View]),
            Screen::new(
                "usuarios_internos",
                "Usuários internos",
                "sistema",
                &[View, Create, Edit, Delete],
            ),
            Screen::new(
                "niveis_acesso",
                "Níveis de acesso",
                "sistema",
                &[View, Create, Edit, Delete],
            ),
            Screen::new("configuracoes", "Configurações", "sistema", &[View, Edit]),
        ];

        Self::new(modules, screens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_dedups_available_permissions() {
        let screen = Screen::new(
            "s1",
            "Screen",
            "m",
            &[PermissionType::View, PermissionType::Export, PermissionType::View],
        );
        assert_eq!(
            screen.available_permissions,
            vec![PermissionType::View, PermissionType::Export]
        );
        assert!(screen.supports(PermissionType::Export));
        assert!(!screen.supports(PermissionType::Delete));
    }

    #[test]
    fn test_screens_in_module_preserves_order() {
        let catalog = PermissionCatalog::builtin();
        let ids: Vec<&str> = catalog
            .screens_in_module("financeiro")
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["balancete", "lancamentos", "relatorios_financeiros"]);
        assert_eq!(catalog.screens_in_module("inexistente").count(), 0);
    }

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = PermissionCatalog::builtin();
        for screen in catalog.list_screens() {
            assert!(
                catalog.find_module(&screen.module).is_some(),
                "screen {} points to unknown module {}",
                screen.id,
                screen.module
            );
            assert!(!screen.available_permissions.is_empty());
        }
        let report = catalog.find_screen("balancete").unwrap();
        assert_eq!(
            report.available_permissions,
            vec![PermissionType::View, PermissionType::Export]
        );
    }

    #[test]
    fn test_total_permissions() {
        let catalog = PermissionCatalog::new(
            vec![Module::new("m", "M")],
            vec![
                Screen::new("a", "A", "m", &[PermissionType::View, PermissionType::Edit]),
                Screen::new("b", "B", "m", &[PermissionType::View]),
            ],
        );
        assert_eq!(catalog.total_permissions(), 3);
    }
}
